//! Command templates.
//!
//! A YAML file with a `templates:` list of named commands. A starter set is
//! written the first time the file is missing.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::TemplateError;

const UNCATEGORIZED: &str = "other";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Template {
    pub name: String,
    pub command: String,
    pub description: String,
    pub category: String,
}

impl Template {
    fn new(name: &str, command: &str, description: &str, category: &str) -> Self {
        Self {
            name: name.to_string(),
            command: command.to_string(),
            description: description.to_string(),
            category: category.to_string(),
        }
    }

    /// Case-insensitive match of an already lowercased needle against every field.
    fn matches(&self, needle: &str) -> bool {
        [&self.name, &self.command, &self.description, &self.category]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct TemplateFile {
    #[serde(default)]
    templates: Vec<Template>,
}

pub struct TemplateLoader {
    path: PathBuf,
}

impl TemplateLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load templates sorted by category, then name.
    pub fn load(&self) -> Result<Vec<Template>, TemplateError> {
        if !self.path.exists() {
            info!("No templates at {}, writing defaults", self.path.display());
            self.write_defaults()?;
        }

        let raw = fs::read_to_string(&self.path).map_err(|source| TemplateError::Read {
            path: self.path.clone(),
            source,
        })?;
        let file: TemplateFile = serde_yaml::from_str(&raw).map_err(|source| TemplateError::Parse {
            path: self.path.clone(),
            source,
        })?;

        let mut templates = file.templates;
        templates.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.name.cmp(&b.name)));
        debug!("Loaded {} templates", templates.len());
        Ok(templates)
    }

    fn write_defaults(&self) -> Result<(), TemplateError> {
        let data = serde_yaml::to_string(&TemplateFile {
            templates: default_templates(),
        })
        .map_err(TemplateError::Serialize)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| TemplateError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&self.path, data).map_err(|source| TemplateError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

pub fn default_templates() -> Vec<Template> {
    vec![
        Template::new("Git status", "git status", "Show working tree status", "git"),
        Template::new("Git log oneline", "git log --oneline -10", "Show last 10 commits in one line", "git"),
        Template::new("Git branch", "git branch -a", "List all branches", "git"),
        Template::new("Git diff", "git diff", "Show changes in working directory", "git"),
        Template::new("Docker ps", "docker ps -a", "List all containers", "docker"),
        Template::new("Docker images", "docker images", "List all images", "docker"),
        Template::new("Docker logs", "docker logs -f", "Follow container logs", "docker"),
        Template::new("Disk usage", "df -h", "Show disk space usage", "system"),
        Template::new("Memory usage", "free -h", "Show memory usage", "system"),
        Template::new("Process tree", "pstree", "Display running processes as tree", "system"),
        Template::new("Top processes", "top", "Display running processes", "system"),
        Template::new("Network connections", "netstat -tulpn", "Show network connections", "network"),
        Template::new("Ping test", "ping -c 4 google.com", "Test network connectivity", "network"),
        Template::new("Find files", "find . -name", "Find files by name", "files"),
        Template::new("Archive create", "tar -czf archive.tar.gz", "Create compressed archive", "files"),
    ]
}

/// Group by category; templates without one land in `other`.
pub fn by_category(templates: &[Template]) -> BTreeMap<String, Vec<Template>> {
    let mut groups: BTreeMap<String, Vec<Template>> = BTreeMap::new();
    for template in templates {
        let category = if template.category.is_empty() {
            UNCATEGORIZED
        } else {
            template.category.as_str()
        };
        groups.entry(category.to_string()).or_default().push(template.clone());
    }
    groups
}

/// Templates where any field contains `query`, ignoring case. An empty query
/// matches everything.
pub fn search(templates: &[Template], query: &str) -> Vec<Template> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return templates.to_vec();
    }
    templates.iter().filter(|t| t.matches(&needle)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gets_defaults() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let loader = TemplateLoader::new(dir.path().join("sub").join("templates.yaml"));

        let templates = loader.load()?;
        assert_eq!(templates.len(), default_templates().len());
        assert!(loader.path().exists());
        Ok(())
    }

    #[test]
    fn test_sorted_by_category_then_name() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let loader = TemplateLoader::new(dir.path().join("templates.yaml"));
        let templates = loader.load()?;

        let keys: Vec<(&str, &str)> = templates
            .iter()
            .map(|t| (t.category.as_str(), t.name.as_str()))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(templates[0].name, "Docker images");
        Ok(())
    }

    #[test]
    fn test_user_file_is_read() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("templates.yaml");
        fs::write(
            &path,
            "templates:\n  - name: Zed\n    command: zed .\n  - name: Build\n    command: cargo build\n    category: rust\n",
        )?;

        let templates = TemplateLoader::new(&path).load()?;
        // missing category sorts first as the empty string
        assert_eq!(templates[0].name, "Zed");
        assert_eq!(templates[1].command, "cargo build");
        Ok(())
    }

    #[test]
    fn test_broken_file_is_an_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("templates.yaml");
        fs::write(&path, "templates: {not: [a list\n")?;

        let err = TemplateLoader::new(&path).load().unwrap_err();
        assert!(matches!(err, TemplateError::Parse { .. }));
        Ok(())
    }

    #[test]
    fn test_by_category() {
        let mut templates = default_templates();
        templates.push(Template::new("Misc", "true", "", ""));

        let groups = by_category(&templates);
        assert_eq!(groups["git"].len(), 4);
        assert_eq!(groups["system"].len(), 4);
        assert_eq!(groups["other"][0].name, "Misc");
        assert_eq!(groups.len(), 6);
    }

    #[test]
    fn test_search_checks_every_field() {
        let templates = default_templates();
        assert_eq!(search(&templates, "NETSTAT").len(), 1);
        assert_eq!(search(&templates, "compressed")[0].name, "Archive create");
        assert_eq!(search(&templates, "docker").len(), 3);
        assert_eq!(search(&templates, "  ").len(), templates.len());
        assert!(search(&templates, "kubectl").is_empty());
    }
}
