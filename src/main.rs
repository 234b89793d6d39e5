//! Entry point: the interactive navigator, or a plain listing with `--print`.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Parser;

use history_nav::app::{App, load_storage};
use history_nav::config::Config;
use history_nav::storage::Storage;
use history_nav::templates::{self, TemplateLoader};
use history_nav::utils;
use history_nav::utils::context::Context;

#[derive(Parser, Debug)]
#[command(name = "history-nav")]
#[command(about = "Browse, search and copy commands from your shell history")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.config/history-nav/config.yaml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print commands instead of starting the interface
    #[arg(short, long)]
    print: bool,

    /// Only commands containing every word of QUERY, most frequent first
    /// (implies --print)
    #[arg(short, long, value_name = "QUERY")]
    query: Option<String>,

    /// Most frequent first instead of newest first
    #[arg(short, long)]
    frequency: bool,

    /// Maximum number of lines to print, 0 for all
    #[arg(short = 'n', long, default_value = "20")]
    limit: usize,

    /// Print JSON (implies --print)
    #[arg(long)]
    json: bool,

    /// Print the templates grouped by category
    #[arg(long)]
    templates: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    utils::logger::init_logging();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load config")?;

    let printed = if cli.templates {
        print_templates(&cli, &config)
    } else if cli.print || cli.json || cli.query.is_some() {
        print_history(&cli, &config)
    } else {
        return run_interactive(config).await;
    };

    match printed {
        // `history-nav --print | head` closes stdout early
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other.context("Failed to write output"),
    }
}

async fn run_interactive(config: Config) -> Result<()> {
    let mut terminal = ratatui::try_init().context("Failed to initialize terminal")?;

    // restores the terminal on normal exit and on panic
    let _ctx = Context::with(ratatui::restore);

    let mut app = App::new(config);
    app.draw(&mut terminal)?;
    app.run(&mut terminal).await
}

fn print_history(cli: &Cli, config: &Config) -> io::Result<()> {
    let (reader, problems) = config.history_reader();
    for problem in &problems {
        eprintln!("Warning: {}", problem);
    }

    let storage = load_storage(&reader, config.ui.max_items);
    let mut commands = match &cli.query {
        Some(query) => storage.search(query),
        None if cli.frequency => storage.get_by_frequency(),
        None => storage.get_recent(0),
    };
    if cli.limit > 0 {
        commands.truncate(cli.limit);
    }

    let mut out = io::stdout().lock();
    if cli.json {
        serde_json::to_writer_pretty(&mut out, &commands)?;
        writeln!(out)?;
        return Ok(());
    }
    for cmd in &commands {
        let status = match cmd.exit_status() {
            Some(0) | None => String::new(),
            Some(code) => format!(" [exit {}]", code),
        };
        writeln!(
            out,
            "{:>5}  {:<16}  {}{}",
            cmd.count,
            cmd.ordering_key.display(),
            cmd.text,
            status
        )?;
    }
    Ok(())
}

fn print_templates(cli: &Cli, config: &Config) -> io::Result<()> {
    let loader = TemplateLoader::new(config.templates_file());
    let all = loader.load().map_err(io::Error::other)?;
    let matching = match &cli.query {
        Some(query) => templates::search(&all, query),
        None => all,
    };
    let groups = templates::by_category(&matching);

    let mut out = io::stdout().lock();
    if cli.json {
        serde_json::to_writer_pretty(&mut out, &groups)?;
        writeln!(out)?;
        return Ok(());
    }
    for (category, entries) in &groups {
        writeln!(out, "[{}]", category)?;
        for template in entries {
            writeln!(out, "  {:<22}{}", template.name, template.command)?;
            if !template.description.is_empty() {
                writeln!(out, "  {:<22}{}", "", template.description)?;
            }
        }
    }
    Ok(())
}
