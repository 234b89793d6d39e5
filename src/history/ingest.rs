//! Reading a bounded window of lines from one history file.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use tracing::{debug, warn};

use super::command::{Command, OrderingKey};
use super::parser::{Dialect, ParseOptions, parse_line};

/// Choose the line syntax for a file from its name.
///
/// `zsh` anywhere in the file name means extended metadata, `bash` (or a
/// `.bash_history` extension) means plain lines. Anything else is decided
/// line by line.
pub fn dialect_for_path(path: &Path) -> Dialect {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_else(|| path.to_string_lossy());
    if name.contains("zsh") {
        Dialect::Extended
    } else if name.contains("bash")
        || path.extension().is_some_and(|ext| ext == "bash_history")
    {
        Dialect::Plain
    } else {
        Dialect::Auto
    }
}

/// Read one history source.
///
/// A missing file is normal and yields nothing. Any other I/O problem is
/// logged; whatever was read before it is still parsed.
pub fn read_source(path: &Path, max_lines: usize, opts: &ParseOptions) -> Vec<Command> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("History source {} does not exist, skipping", path.display());
            return Vec::new();
        }
        Err(e) => {
            warn!("Failed to open history source {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    let dialect = dialect_for_path(path);
    debug!("Reading {} as {:?}", path.display(), dialect);

    let commands = read_lines(BufReader::new(file), dialect, max_lines, opts);
    debug!("Parsed {} commands from {}", commands.len(), path.display());
    commands
}

/// Parse the last `max_lines` lines of `reader` (`0` keeps every line).
///
/// Each retained line gets its index within the window as fallback
/// ordering key, so later lines are always more recent than earlier ones.
/// Lines holding a NUL or 0xFF byte take their slot in the window but yield
/// no command; other invalid UTF-8 is decoded lossily and kept.
pub fn read_lines<R: BufRead>(
    mut reader: R,
    dialect: Dialect,
    max_lines: usize,
    opts: &ParseOptions,
) -> Vec<Command> {
    let mut window: VecDeque<Option<String>> = VecDeque::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                if max_lines > 0 && window.len() == max_lines {
                    window.pop_front();
                }
                let line = if has_binary_bytes(&buf) {
                    None
                } else {
                    Some(String::from_utf8_lossy(&buf).into_owned())
                };
                window.push_back(line);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!(
                    "Read error after {} lines, keeping what was read: {}",
                    window.len(),
                    e
                );
                break;
            }
        }
    }

    window
        .iter()
        .enumerate()
        .filter_map(|(pos, line)| {
            let line = line.as_deref()?;
            parse_line(line, dialect, OrderingKey::Synthetic(pos as u64), opts)
        })
        .collect()
}

fn has_binary_bytes(raw: &[u8]) -> bool {
    raw.iter().any(|&b| b == 0x00 || b == 0xFF)
}
