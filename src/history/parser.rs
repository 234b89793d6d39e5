//! Line parser for shell history files.
//!
//! Two line syntaxes are understood:
//!
//! ```text
//! plain:     git status
//! extended:  : 1700000000:0;git status
//!            :1700000000:12:1;make build
//! ```
//!
//! The extended form is the one zsh writes with `EXTENDED_HISTORY`, plus an
//! optional third metadata field holding the exit code.

use std::ops::RangeInclusive;

use chrono::NaiveDate;

use super::command::{Command, OrderingKey};

/// First character of an extended-metadata line.
pub const EXTENDED_MARKER: char = ':';
/// Separates the metadata block from the command text.
pub const METADATA_SEPARATOR: char = ';';

/// Epoch timestamps keep at most this many digits; longer values are
/// millisecond (or finer) precision and are cut down to seconds.
const EPOCH_SECONDS_DIGITS: usize = 10;

/// Line syntax of a history source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dialect {
    /// Whole line is the command; no metadata.
    Plain,
    /// `:<ts>:<elapsed>[:<exit>];<command>`
    Extended,
    /// Decide per line, see [`detect_dialect`].
    Auto,
}

/// Knobs for the line parser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Accepted epoch-second range. Anything outside is treated as a parse
    /// failure and the caller's fallback key is used instead.
    pub timestamp_bounds: RangeInclusive<i64>,
}

impl ParseOptions {
    /// Build bounds covering 1 January of `min_year` through 31 December of
    /// `max_year`, UTC.
    pub fn from_years(min_year: i32, max_year: i32) -> Self {
        let start = year_start(min_year).unwrap_or(0);
        let end = year_start(max_year.saturating_add(1))
            .map(|ts| ts - 1)
            .unwrap_or(i64::MAX);
        Self {
            timestamp_bounds: start..=end,
        }
    }

    /// Accept any non-negative timestamp.
    pub fn permissive() -> Self {
        Self {
            timestamp_bounds: 0..=i64::MAX,
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::from_years(2000, 2100)
    }
}

fn year_start(year: i32) -> Option<i64> {
    NaiveDate::from_ymd_opt(year, 1, 1)?
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
}

/// Pick a dialect for one line when the file gave no hint.
pub fn detect_dialect(line: &str) -> Dialect {
    if line.trim_start().starts_with(EXTENDED_MARKER) {
        Dialect::Extended
    } else {
        Dialect::Plain
    }
}

/// Parse one raw line into at most one command.
///
/// `fallback` is the synthetic key assigned by the caller from the line's
/// position; it is used for plain lines and whenever an extended line has no
/// usable timestamp.
pub fn parse_line(
    line: &str,
    dialect: Dialect,
    fallback: OrderingKey,
    opts: &ParseOptions,
) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let dialect = match dialect {
        Dialect::Auto => detect_dialect(line),
        other => other,
    };

    match dialect {
        Dialect::Extended if line.starts_with(EXTENDED_MARKER) => {
            parse_extended(line, fallback, opts)
        }
        _ => Some(Command::new(line, fallback)),
    }
}

fn parse_extended(line: &str, fallback: OrderingKey, opts: &ParseOptions) -> Option<Command> {
    let body = &line[EXTENDED_MARKER.len_utf8()..];

    let (metadata, text) = match body.find(METADATA_SEPARATOR) {
        Some(idx) if idx + METADATA_SEPARATOR.len_utf8() < body.len() => {
            (&body[..idx], &body[idx + METADATA_SEPARATOR.len_utf8()..])
        }
        _ => return recover_malformed(body, fallback),
    };

    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let mut fields = metadata.split(EXTENDED_MARKER);
    let ordering_key = fields
        .next()
        .and_then(|raw| parse_timestamp(raw, opts))
        .map(OrderingKey::Timestamp)
        .unwrap_or(fallback);
    // elapsed seconds, unused
    let _elapsed = fields.next();
    let exit_code = fields
        .next()
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .and_then(|raw| raw.parse::<i32>().ok());

    let command = Command::new(text, ordering_key);
    Some(match exit_code {
        Some(code) => command.with_exit_code(code),
        None => command,
    })
}

/// A marker line with no usable separator. Keep the remainder as a literal
/// command only when it cannot be a truncated metadata block: it must be
/// set off from the marker by whitespace and contain no further colon.
fn recover_malformed(body: &str, fallback: OrderingKey) -> Option<Command> {
    if !body.starts_with(char::is_whitespace) {
        return None;
    }
    let candidate = body.trim();
    if candidate.is_empty() || candidate.contains(EXTENDED_MARKER) {
        return None;
    }
    Some(Command::new(candidate, fallback))
}

fn parse_timestamp(raw: &str, opts: &ParseOptions) -> Option<i64> {
    let digits = raw.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let digits = &digits[..digits.len().min(EPOCH_SECONDS_DIGITS)];
    let ts = digits.parse::<i64>().ok()?;
    opts.timestamp_bounds.contains(&ts).then_some(ts)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FALLBACK: OrderingKey = OrderingKey::Synthetic(7);

    fn parse(line: &str, dialect: Dialect) -> Option<Command> {
        parse_line(line, dialect, FALLBACK, &ParseOptions::default())
    }

    #[test]
    fn test_plain_line() {
        let cmd = parse("  cargo test --all  ", Dialect::Plain).unwrap();
        assert_eq!(cmd.text, "cargo test --all");
        assert_eq!(cmd.ordering_key, FALLBACK);
        assert!(!cmd.has_exit_code);
    }

    #[test]
    fn test_blank_line_yields_nothing() {
        assert!(parse("", Dialect::Plain).is_none());
        assert!(parse("   \t", Dialect::Extended).is_none());
        assert!(parse("   ", Dialect::Auto).is_none());
    }

    #[test]
    fn test_extended_with_exit_code() {
        let cmd = parse(":1600000000:0:1;make build", Dialect::Extended).unwrap();
        assert_eq!(cmd.text, "make build");
        assert_eq!(cmd.ordering_key, OrderingKey::Timestamp(1_600_000_000));
        assert_eq!(cmd.exit_code, 1);
        assert!(cmd.has_exit_code);
    }

    #[test]
    fn test_extended_zsh_layout_without_exit_code() {
        let cmd = parse(": 1600000000:3;ls -la", Dialect::Extended).unwrap();
        assert_eq!(cmd.text, "ls -la");
        assert_eq!(cmd.ordering_key, OrderingKey::Timestamp(1_600_000_000));
        assert!(!cmd.has_exit_code);
    }

    #[test]
    fn test_only_first_separator_splits() {
        let cmd = parse(":1600000000:0;echo a; echo b", Dialect::Extended).unwrap();
        assert_eq!(cmd.text, "echo a; echo b");
    }

    #[test]
    fn test_malformed_without_separator_and_colon_is_dropped() {
        assert!(parse(":garbage:more", Dialect::Extended).is_none());
        assert!(parse(":1600000000:0", Dialect::Extended).is_none());
    }

    #[test]
    fn test_marker_fused_token_is_dropped() {
        assert!(parse(":garbage", Dialect::Extended).is_none());
        assert!(parse(":garbage", Dialect::Auto).is_none());
    }

    #[test]
    fn test_malformed_without_separator_recovers_literal() {
        let cmd = parse(": rebuild cache", Dialect::Extended).unwrap();
        assert_eq!(cmd.text, "rebuild cache");
        assert_eq!(cmd.ordering_key, FALLBACK);

        assert!(parse(": 1600000000:0", Dialect::Extended).is_none());
    }

    #[test]
    fn test_trailing_separator_is_malformed() {
        assert!(parse(":1600000000:0;", Dialect::Extended).is_none());
    }

    #[test]
    fn test_bad_timestamp_uses_fallback() {
        let cmd = parse(":abc:0;whoami", Dialect::Extended).unwrap();
        assert_eq!(cmd.text, "whoami");
        assert_eq!(cmd.ordering_key, FALLBACK);
    }

    #[test]
    fn test_out_of_range_timestamp_uses_fallback() {
        let opts = ParseOptions::from_years(2020, 2030);
        let cmd = parse_line(":1000:0;uptime", Dialect::Extended, FALLBACK, &opts).unwrap();
        assert_eq!(cmd.ordering_key, FALLBACK);

        let cmd = parse_line(":1930000000:0;uptime", Dialect::Extended, FALLBACK, &opts).unwrap();
        assert_eq!(cmd.ordering_key, FALLBACK);
    }

    #[test]
    fn test_millisecond_timestamp_is_cut_to_seconds() {
        let cmd = parse(":1600000000123:0;date", Dialect::Extended).unwrap();
        assert_eq!(cmd.ordering_key, OrderingKey::Timestamp(1_600_000_000));
    }

    #[test]
    fn test_non_numeric_exit_code_is_absent() {
        let cmd = parse(":1600000000:0:x;date", Dialect::Extended).unwrap();
        assert!(!cmd.has_exit_code);
    }

    #[test]
    fn test_auto_detection() {
        assert_eq!(detect_dialect(": 1600000000:0;ls"), Dialect::Extended);
        assert_eq!(detect_dialect("ls"), Dialect::Plain);

        let cmd = parse(":1600000000:0;ls", Dialect::Auto).unwrap();
        assert_eq!(cmd.ordering_key, OrderingKey::Timestamp(1_600_000_000));

        let cmd = parse("ls :1600000000", Dialect::Auto).unwrap();
        assert_eq!(cmd.text, "ls :1600000000");
    }

    #[test]
    fn test_extended_dialect_accepts_plain_lines() {
        let cmd = parse("vim notes.md", Dialect::Extended).unwrap();
        assert_eq!(cmd.text, "vim notes.md");
        assert_eq!(cmd.ordering_key, FALLBACK);
    }

    #[test]
    fn test_plain_dialect_keeps_marker_lines_verbatim() {
        let cmd = parse(":1600000000:0;ls", Dialect::Plain).unwrap();
        assert_eq!(cmd.text, ":1600000000:0;ls");
    }

    #[test]
    fn test_year_bounds() {
        let opts = ParseOptions::from_years(2020, 2029);
        assert_eq!(*opts.timestamp_bounds.start(), 1_577_836_800);
        assert_eq!(*opts.timestamp_bounds.end(), 1_893_455_999);
    }
}
