//! Text helpers shared by the writers.

use chrono::{DateTime, Local, Utc};
use std::path::{Path, PathBuf};

/// `yyyy-MM-dd HH:mm:ss` in local time.
pub fn std_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// `yyyy-MM-dd_HH.mm.ss` in local time, used by the summary file.
pub fn summary_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d_%H.%M.%S").to_string()
}

/// Replaces every line break (`\r\n`, `\r` or `\n`) with `". "`.
///
/// # Examples
///
/// ```
/// use jmxmon_output::format::single_line;
///
/// assert_eq!(single_line("a\r\nb\nc"), "a. b. c");
/// ```
pub fn single_line(value: &str) -> String {
    value
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\n', ". ")
}

/// Key prefix of a target in the summary file: `:` and `-` become `.`.
pub fn summary_prefix(name: &str) -> String {
    name.replace([':', '-'], ".")
}

/// Path of a target's own CSV file, derived from the combined CSV path.
///
/// `-address` (with `:` turned into `.`) goes before the extension; a path
/// without a usable extension gets `.csv` appended.
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use jmxmon_output::format::per_target_path;
///
/// assert_eq!(
///     per_target_path("logs/gc.csv".as_ref(), "app1:9010"),
///     PathBuf::from("logs/gc-app1.9010.csv")
/// );
/// assert_eq!(
///     per_target_path("gc".as_ref(), "app1:9010"),
///     PathBuf::from("gc-app1.9010.csv")
/// );
/// ```
pub fn per_target_path(csv: &Path, address: &str) -> PathBuf {
    let insert = format!("-{}", address.replace(':', "."));
    let raw = csv.to_string_lossy();
    let file_start = raw.rfind(['/', '\\']).map(|i| i + 1).unwrap_or(0);
    match raw.rfind('.') {
        Some(dot) if dot > file_start && dot < raw.len() - 1 => {
            PathBuf::from(format!("{}{}{}", &raw[..dot], insert, &raw[dot..]))
        }
        _ => PathBuf::from(format!("{raw}{insert}.csv")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_handles_lone_cr() {
        assert_eq!(single_line("x\ry"), "x. y");
        assert_eq!(single_line("plain"), "plain");
    }

    #[test]
    fn summary_prefix_replaces_separators() {
        assert_eq!(summary_prefix("shop-eu:9010"), "shop.eu.9010");
    }

    #[test]
    fn per_target_path_ignores_dots_in_directories() {
        assert_eq!(
            per_target_path("/var/log.d/gc".as_ref(), "h:1"),
            PathBuf::from("/var/log.d/gc-h.1.csv")
        );
        assert_eq!(
            per_target_path("gc.".as_ref(), "h:1"),
            PathBuf::from("gc.-h.1.csv")
        );
    }
}
