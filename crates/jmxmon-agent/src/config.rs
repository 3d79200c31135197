use anyhow::{bail, Context, Result};
use jmxmon_jolokia::JolokiaConfig;
use jmxmon_output::manager::OutputSettings;
use serde::Deserialize;
use std::path::PathBuf;

/// Agent settings: a TOML file, then `key=value` command line overrides.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_period_secs")]
    pub period_secs: u64,
    /// Addresses (`host:port`), separated by `,`, `;` or whitespace.
    #[serde(default)]
    pub url: String,
    /// Display names, one per address or one for all.
    pub servername: Option<String>,
    pub usr: Option<String>,
    pub pwd: Option<String>,
    #[serde(default = "default_true")]
    pub console: bool,
    /// Write a GC file per target next to `csv_file`.
    #[serde(default)]
    pub all_gc_values: bool,
    /// Empty disables.
    #[serde(default = "default_summary_file")]
    pub summary_file: Option<String>,
    pub csv_file: Option<String>,
    #[serde(default = "default_error_file")]
    pub error_file: Option<String>,
    /// Attribute records, sampled in this order.
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub jolokia: JolokiaConfig,
}

fn default_period_secs() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn default_summary_file() -> Option<String> {
    Some("jmxmon.summary.txt".to_string())
}

fn default_error_file() -> Option<String> {
    Some("jmxmon.error.log".to_string())
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            period_secs: default_period_secs(),
            url: String::new(),
            servername: None,
            usr: None,
            pwd: None,
            console: true,
            all_gc_values: false,
            summary_file: default_summary_file(),
            csv_file: None,
            error_file: default_error_file(),
            attributes: Vec::new(),
            jolokia: JolokiaConfig::default(),
        }
    }
}

impl AgentConfig {
    pub fn load(path: &str) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Cannot read config file '{path}'"))?;
        Self::parse(&content).with_context(|| format!("Invalid config file '{path}'"))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Applies `key=value` arguments. Keys are case-insensitive; `attrN`
    /// entries are appended to `attributes` in ascending `N`.
    pub fn apply_overrides<S: AsRef<str>>(&mut self, args: &[S]) -> Result<()> {
        let mut numbered = Vec::new();
        for arg in args {
            let arg = arg.as_ref();
            let Some((key, value)) = arg.split_once('=') else {
                bail!("Argument '{arg}' is not key=value");
            };
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();

            match key.as_str() {
                "period_secs" | "periodseconds" => {
                    self.period_secs = value
                        .parse()
                        .with_context(|| format!("'{value}' is not a number of seconds"))?;
                }
                "url" => self.url = value.to_string(),
                "servername" => self.servername = Some(value.to_string()),
                "usr" => self.usr = Some(value.to_string()),
                "pwd" => self.pwd = Some(value.to_string()),
                "console" => self.console = parse_flag(value),
                "all_gc_values" | "allgcvalues" => self.all_gc_values = parse_flag(value),
                "summary_file" | "nagiosfile" => self.summary_file = Some(value.to_string()),
                "csv_file" | "csvfile" => self.csv_file = Some(value.to_string()),
                "error_file" | "errorfile" => self.error_file = Some(value.to_string()),
                other => match other.strip_prefix("attr").map(str::parse::<u32>) {
                    Some(Ok(n)) => numbered.push((n, value.to_string())),
                    _ => bail!("Unknown setting '{key}'"),
                },
            }
        }
        numbered.sort_by_key(|(n, _)| *n);
        self.attributes
            .extend(numbered.into_iter().map(|(_, record)| record));
        Ok(())
    }

    pub fn output_settings(&self) -> OutputSettings {
        OutputSettings {
            console: self.console,
            summary_file: non_empty_path(&self.summary_file),
            csv_file: non_empty_path(&self.csv_file),
            all_gc_values: self.all_gc_values,
            error_file: non_empty_path(&self.error_file),
        }
    }

    /// One-line description for the startup log. Passwords are left out.
    pub fn describe(&self) -> String {
        format!(
            "period_secs={}, servername={}, url={}, usr={}, summary_file={}, csv_file={}, error_file={}, attributes={}",
            self.period_secs,
            self.servername.as_deref().unwrap_or("-"),
            self.url,
            self.usr.as_deref().unwrap_or("-"),
            self.summary_file.as_deref().unwrap_or("-"),
            self.csv_file.as_deref().unwrap_or("-"),
            self.error_file.as_deref().unwrap_or("-"),
            self.attributes.len()
        )
    }
}

/// Splits command line arguments into the config file path and the
/// `key=value` overrides.
///
/// The path is either the first argument when it is not `key=value`, or the
/// value of a `propfile=` argument anywhere in the list. The last one given
/// wins.
pub fn split_args<S: AsRef<str>>(args: &[S]) -> (Option<String>, Vec<String>) {
    let mut path = None;
    let mut overrides = Vec::with_capacity(args.len());
    for (i, arg) in args.iter().enumerate() {
        let arg = arg.as_ref();
        match arg.split_once('=') {
            Some((key, value)) if key.trim().eq_ignore_ascii_case("propfile") => {
                path = Some(value.trim().to_string()).filter(|p| !p.is_empty());
            }
            None if i == 0 => path = Some(arg.to_string()),
            _ => overrides.push(arg.to_string()),
        }
    }
    (path, overrides)
}

/// `1` or `true` (any case) is on, everything else off.
fn parse_flag(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

fn non_empty_path(value: &Option<String>) -> Option<PathBuf> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_from_minimal_file() {
        let config = AgentConfig::parse("url = \"app1:8778\"").unwrap();
        assert_eq!(config.period_secs, 10);
        assert!(config.console);
        assert_eq!(config.summary_file.as_deref(), Some("jmxmon.summary.txt"));
        assert_eq!(config.error_file.as_deref(), Some("jmxmon.error.log"));
        assert_eq!(config.csv_file, None);
        assert_eq!(config.jolokia.path, "/jolokia");
    }

    #[test]
    fn full_file() {
        let config = AgentConfig::parse(
            r#"
            period_secs = 30
            url = "a:1, b:2"
            servername = "shop billing"
            console = false
            csv_file = "jmxmon.csv"
            attributes = ["; Threads; ThreadCount; java.lang:type=Threading"]

            [jolokia]
            tls = true
            timeout_secs = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.period_secs, 30);
        assert!(!config.console);
        assert_eq!(config.attributes.len(), 1);
        assert!(config.jolokia.tls);
        assert_eq!(config.jolokia.timeout_secs, 2);
    }

    #[test]
    fn overrides_take_precedence_and_accept_aliases() {
        let mut config = AgentConfig::parse("url = \"a:1\"\nperiod_secs = 30").unwrap();
        config
            .apply_overrides(&[
                "PeriodSeconds=5",
                "url=b:2",
                "allgcvalues=1",
                "csvfile=out.csv",
                "nagiosfile=",
                "console=no",
                "attr2=; B; Uptime; java.lang:type=Runtime",
                "attr1=; A; ThreadCount; java.lang:type=Threading",
            ])
            .unwrap();
        assert_eq!(config.period_secs, 5);
        assert_eq!(config.url, "b:2");
        assert!(config.all_gc_values);
        assert!(!config.console);
        assert!(config.attributes[0].contains("; A;"));
        assert!(config.attributes[1].contains("; B;"));

        let settings = config.output_settings();
        assert_eq!(settings.summary_file, None);
        assert_eq!(settings.csv_file, Some(PathBuf::from("out.csv")));
    }

    #[test]
    fn config_path_from_position_or_propfile() {
        let (path, rest) = split_args(&["agent.toml", "url=a:1"]);
        assert_eq!(path.as_deref(), Some("agent.toml"));
        assert_eq!(rest, vec!["url=a:1"]);

        let (path, rest) = split_args(&["url=a:1", "PropFile= jmx.toml "]);
        assert_eq!(path.as_deref(), Some("jmx.toml"));
        assert_eq!(rest, vec!["url=a:1"]);

        let (path, rest) = split_args(&["url=a:1"]);
        assert_eq!(path, None);
        assert_eq!(rest, vec!["url=a:1"]);

        let (path, _) = split_args(&["propfile="]);
        assert_eq!(path, None);
    }

    #[test]
    fn unknown_override_is_rejected() {
        let mut config = AgentConfig::default();
        assert!(config.apply_overrides(&["colour=blue"]).is_err());
        assert!(config.apply_overrides(&["url"]).is_err());
        assert!(config.apply_overrides(&["attrx=1"]).is_err());
    }

    #[test]
    fn describe_hides_password() {
        let mut config = AgentConfig::default();
        config.usr = Some("admin".into());
        config.pwd = Some("hunter2".into());
        let text = config.describe();
        assert!(text.contains("usr=admin"));
        assert!(!text.contains("hunter2"));
    }
}
