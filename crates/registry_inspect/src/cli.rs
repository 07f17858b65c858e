//! Command-line interface handling for the registry inspector.

use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;

/// Command line arguments parsed from user input.
#[derive(Debug, Clone)]
pub struct CliArgs {
    /// Path to the configuration file
    pub config_path: PathBuf,
    /// Optional override for log level
    pub log_level: Option<String>,
    /// Whether to force JSON log output
    pub json_logs: bool,
    /// Plugins whose registrations are swept after loading
    pub unload_plugins: Vec<String>,
}

impl CliArgs {
    fn command() -> Command {
        Command::new("Registry Inspector")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Resolves an event type hierarchy and reports its handler lists")
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Configuration file path")
                    .default_value("inspect.toml"),
            )
            .arg(
                Arg::new("log-level")
                    .short('l')
                    .long("log-level")
                    .value_name("LEVEL")
                    .help("Log level (trace, debug, info, warn, error)"),
            )
            .arg(
                Arg::new("json-logs")
                    .long("json-logs")
                    .help("Output logs in JSON format")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("unload")
                    .short('u')
                    .long("unload")
                    .value_name("PLUGIN")
                    .help("Unregister everything owned by this plugin after loading")
                    .action(ArgAction::Append),
            )
    }

    /// Parses the process arguments.
    pub fn parse() -> Self {
        Self::from_matches(&Self::command().get_matches())
    }

    /// Parses an explicit argument list, first item being the binary name.
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Ok(Self::from_matches(&Self::command().try_get_matches_from(args)?))
    }

    fn from_matches(matches: &clap::ArgMatches) -> Self {
        Self {
            config_path: matches
                .get_one::<String>("config")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("inspect.toml")),
            log_level: matches.get_one::<String>("log-level").cloned(),
            json_logs: matches.get_flag("json-logs"),
            unload_plugins: matches
                .get_many::<String>("unload")
                .map(|values| values.cloned().collect())
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = CliArgs::try_parse_from(["registry_inspect"]).unwrap();
        assert_eq!(args.config_path, PathBuf::from("inspect.toml"));
        assert_eq!(args.log_level, None);
        assert!(!args.json_logs);
        assert!(args.unload_plugins.is_empty());
    }

    #[test]
    fn test_overrides() {
        let args = CliArgs::try_parse_from([
            "registry_inspect",
            "--config",
            "events.toml",
            "-l",
            "debug",
            "--json-logs",
            "-u",
            "greeter",
            "--unload",
            "logger",
        ])
        .unwrap();
        assert_eq!(args.config_path, PathBuf::from("events.toml"));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(args.json_logs);
        assert_eq!(args.unload_plugins, vec!["greeter", "logger"]);
    }
}
