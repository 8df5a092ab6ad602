//! Command-line arguments
//!
//! All tools take an optional config path followed by a few flags. Each
//! binary reads only the fields it cares about.

use std::path::PathBuf;

use thiserror::Error;

/// Config file used when none is given
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Argument errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ArgsError {
    #[error("unknown option '{0}'")]
    UnknownOption(String),

    #[error("option '{0}' needs a value")]
    MissingValue(&'static str),

    #[error("invalid value '{value}' for '{option}'")]
    InvalidValue { option: &'static str, value: String },

    #[error("unexpected argument '{0}'")]
    Unexpected(String),
}

impl From<ArgsError> for flipdot_core::Error {
    fn from(e: ArgsError) -> Self {
        flipdot_core::Error::Other(e.to_string())
    }
}

/// Parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    /// YAML config file
    pub config: PathBuf,
    /// Feed the configured test packet through the simulator at start-up
    pub self_test: bool,
    /// Keep redrawing instead of drawing once
    pub repeat: bool,
    /// Open a window instead of printing to the terminal
    pub window: bool,
    /// Replay a packet log instead of listening on the port
    pub replay: Option<PathBuf>,
    /// Stop after this many packets
    pub count: Option<u64>,
    /// Print usage and exit
    pub help: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            config: PathBuf::from(DEFAULT_CONFIG_PATH),
            self_test: false,
            repeat: false,
            window: false,
            replay: None,
            count: None,
            help: false,
        }
    }
}

impl Args {
    /// Parse the process arguments
    pub fn from_env() -> Result<Self, ArgsError> {
        Self::parse(std::env::args().skip(1))
    }

    /// Parse arguments (without the program name)
    pub fn parse<I>(args: I) -> Result<Self, ArgsError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut parsed = Args::default();
        let mut config_given = false;
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--self-test" => parsed.self_test = true,
                "--loop" => parsed.repeat = true,
                "--window" => parsed.window = true,
                "-h" | "--help" => parsed.help = true,
                "--replay" => {
                    let path = args.next().ok_or(ArgsError::MissingValue("--replay"))?;
                    parsed.replay = Some(PathBuf::from(path));
                }
                "--count" => {
                    let value = args.next().ok_or(ArgsError::MissingValue("--count"))?;
                    let count = value.parse().map_err(|_| ArgsError::InvalidValue {
                        option: "--count",
                        value: value.clone(),
                    })?;
                    parsed.count = Some(count);
                }
                other if other.starts_with('-') => {
                    return Err(ArgsError::UnknownOption(other.to_owned()));
                }
                _ if !config_given => {
                    parsed.config = PathBuf::from(arg);
                    config_given = true;
                }
                _ => return Err(ArgsError::Unexpected(arg)),
            }
        }

        Ok(parsed)
    }
}

/// Usage text shared by the tools
pub fn usage(program: &str, options: &str) -> String {
    format!("usage: {} [config.yaml] {}", program, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, ArgsError> {
        Args::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]).unwrap();
        assert_eq!(args, Args::default());
        assert_eq!(args.config, PathBuf::from("config.yaml"));
    }

    #[test]
    fn test_config_and_flags() {
        let args = parse(&["bench.yaml", "--self-test", "--window", "--count", "5"]).unwrap();
        assert_eq!(args.config, PathBuf::from("bench.yaml"));
        assert!(args.self_test);
        assert!(args.window);
        assert!(!args.repeat);
        assert_eq!(args.count, Some(5));
    }

    #[test]
    fn test_replay() {
        let args = parse(&["--replay", "packet_log.json"]).unwrap();
        assert_eq!(args.replay, Some(PathBuf::from("packet_log.json")));
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse(&["--bogus"]), Err(ArgsError::UnknownOption("--bogus".into())));
        assert_eq!(parse(&["--count"]), Err(ArgsError::MissingValue("--count")));
        assert_eq!(
            parse(&["--count", "many"]),
            Err(ArgsError::InvalidValue { option: "--count", value: "many".into() })
        );
        assert_eq!(parse(&["a.yaml", "b.yaml"]), Err(ArgsError::Unexpected("b.yaml".into())));
    }
}
