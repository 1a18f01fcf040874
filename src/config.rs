// SPDX-License-Identifier: MIT
//
// Command-line configuration.

use std::path::PathBuf;

use thiserror::Error;

pub const USAGE: &str = "\
usage: starfield [--frame-ms <n>] [--log <path>]

options:
  --frame-ms <n>   milliseconds between frames (default 10, must be > 0)
  --log <path>     write a log to <path>; level from STARFIELD_LOG (default info)
  -h, --help       print this help";

const DEFAULT_FRAME_MS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub frame_ms: u64,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frame_ms: DEFAULT_FRAME_MS,
            log_file: None,
        }
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(Config),
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgError {
    #[error("unknown argument '{0}'")]
    Unknown(String),
    #[error("{0} needs a value")]
    MissingValue(&'static str),
    #[error("invalid --frame-ms '{0}': expected a positive integer")]
    FrameMs(String),
}

/// Parse arguments (without the program name).
///
/// # Errors
///
/// Returns an [`ArgError`] for unknown flags, missing values, or a frame
/// time that is not a positive integer.
pub fn parse<I>(args: I) -> Result<Command, ArgError>
where
    I: IntoIterator<Item = String>,
{
    let mut config = Config::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "--frame-ms" => {
                let value = args.next().ok_or(ArgError::MissingValue("--frame-ms"))?;
                config.frame_ms = match value.parse::<u64>() {
                    Ok(n) if n > 0 => n,
                    _ => return Err(ArgError::FrameMs(value)),
                };
            }
            "--log" => {
                let value = args.next().ok_or(ArgError::MissingValue("--log"))?;
                config.log_file = Some(PathBuf::from(value));
            }
            _ => return Err(ArgError::Unknown(arg)),
        }
    }

    Ok(Command::Run(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn no_arguments_gives_defaults() {
        assert_eq!(parse(args(&[])), Ok(Command::Run(Config::default())));
    }

    #[test]
    fn all_options() {
        let cmd = parse(args(&["--frame-ms", "25", "--log", "/tmp/sf.log"])).unwrap();
        assert_eq!(
            cmd,
            Command::Run(Config {
                frame_ms: 25,
                log_file: Some(PathBuf::from("/tmp/sf.log")),
            })
        );
    }

    #[test]
    fn help_wins() {
        assert_eq!(parse(args(&["--frame-ms", "5", "-h"])), Ok(Command::Help));
    }

    #[test]
    fn zero_frame_time_is_rejected() {
        assert_eq!(
            parse(args(&["--frame-ms", "0"])),
            Err(ArgError::FrameMs("0".to_owned()))
        );
        assert!(parse(args(&["--frame-ms", "-3"])).is_err());
        assert!(parse(args(&["--frame-ms", "fast"])).is_err());
    }

    #[test]
    fn missing_value() {
        assert_eq!(
            parse(args(&["--log"])),
            Err(ArgError::MissingValue("--log"))
        );
    }

    #[test]
    fn unknown_argument() {
        let err = parse(args(&["--fps"])).unwrap_err();
        assert_eq!(err.to_string(), "unknown argument '--fps'");
    }
}
