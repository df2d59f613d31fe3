//! Command line configuration.

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum CliError {
    #[error("invalid command line flag")]
    InvalidFlag,
    #[error("invalid command line flag value")]
    InvalidFlagValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    /// Primary to replicate from, when started with `--replicaof`.
    pub replica_of: Option<(String, u16)>,
}

impl ServerConfig {
    /// Parses `--port <n>` and `--replicaof "<host> <port>"` from the process
    /// arguments. The first argument (the program name) is skipped.
    pub fn from_args<I: IntoIterator<Item = String>>(args: I) -> Result<Self, CliError> {
        let mut iter = args.into_iter().skip(1);
        let mut port: Option<u16> = None;
        let mut replica_of: Option<(String, u16)> = None;

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--port" => {
                    let Some(value) = iter.next() else {
                        return Err(CliError::InvalidFlagValue);
                    };

                    let parsed = value
                        .parse::<u16>()
                        .map_err(|_| CliError::InvalidFlagValue)?;

                    if parsed == 0 {
                        return Err(CliError::InvalidFlagValue);
                    }

                    port = Some(parsed);
                }
                "--replicaof" => {
                    let Some(value) = iter.next() else {
                        return Err(CliError::InvalidFlagValue);
                    };

                    let Some((host, primary_port)) = value.split_once(' ') else {
                        return Err(CliError::InvalidFlagValue);
                    };

                    let primary_port = primary_port
                        .parse::<u16>()
                        .map_err(|_| CliError::InvalidFlagValue)?;

                    if host.is_empty() || primary_port == 0 {
                        return Err(CliError::InvalidFlagValue);
                    }

                    replica_of = Some((host.to_string(), primary_port));
                }
                _ => return Err(CliError::InvalidFlag),
            }
        }

        Ok(ServerConfig {
            port: port.unwrap_or(6379),
            replica_of,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{CliError, ServerConfig};

    fn args(items: &[&str]) -> Vec<String> {
        std::iter::once("ember")
            .chain(items.iter().copied())
            .map(|item| item.to_string())
            .collect()
    }

    #[test]
    fn test_from_args() {
        let test_cases = vec![
            (
                args(&[]),
                Ok(ServerConfig {
                    port: 6379,
                    replica_of: None,
                }),
            ),
            (
                args(&["--port", "7000"]),
                Ok(ServerConfig {
                    port: 7000,
                    replica_of: None,
                }),
            ),
            (
                args(&["--port", "7001", "--replicaof", "127.0.0.1 6379"]),
                Ok(ServerConfig {
                    port: 7001,
                    replica_of: Some(("127.0.0.1".to_string(), 6379)),
                }),
            ),
            (args(&["--port"]), Err(CliError::InvalidFlagValue)),
            (args(&["--port", "banana"]), Err(CliError::InvalidFlagValue)),
            (args(&["--port", "0"]), Err(CliError::InvalidFlagValue)),
            (args(&["--port", "70000"]), Err(CliError::InvalidFlagValue)),
            (
                args(&["--replicaof", "localhost"]),
                Err(CliError::InvalidFlagValue),
            ),
            (
                args(&["--replicaof", "localhost x"]),
                Err(CliError::InvalidFlagValue),
            ),
            (args(&["--verbose"]), Err(CliError::InvalidFlag)),
        ];

        for (input, expected) in test_cases {
            assert_eq!(
                ServerConfig::from_args(input.clone()),
                expected,
                "parsing {:?}",
                input
            );
        }
    }
}
