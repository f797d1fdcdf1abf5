use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;
use thiserror::Error as ThisError;

use crate::codec::DEFAULT_MAX_LINE_LENGTH;

/// Ports below this one are reserved and refused.
pub const MIN_PORT: u16 = 1024;

#[derive(Parser, Debug)]
#[command(about = "Serve files over a minimal GET/PUT line protocol")]
pub struct Args {
    /// The port to listen on
    pub port: u16,

    /// The address to bind to
    #[arg(short, long, default_value = "0.0.0.0")]
    pub bind: IpAddr,

    /// Directory requested filenames are resolved against
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,

    /// Read-buffer capacity; bounds the request line and every chunk of a PUT body
    #[arg(long, env = "FILEXFER_MAX_LINE_LENGTH", default_value_t = DEFAULT_MAX_LINE_LENGTH)]
    pub max_line_length: usize,
}

#[derive(Debug, ThisError, PartialEq)]
pub enum ConfigError {
    #[error("port {0} is reserved, ports below 1024 are not allowed")]
    PrivilegedPort(u16),
    #[error("the maximum line length must be at least 1 byte")]
    InvalidLineLength,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub bind: IpAddr,
    pub port: u16,
    pub root: PathBuf,
    pub max_line_length: usize,
}

impl Config {
    pub fn new(port: u16) -> Result<Config, ConfigError> {
        Config::try_from(Args {
            port,
            bind: IpAddr::from([0, 0, 0, 0]),
            root: PathBuf::from("."),
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        })
    }
}

impl TryFrom<Args> for Config {
    type Error = ConfigError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        if args.port < MIN_PORT {
            return Err(ConfigError::PrivilegedPort(args.port));
        }

        if args.max_line_length == 0 {
            return Err(ConfigError::InvalidLineLength);
        }

        Ok(Config {
            bind: args.bind,
            port: args.port,
            root: args.root,
            max_line_length: args.max_line_length,
        })
    }
}
