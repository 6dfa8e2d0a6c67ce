use std::str::FromStr;

use thiserror::Error;

use crate::core::allocator::{AllocationError, DeallocationError, FitStrategy, UnknownStrategy};

/// One request typed by the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Allocate { size: u64, owner: Option<String> },
    Deallocate { address: u64 },
    Strategy(FitStrategy),
    Reset,
    Map,
    Stats,
    Help,
    Quit,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command `{0}` (type `help` for the list).")]
    Unknown(String),
    #[error("Missing {0}.")]
    MissingArgument(&'static str),
    #[error("Unexpected argument `{0}`.")]
    UnexpectedArgument(String),
    #[error(transparent)]
    Allocation(#[from] AllocationError),
    #[error(transparent)]
    Deallocation(#[from] DeallocationError),
    #[error(transparent)]
    Strategy(#[from] UnknownStrategy),
}

pub const HELP: &str = "\
Commands:
  alloc <size> [owner]   allocate <size> units, optionally tagged with an owner
  free <address>         free the allocated block starting at <address>
  strategy <name>        select first-fit, best-fit, worst-fit or next-fit
  reset                  start over with a single free block
  map                    print the memory map
  stats                  print memory statistics
  help                   print this message
  quit                   leave";

impl Command {
    /// Parses a line of input. Blank lines and `#` comments give
    /// `Ok(None)`.
    pub fn parse_line(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        line.parse().map(Some)
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let name = words.next().unwrap_or_default().to_ascii_lowercase();

        let command = match name.as_str() {
            "alloc" | "allocate" | "a" => {
                let size = words.next().ok_or(CommandError::MissingArgument("size"))?;
                Command::Allocate {
                    size: parse_size(size)?,
                    owner: words.next().map(String::from),
                }
            }
            "free" | "dealloc" | "deallocate" | "f" => {
                let address = words
                    .next()
                    .ok_or(CommandError::MissingArgument("address"))?;
                Command::Deallocate {
                    address: parse_address(address)?,
                }
            }
            "strategy" | "algo" | "s" => {
                let strategy = words
                    .next()
                    .ok_or(CommandError::MissingArgument("strategy name"))?;
                Command::Strategy(strategy.parse::<FitStrategy>()?)
            }
            "reset" => Command::Reset,
            "map" => Command::Map,
            "stats" => Command::Stats,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            _ => return Err(CommandError::Unknown(name)),
        };

        match words.next() {
            Some(extra) => Err(CommandError::UnexpectedArgument(extra.to_string())),
            None => Ok(command),
        }
    }
}

/// Sizes must be positive integers.
pub fn parse_size(input: &str) -> Result<u64, AllocationError> {
    match input.parse::<u64>() {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(AllocationError::InvalidSize(input.to_string())),
    }
}

/// Addresses must be non-negative integers.
pub fn parse_address(input: &str) -> Result<u64, DeallocationError> {
    input
        .parse::<u64>()
        .map_err(|_| DeallocationError::InvalidAddress(input.to_string()))
}
