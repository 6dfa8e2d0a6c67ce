use anyhow::{bail, Context, Result};

use crate::command::parse_size;
use crate::core::allocator::FitStrategy;

/// Memory size used when none is given on the command line.
pub const DEFAULT_MEMORY_SIZE: u64 = 500;

/// Settings a session starts with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Size of the simulated address space.
    pub memory_size: u64,
    /// Strategy selected when the session starts.
    pub strategy: FitStrategy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            memory_size: DEFAULT_MEMORY_SIZE,
            strategy: FitStrategy::default(),
        }
    }
}

impl Config {
    /// Reads `[SIZE] [STRATEGY]` from the command-line arguments
    /// (without the program name).
    pub fn from_args<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut config = Self::default();
        let mut args = args.into_iter();

        if let Some(size) = args.next() {
            config.memory_size = parse_size(size.as_ref())
                .with_context(|| format!("Invalid memory size `{}`.", size.as_ref()))?;
        }
        if let Some(strategy) = args.next() {
            config.strategy = strategy.as_ref().parse::<FitStrategy>()?;
        }
        if let Some(extra) = args.next() {
            bail!("Unexpected argument `{}` (usage: blockfit [SIZE] [STRATEGY]).", extra.as_ref());
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_arguments() {
        let config = Config::from_args(Vec::<String>::new()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.memory_size, 500);
        assert_eq!(config.strategy, FitStrategy::FirstFit);
    }

    #[test]
    fn reads_size_and_strategy() {
        let config = Config::from_args(["64", "best-fit"]).unwrap();
        assert_eq!(config.memory_size, 64);
        assert_eq!(config.strategy, FitStrategy::BestFit);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(Config::from_args(["0"]).is_err());
        assert!(Config::from_args(["big"]).is_err());
        assert!(Config::from_args(["10", "buddy"]).is_err());
        assert!(Config::from_args(["10", "ff", "extra"]).is_err());
    }
}
