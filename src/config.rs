use std::{path::PathBuf, time::Duration};

use crate::error::StoriesError;

pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_millis(60_000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub sweep_interval: Duration,
    pub dir: Option<PathBuf>,
    pub db_filename: Option<String>,
    pub seed_demo: bool,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            dir: None,
            db_filename: None,
            seed_demo: true,
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub enum Parameter {
    SweepIntervalMs,
    Dir,
    DbFilename,
    SeedDemo,
    LogLevel,
}

impl Parameter {
    pub fn deserialize(s: &str) -> Result<Self, StoriesError> {
        match s.to_ascii_lowercase().as_str() {
            "sweep-interval-ms" => Ok(Parameter::SweepIntervalMs),
            "dir" => Ok(Parameter::Dir),
            "dbfilename" => Ok(Parameter::DbFilename),
            "seed-demo" => Ok(Parameter::SeedDemo),
            "log-level" => Ok(Parameter::LogLevel),
            _ => Err(StoriesError::InvalidArgument(format!("--{s}"))),
        }
    }

    pub fn serialize(&self) -> &'static str {
        match self {
            Parameter::SweepIntervalMs => "sweep-interval-ms",
            Parameter::Dir => "dir",
            Parameter::DbFilename => "dbfilename",
            Parameter::SeedDemo => "seed-demo",
            Parameter::LogLevel => "log-level",
        }
    }
}

impl Config {
    /// Build a config from `--key value` pairs. The program name must already be stripped.
    pub fn from_args<I, S>(args: I) -> Result<Self, StoriesError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut config = Config::default();
        let mut current_key = None;
        for arg in args {
            let arg = arg.into();
            if let Some(key) = current_key.take() {
                config.set(key, arg)?;
            } else if let Some(name) = arg.strip_prefix("--") {
                current_key = Some(Parameter::deserialize(name)?);
            } else {
                return Err(StoriesError::InvalidArgument(arg));
            }
        }
        if let Some(key) = current_key {
            return Err(StoriesError::InvalidValue {
                parameter: key.serialize(),
                value: String::new(),
            });
        }
        Ok(config)
    }

    fn set(&mut self, key: Parameter, value: String) -> Result<(), StoriesError> {
        let invalid = |value: String| StoriesError::InvalidValue {
            parameter: key.serialize(),
            value,
        };
        match key {
            Parameter::SweepIntervalMs => match value.parse::<u64>() {
                Ok(ms) if ms > 0 => self.sweep_interval = Duration::from_millis(ms),
                _ => return Err(invalid(value)),
            },
            Parameter::Dir => self.dir = Some(PathBuf::from(value)),
            Parameter::DbFilename => self.db_filename = Some(value),
            Parameter::SeedDemo => match value.parse::<bool>() {
                Ok(seed) => self.seed_demo = seed,
                Err(_) => return Err(invalid(value)),
            },
            Parameter::LogLevel => self.log_level = value,
        }
        Ok(())
    }

    /// Where the snapshot lives, if both `--dir` and `--dbfilename` were given.
    pub fn snapshot_path(&self) -> Option<PathBuf> {
        match (&self.dir, &self.db_filename) {
            (Some(dir), Some(name)) => Some(dir.join(name)),
            _ => None,
        }
    }
}
