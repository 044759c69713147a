//! Engine configuration: table size, thread count and search tunables.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::board::search::SearchParams;

pub const DEFAULT_HASH_MB: usize = 16;
pub const MIN_HASH_MB: usize = 1;
pub const MAX_HASH_MB: usize = 65536;
pub const MAX_THREADS: usize = 256;

/// Error returned by [`EngineOptions::set_option`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionError {
    /// No option with this name
    UnknownOption { name: String },
    /// The value could not be parsed for this option
    InvalidValue { name: String, value: String },
    /// The value parsed but lies outside the allowed range
    OutOfRange {
        name: String,
        value: i64,
        min: i64,
        max: i64,
    },
}

impl fmt::Display for OptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionError::UnknownOption { name } => write!(f, "Unknown option '{name}'"),
            OptionError::InvalidValue { name, value } => {
                write!(f, "Invalid value '{value}' for option '{name}'")
            }
            OptionError::OutOfRange {
                name,
                value,
                min,
                max,
            } => write!(f, "Value {value} for option '{name}' is outside {min}..={max}"),
        }
    }
}

impl std::error::Error for OptionError {}

/// Follow-up work a caller must do after an option changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionAction {
    /// The transposition table must be reallocated to this many MiB.
    ResizeHash(usize),
}

/// Options a front-end can set on the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineOptions {
    /// Transposition table size in MiB
    pub hash_mb: usize,
    /// Search threads (1 = single-threaded, deterministic)
    pub threads: usize,
    pub params: SearchParams,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            hash_mb: DEFAULT_HASH_MB,
            threads: 1,
            params: SearchParams::default(),
        }
    }
}

fn parse_in_range(name: &str, value: &str, min: i64, max: i64) -> Result<i64, OptionError> {
    let parsed = value
        .trim()
        .parse::<i64>()
        .map_err(|_| OptionError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
        })?;
    if (min..=max).contains(&parsed) {
        Ok(parsed)
    } else {
        Err(OptionError::OutOfRange {
            name: name.to_string(),
            value: parsed,
            min,
            max,
        })
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool, OptionError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" => Ok(true),
        "false" | "0" | "off" => Ok(false),
        _ => Err(OptionError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
        }),
    }
}

impl EngineOptions {
    /// Apply a textual option setting. Names are case-insensitive:
    /// `Hash`, `Threads`, `NullMove`, `AspirationDelta`.
    ///
    /// On error the options are left unchanged.
    pub fn set_option(&mut self, name: &str, value: &str) -> Result<Option<OptionAction>, OptionError> {
        let normalized = name.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "hash" => {
                let mb = parse_in_range(name, value, MIN_HASH_MB as i64, MAX_HASH_MB as i64)? as usize;
                if mb != self.hash_mb {
                    self.hash_mb = mb;
                    return Ok(Some(OptionAction::ResizeHash(mb)));
                }
            }
            "threads" => {
                self.threads = parse_in_range(name, value, 1, MAX_THREADS as i64)? as usize;
            }
            "nullmove" => {
                self.params.null_move = parse_bool(name, value)?;
            }
            "aspirationdelta" => {
                self.params.aspiration_delta = parse_in_range(name, value, 1, 1000)? as i32;
            }
            _ => {
                return Err(OptionError::UnknownOption {
                    name: name.to_string(),
                })
            }
        }
        Ok(None)
    }
}
