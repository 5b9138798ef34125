//! The `setoption`-backed option registry: `debug`, `hash`, `nnue-path`,
//! and the `search` combo.

use ataxx_engine::EngineVariant;

use crate::error::UaiError;

const MIN_HASH_MB: u32 = 1;
const MAX_HASH_MB: u32 = 2048;
const DEFAULT_HASH_MB: u32 = 128;
const DEFAULT_NNUE_PATH: &str = "./save.bin";

/// Current value of every registered option.
#[derive(Debug, Clone)]
pub struct Options {
    pub debug: bool,
    pub hash_mb: u32,
    pub nnue_path: String,
    pub search: EngineVariant,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            debug: false,
            hash_mb: DEFAULT_HASH_MB,
            nnue_path: DEFAULT_NNUE_PATH.to_string(),
            search: EngineVariant::default(),
        }
    }
}

impl Options {
    /// Apply `setoption name <name> value <value>`.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), UaiError> {
        match name {
            "debug" => {
                self.debug = parse_bool(value).ok_or_else(|| UaiError::InvalidOptionValue {
                    name: name.to_string(),
                    value: value.to_string(),
                })?;
            }
            "hash" => {
                let mb: u32 = value.parse().map_err(|_| UaiError::InvalidOptionValue {
                    name: name.to_string(),
                    value: value.to_string(),
                })?;
                if !(MIN_HASH_MB..=MAX_HASH_MB).contains(&mb) {
                    return Err(UaiError::InvalidOptionValue {
                        name: name.to_string(),
                        value: value.to_string(),
                    });
                }
                self.hash_mb = mb;
            }
            "nnue-path" => {
                self.nnue_path = value.to_string();
            }
            "search" => {
                self.search = EngineVariant::parse(value).ok_or_else(|| UaiError::InvalidOptionValue {
                    name: name.to_string(),
                    value: value.to_string(),
                })?;
            }
            other => return Err(UaiError::UnknownOption { name: other.to_string() }),
        }
        Ok(())
    }

    /// Print the `uai` handshake's option registration block.
    pub fn print_registration(&self) {
        println!("option name debug type check default false");
        println!(
            "option name hash type spin default {DEFAULT_HASH_MB} min {MIN_HASH_MB} max {MAX_HASH_MB}"
        );
        println!("option name nnue-path type string default {DEFAULT_NNUE_PATH}");
        print!("option name search type combo default tryhard");
        for name in EngineVariant::ALL_NAMES {
            print!(" var {name}");
        }
        println!();
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
