//! Run configuration, loadable from a JSON file via `--config` before
//! CLI flags apply their own overrides.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::EmuError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub rom: PathBuf,
    pub verbosity: u8,
    pub debugger: bool,
    pub max_cycles: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rom: PathBuf::from("rom.bin"),
            verbosity: 0,
            debugger: false,
            max_cycles: None,
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, EmuError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_the_source_hard_coded_rom_path() {
        let cfg = Config::default();
        assert_eq!(cfg.rom, PathBuf::from("rom.bin"));
        assert!(!cfg.debugger);
        assert_eq!(cfg.max_cycles, None);
    }

    #[test]
    fn partial_json_falls_back_to_defaults_for_missing_fields() {
        let cfg: Config = serde_json::from_str(r#"{"debugger": true}"#).unwrap();
        assert!(cfg.debugger);
        assert_eq!(cfg.rom, PathBuf::from("rom.bin"));
    }
}
