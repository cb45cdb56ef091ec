use anyhow::Context;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;

use crate::Result;

pub mod process;
pub mod sram;

pub use process::{ProcessConfig, ProcessRules};
pub use sram::SramConfig;

/// A generator run: one process shared by every SRAM in `srams`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub process: ProcessConfig,
    pub srams: Vec<SramConfig>,
}

/// Reads a configuration file.
///
/// Files ending in `.json` are read in the JSON dialect, where lines starting
/// with `#` are comments. Anything else is read as TOML.
pub fn parse_config(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration file {path:?}"))?;
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let config = if is_json {
        parse_json_config(&contents)
    } else {
        parse_toml_config(&contents)
    };
    config.with_context(|| format!("failed to parse configuration file {path:?}"))
}

pub fn parse_toml_config(contents: &str) -> Result<Config> {
    let data = toml::from_str(contents)?;
    Ok(data)
}

pub fn parse_json_config(contents: &str) -> Result<Config> {
    let stripped = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n");
    let data = serde_json::from_str(&stripped)?;
    Ok(data)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Str(String),
}

/// Accepts either a boolean or the strings `"true"`/`"false"`.
pub(crate) fn de_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Str(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(D::Error::custom(format!("expected `true` or `false`, got `{s}`"))),
        },
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Number {
    Float(f64),
    Str(String),
}

/// Accepts either a number or a string holding a number.
pub(crate) fn de_number<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Number::deserialize(deserializer)? {
        Number::Float(x) => Ok(x),
        Number::Str(s) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("expected a number, got `{s}`"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOML_CONFIG: &str = r#"
        tech_nm = 45
        metal_prefix = "metal"
        pin_width_nm = 70
        pin_pitch_nm = 140
        snap_width_nm = 190
        snap_height_nm = 1400
        voltage = 1.1

        [[srams]]
        name = "fakeram45_64x32"
        width = 32
        depth = 64

        [[srams]]
        name = "fakeram45_256x16"
        width = 16
        depth = 256
        type = "ram"

        [srams.characterization]
        width_um = 60.0
        height_um = 80.0
        access_time_ns = 0.3
        cycle_time_ns = 0.5
    "#;

    const JSON_CONFIG: &str = r#"
        # Process parameters
        {
          "tech_nm": 45,
          "voltage": "1.1",
          "metalPrefix": "metal",
          "pinWidth_nm": 70,
          "pinPitch_nm": 140,
          "pinHeight_nm": 280,
          "flipPins": "True",
          # SRAM list
          "srams": [
            { "name": "fakeram45_64x32", "width": 32, "depth": 64, "banks": 1 }
          ]
        }
    "#;

    #[test]
    fn test_parse_toml_config() {
        let config = parse_toml_config(TOML_CONFIG).expect("failed to parse config");
        assert_eq!(config.process.tech_nm, 45);
        assert_eq!(config.process.metal_prefix, "metal");
        assert_eq!(config.process.pin_height_nm, None);
        assert_eq!(config.process.snap_height_nm, 1400);
        assert!(!config.process.flip_pins);
        assert_eq!(config.srams.len(), 2);
        assert_eq!(config.srams[0].cache_type, "cache");
        assert!(config.srams[0].characterization.is_none());
        assert_eq!(config.srams[1].cache_type, "ram");
        let characterization = config.srams[1].characterization.as_ref().unwrap();
        assert_eq!(characterization.height_um, 80.0);
    }

    #[test]
    fn test_parse_json_config() {
        let config = parse_json_config(JSON_CONFIG).expect("failed to parse config");
        assert_eq!(config.process.metal_prefix, "metal");
        assert_eq!(config.process.pin_height_nm, Some(280));
        assert_eq!(config.process.snap_width_nm, 1);
        assert_eq!(config.process.voltage, 1.1);
        assert!(config.process.flip_pins);
        assert_eq!(config.srams[0].name.as_str(), "fakeram45_64x32");
        assert_eq!(config.srams[0].banks, 1);
    }

    #[test]
    fn test_reject_bad_flag() {
        let bad = TOML_CONFIG.replace("voltage = 1.1", "voltage = 1.1\nflip_pins = \"maybe\"");
        assert!(parse_toml_config(&bad).is_err());
    }
}
