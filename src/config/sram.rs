use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

use crate::cacti::Characterization;

/// One entry of the `srams` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SramConfig {
    pub name: ArcStr,
    /// Word width in bits.
    pub width: usize,
    /// Number of words.
    pub depth: usize,
    #[serde(default = "default_banks")]
    pub banks: usize,
    /// CACTI cache type.
    #[serde(default = "default_cache_type", rename = "type")]
    pub cache_type: String,
    /// Pre-characterized numbers. When present, CACTI is not run.
    #[serde(default)]
    pub characterization: Option<Characterization>,
}

fn default_banks() -> usize {
    1
}

fn default_cache_type() -> String {
    "cache".to_string()
}

impl SramConfig {
    #[inline]
    pub fn width_in_bytes(&self) -> usize {
        (self.width + 7) / 8
    }

    /// Capacity in bytes, as CACTI sees it.
    #[inline]
    pub fn total_size_bytes(&self) -> usize {
        self.width_in_bytes() * self.depth
    }
}
