use arcstr::ArcStr;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{de_flag, de_number};
use crate::error::{LayoutError, LayoutResult};
use crate::layout::Layer;

/// Number of minimum pin pitches kept clear at each end of the pin edge.
pub const EDGE_OFFSET_TRACKS: i64 = 10;
/// Default supply strap width, in minimum pin widths.
pub const STRAP_WIDTH_MULTIPLE: i64 = 4;
/// Default supply strap pitch, in minimum pin pitches.
pub const STRAP_PITCH_MULTIPLE: i64 = 8;

/// Metal layer carrying signal pins when pins are flipped.
pub const FLIPPED_PIN_METAL: u8 = 3;
/// Metal layer carrying signal pins otherwise.
pub const PIN_METAL: u8 = 4;
/// Metal layer carrying the supply straps. Also the topmost layer of the macro.
pub const STRAP_METAL: u8 = 4;

/// Process parameters as written in the configuration file.
///
/// Lengths are integer nanometers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessConfig {
    pub tech_nm: u32,
    #[serde(alias = "metalPrefix")]
    pub metal_prefix: String,
    #[serde(alias = "pinWidth_nm")]
    pub pin_width_nm: u32,
    #[serde(alias = "pinPitch_nm")]
    pub pin_pitch_nm: u32,
    /// Defaults to the pin width (square pins).
    #[serde(default, alias = "pinHeight_nm")]
    pub pin_height_nm: Option<u32>,
    #[serde(default = "default_snap", alias = "snapWidth_nm")]
    pub snap_width_nm: u32,
    #[serde(default = "default_snap", alias = "snapHeight_nm")]
    pub snap_height_nm: u32,
    #[serde(default, alias = "flipPins", deserialize_with = "de_flag")]
    pub flip_pins: bool,
    #[serde(deserialize_with = "de_number")]
    pub voltage: f64,
    #[serde(default, alias = "strapWidth_nm")]
    pub strap_width_nm: Option<u32>,
    #[serde(default, alias = "strapPitch_nm")]
    pub strap_pitch_nm: Option<u32>,
}

fn default_snap() -> u32 {
    1
}

#[inline]
pub(crate) fn nm_to_um(nm: u32) -> Decimal {
    Decimal::new(nm as i64, 3)
}

/// Rounds `um` up to the next multiple of `grid_nm` nanometers.
pub fn snap_up(um: Decimal, grid_nm: u32) -> Decimal {
    let grid = Decimal::from(grid_nm.max(1));
    // Drop sub-picometer noise left over from float conversion before rounding up.
    let nm = (um * dec!(1000)).round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero);
    (nm / grid).ceil() * grid / dec!(1000)
}

impl ProcessConfig {
    #[inline]
    pub fn tech_um(&self) -> Decimal {
        nm_to_um(self.tech_nm)
    }

    /// Snaps a characterized macro width up to the placement grid.
    #[inline]
    pub fn snap_width(&self, width_um: Decimal) -> Decimal {
        snap_up(width_um, self.snap_width_nm)
    }

    /// Snaps a characterized macro height up to the placement grid.
    #[inline]
    pub fn snap_height(&self, height_um: Decimal) -> Decimal {
        snap_up(height_um, self.snap_height_nm)
    }

    /// The design rules used for physical planning, in micrometers.
    pub fn rules(&self) -> LayoutResult<ProcessRules> {
        let pin_width = nm_to_um(self.pin_width_nm);
        let pin_pitch = nm_to_um(self.pin_pitch_nm);
        let pin_height = nm_to_um(self.pin_height_nm.unwrap_or(self.pin_width_nm));
        let rules = ProcessRules::new(
            pin_width,
            pin_height,
            pin_pitch,
            self.metal_prefix.as_str(),
            self.flip_pins,
        )?;

        match (self.strap_width_nm, self.strap_pitch_nm) {
            (None, None) => Ok(rules),
            (width, pitch) => {
                let width = width.map(nm_to_um).unwrap_or(rules.strap_width);
                let pitch = pitch.map(nm_to_um).unwrap_or(rules.strap_pitch);
                rules.with_straps(width, pitch)
            }
        }
    }
}

/// Technology constants shared by every memory in a run.
///
/// All lengths are in micrometers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessRules {
    min_pin_width: Decimal,
    pin_height: Decimal,
    min_pin_pitch: Decimal,
    metal_prefix: ArcStr,
    flip_pins: bool,
    strap_width: Decimal,
    strap_pitch: Decimal,
}

impl ProcessRules {
    pub fn new(
        min_pin_width: Decimal,
        pin_height: Decimal,
        min_pin_pitch: Decimal,
        metal_prefix: impl Into<ArcStr>,
        flip_pins: bool,
    ) -> LayoutResult<Self> {
        if min_pin_width <= Decimal::ZERO {
            return Err(LayoutError::InvalidRule {
                rule: "minimum pin width",
                value: min_pin_width.to_string(),
            });
        }
        if min_pin_pitch < min_pin_width {
            return Err(LayoutError::InvalidRule {
                rule: "minimum pin pitch",
                value: format!("{min_pin_pitch} is less than the pin width {min_pin_width}"),
            });
        }
        let edge_offset = min_pin_pitch * Decimal::from(EDGE_OFFSET_TRACKS);
        if pin_height <= Decimal::ZERO || pin_height > edge_offset {
            return Err(LayoutError::InvalidRule {
                rule: "pin height",
                value: format!("{pin_height} must be in (0, {edge_offset}]"),
            });
        }

        let rules = Self {
            min_pin_width,
            pin_height,
            min_pin_pitch,
            metal_prefix: metal_prefix.into(),
            flip_pins,
            strap_width: min_pin_width * Decimal::from(STRAP_WIDTH_MULTIPLE),
            strap_pitch: min_pin_pitch * Decimal::from(STRAP_PITCH_MULTIPLE),
        };
        Ok(rules)
    }

    /// Overrides the supply strap width and pitch.
    pub fn with_straps(mut self, strap_width: Decimal, strap_pitch: Decimal) -> LayoutResult<Self> {
        if strap_width <= Decimal::ZERO {
            return Err(LayoutError::InvalidRule {
                rule: "strap width",
                value: strap_width.to_string(),
            });
        }
        let edge_offset = self.edge_offset();
        if strap_width > Decimal::TWO * edge_offset {
            return Err(LayoutError::InvalidRule {
                rule: "strap width",
                value: format!("{strap_width} is wider than twice the edge margin {edge_offset}"),
            });
        }
        if strap_pitch <= strap_width {
            return Err(LayoutError::InvalidRule {
                rule: "strap pitch",
                value: format!("{strap_pitch} must exceed the strap width {strap_width}"),
            });
        }
        self.strap_width = strap_width;
        self.strap_pitch = strap_pitch;
        Ok(self)
    }

    #[inline]
    pub fn min_pin_width(&self) -> Decimal {
        self.min_pin_width
    }

    #[inline]
    pub fn pin_height(&self) -> Decimal {
        self.pin_height
    }

    #[inline]
    pub fn min_pin_pitch(&self) -> Decimal {
        self.min_pin_pitch
    }

    #[inline]
    pub fn metal_prefix(&self) -> &ArcStr {
        &self.metal_prefix
    }

    #[inline]
    pub fn flip_pins(&self) -> bool {
        self.flip_pins
    }

    #[inline]
    pub fn strap_width(&self) -> Decimal {
        self.strap_width
    }

    #[inline]
    pub fn strap_pitch(&self) -> Decimal {
        self.strap_pitch
    }

    /// Margin kept clear at both ends of every edge.
    #[inline]
    pub fn edge_offset(&self) -> Decimal {
        self.min_pin_pitch * Decimal::from(EDGE_OFFSET_TRACKS)
    }

    /// Signal pins move down to metal 3 when flipped.
    pub fn pin_layer(&self) -> Layer {
        if self.flip_pins {
            Layer::Metal(FLIPPED_PIN_METAL)
        } else {
            Layer::Metal(PIN_METAL)
        }
    }

    #[inline]
    pub fn strap_layer(&self) -> Layer {
        Layer::Metal(STRAP_METAL)
    }

    /// Every metal layer the macro blocks, bottom to top.
    pub fn metal_layers(&self) -> impl Iterator<Item = Layer> {
        (1..=STRAP_METAL).map(Layer::Metal)
    }

    pub fn layer_name(&self, layer: Layer) -> String {
        match layer {
            Layer::Metal(idx) => format!("{}{}", self.metal_prefix, idx),
            Layer::Overlap => "OVERLAP".to_string(),
        }
    }
}
