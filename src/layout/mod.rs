//! Physical planning of the SRAM abstract: pins, supply straps and obstructions.

use arcstr::ArcStr;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::clog2;
use crate::config::ProcessRules;
use crate::error::{LayoutError, LayoutResult};

pub mod geom;
pub mod obs;
pub mod pins;
pub mod signals;
pub mod straps;

pub use geom::{Dir, Rect, Span};
pub use obs::{synthesize_obstructions, ObstructionRegion};
pub use pins::{plan_pins, PinPlan, PinSpec};
pub use signals::{PinDirection, Signal, SignalGroup, SignalWidth, SIGNAL_GROUPS};
pub use straps::{plan_straps, StrapSpec, SupplyNet};

/// A layer of the physical abstract.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Layer {
    /// A routing metal, numbered from 1.
    Metal(u8),
    /// The marker layer outlining the macro.
    Overlap,
}

/// The geometry-independent parameters of one SRAM instance,
/// plus the macro size returned by characterization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemoryShape {
    name: ArcStr,
    depth: usize,
    data_width: usize,
    addr_width: usize,
    width: Decimal,
    height: Decimal,
}

impl MemoryShape {
    pub fn new(
        name: impl Into<ArcStr>,
        depth: usize,
        data_width: usize,
        width: Decimal,
        height: Decimal,
    ) -> LayoutResult<Self> {
        let name = name.into();
        let invalid = |field, value: String| LayoutError::InvalidDimension {
            name: name.clone(),
            field,
            value,
        };
        if depth == 0 {
            return Err(invalid("depth", depth.to_string()));
        }
        if data_width == 0 {
            return Err(invalid("data width", data_width.to_string()));
        }
        if width <= Decimal::ZERO {
            return Err(invalid("macro width", width.to_string()));
        }
        if height <= Decimal::ZERO {
            return Err(invalid("macro height", height.to_string()));
        }

        Ok(Self {
            addr_width: clog2(depth),
            name,
            depth,
            data_width,
            width,
            height,
        })
    }

    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    pub fn data_width(&self) -> usize {
        self.data_width
    }

    #[inline]
    pub fn addr_width(&self) -> usize {
        self.addr_width
    }

    #[inline]
    pub fn width(&self) -> Decimal {
        self.width
    }

    #[inline]
    pub fn height(&self) -> Decimal {
        self.height
    }

    #[inline]
    pub fn area(&self) -> Decimal {
        self.width * self.height
    }

    pub fn bbox(&self) -> Rect {
        Rect::new(Decimal::ZERO, Decimal::ZERO, self.width, self.height)
    }

    /// The extent of the macro along tracks advancing in `dir`.
    pub fn extent(&self, dir: Dir) -> Span {
        self.bbox().span(dir)
    }
}

/// Everything placed in the physical abstract of one macro.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalView {
    pub pins: PinPlan,
    pub straps: Vec<StrapSpec>,
    pub obstructions: Vec<ObstructionRegion>,
}

/// Runs the full physical planning pipeline.
pub fn plan_physical(rules: &ProcessRules, shape: &MemoryShape) -> LayoutResult<PhysicalView> {
    let pins = plan_pins(rules, shape)?;
    let straps = plan_straps(rules, shape)?;
    let obstructions = synthesize_obstructions(rules, shape, &pins.pins, &straps);
    Ok(PhysicalView {
        pins,
        straps,
        obstructions,
    })
}
