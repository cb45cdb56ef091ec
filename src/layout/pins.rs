//! Signal pin placement along the left edge of the macro.

use arcstr::ArcStr;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use super::signals::{number_of_pins, PinDirection, SIGNAL_GROUPS};
use super::{Dir, Layer, MemoryShape, Rect, Span};
use crate::config::ProcessRules;
use crate::error::{LayoutError, LayoutResult};

/// Tracks advance up the pin edge.
pub const PIN_DIR: Dir = Dir::Vert;

/// Number of ways the spare tracks are split between signal groups.
const GROUP_GAPS: usize = 4;

/// A single placed signal pin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PinSpec {
    pub name: ArcStr,
    /// Bit index within a bus; `None` for scalar signals.
    pub bus_index: Option<usize>,
    pub direction: PinDirection,
    pub layer: Layer,
    pub rect: Rect,
}

impl PinSpec {
    /// The extent of the pin along the pin edge.
    #[inline]
    pub fn span(&self) -> Span {
        self.rect.span(PIN_DIR)
    }
}

/// The result of pin planning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PinPlan {
    pub number_of_pins: usize,
    pub available_tracks: usize,
    pub track_multiplier: usize,
    pub pin_pitch: Decimal,
    pub group_pitch: Decimal,
    /// Pins from the bottom of the edge to the top.
    pub pins: Vec<PinSpec>,
}

/// Routing tracks usable for pins on an edge of length `extent`.
pub fn available_tracks(rules: &ProcessRules, extent: Decimal) -> usize {
    let usable = extent - Decimal::TWO * rules.edge_offset();
    if usable <= Decimal::ZERO {
        return 0;
    }
    (usable / rules.min_pin_pitch())
        .floor()
        .to_usize()
        .unwrap_or(0)
}

/// Places every signal pin of `shape` on the pin edge.
///
/// Pins within a group sit one `pin_pitch` apart. Tracks that do not fit a
/// whole multiple of the pin count are spread between the groups.
pub fn plan_pins(rules: &ProcessRules, shape: &MemoryShape) -> LayoutResult<PinPlan> {
    if shape.width() < rules.pin_height() {
        return Err(LayoutError::InvalidDimension {
            name: shape.name().clone(),
            field: "macro width",
            value: format!(
                "{} is narrower than the pin height {}",
                shape.width(),
                rules.pin_height()
            ),
        });
    }

    let number_of_pins = number_of_pins(shape);
    let available_tracks = available_tracks(rules, shape.height());

    if available_tracks < number_of_pins {
        return Err(LayoutError::InsufficientTracks {
            name: shape.name().clone(),
            pins: number_of_pins,
            tracks: available_tracks,
        });
    }

    let track_multiplier = available_tracks / number_of_pins;
    let spare_tracks = available_tracks - number_of_pins * track_multiplier;
    let pin_pitch = rules.min_pin_pitch() * Decimal::from(track_multiplier);
    let group_gap = rules.min_pin_pitch() * Decimal::from(spare_tracks / GROUP_GAPS);
    let group_pitch = pin_pitch + group_gap;

    log::info!(
        "{}: {} pins on {} tracks (multiplier {}, pin pitch {} um, group pitch {} um)",
        shape.name(),
        number_of_pins,
        available_tracks,
        track_multiplier,
        pin_pitch,
        group_pitch,
    );

    let layer = rules.pin_layer();
    let column = Span::new(Decimal::ZERO, rules.pin_height());
    let mut center = rules.edge_offset();
    let mut pins = Vec::with_capacity(number_of_pins);

    // Every group after the first is preceded by a gap, even one with no pins.
    for (i, group) in SIGNAL_GROUPS.iter().enumerate() {
        if i > 0 {
            center += group_gap;
        }
        log::debug!("{}: {} group starts at y = {}", shape.name(), group.name, center);
        for signal in group.signals {
            for (bit, name) in signal.pin_names(shape).into_iter().enumerate() {
                let track = Span::from_center_width(center, rules.min_pin_width());
                pins.push(PinSpec {
                    name: name.into(),
                    bus_index: signal.is_bus().then_some(bit),
                    direction: signal.direction,
                    layer,
                    rect: Rect::from_dir_spans(PIN_DIR, track, column),
                });
                center += pin_pitch;
            }
        }
    }

    debug_assert_eq!(pins.len(), number_of_pins);

    Ok(PinPlan {
        number_of_pins,
        available_tracks,
        track_multiplier,
        pin_pitch,
        group_pitch,
        pins,
    })
}
