//! Routing obstructions covering everything that is not a pin or a strap.

use itertools::Itertools;
use serde::Serialize;

use super::geom::gaps;
use super::pins::PIN_DIR;
use super::straps::{strap_dir, strap_span};
use super::{Dir, Layer, MemoryShape, PinSpec, Rect, Span, StrapSpec};
use crate::config::ProcessRules;

/// Blocked rectangles on a single layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObstructionRegion {
    pub layer: Layer,
    pub rects: Vec<Rect>,
}

/// A band of the macro holding a row of pins or straps.
///
/// The band covers `across` and runs the full length of the macro in `dir`.
/// `shapes` are the extents of its pins or straps in `dir`, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Lane {
    layer: Layer,
    dir: Dir,
    across: Span,
    shapes: Vec<Span>,
}

impl Lane {
    /// The parts of the lane between its shapes.
    fn obstructions(&self, shape: &MemoryShape) -> impl Iterator<Item = Rect> + '_ {
        gaps(shape.extent(self.dir), self.shapes.iter().copied())
            .into_iter()
            .map(|along| Rect::from_dir_spans(self.dir, along, self.across))
    }
}

fn lanes(
    rules: &ProcessRules,
    shape: &MemoryShape,
    pins: &[PinSpec],
    straps: &[StrapSpec],
) -> Vec<Lane> {
    let mut lanes = Vec::with_capacity(2);
    if !straps.is_empty() {
        let dir = strap_dir(rules);
        lanes.push(Lane {
            layer: rules.strap_layer(),
            dir,
            across: strap_span(rules, shape),
            shapes: straps.iter().map(|s| s.rect.span(dir)).collect(),
        });
    }
    if !pins.is_empty() {
        lanes.push(Lane {
            layer: rules.pin_layer(),
            dir: PIN_DIR,
            across: Span::new(shape.bbox().x0, shape.bbox().x0 + rules.pin_height()),
            shapes: pins.iter().map(|p| p.span()).collect(),
        });
    }
    lanes
}

/// Blocks every metal layer of the macro except the pins and straps.
///
/// Returns one region per metal layer, bottom to top, followed by an
/// `OVERLAP` region outlining the macro. On each metal layer, the pins,
/// straps and obstructions together cover the macro exactly once.
pub fn synthesize_obstructions(
    rules: &ProcessRules,
    shape: &MemoryShape,
    pins: &[PinSpec],
    straps: &[StrapSpec],
) -> Vec<ObstructionRegion> {
    let lanes = lanes(rules, shape, pins, straps);
    let bbox = shape.bbox();

    let mut regions = rules
        .metal_layers()
        .map(|layer| {
            let lanes = lanes.iter().filter(|l| l.layer == layer).collect::<Vec<_>>();
            let dir = lanes.first().map(|l| l.dir).unwrap_or(Dir::Vert);
            debug_assert!(lanes.iter().all(|l| l.dir == dir));

            let occupied = lanes.iter().map(|l| l.across).sorted_by_key(|s| s.start());

            let mut rects = gaps(shape.extent(dir.other()), occupied)
                .into_iter()
                .map(|across| Rect::from_dir_spans(dir, shape.extent(dir), across))
                .collect::<Vec<_>>();
            for lane in lanes.iter() {
                rects.extend(lane.obstructions(shape));
            }
            rects.retain(|r| !r.is_empty());

            log::debug!(
                "{}: {} obstructions on {}",
                shape.name(),
                rects.len(),
                rules.layer_name(layer)
            );
            ObstructionRegion { layer, rects }
        })
        .collect::<Vec<_>>();

    regions.push(ObstructionRegion {
        layer: Layer::Overlap,
        rects: vec![bbox],
    });
    regions
}
