//! Power and ground straps.

use rust_decimal::Decimal;
use serde::Serialize;

use super::{Dir, Layer, MemoryShape, Rect, Span};
use crate::config::ProcessRules;
use crate::error::LayoutResult;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SupplyNet {
    Vdd,
    Vss,
}

impl SupplyNet {
    pub fn name(&self) -> &'static str {
        match self {
            SupplyNet::Vdd => "VDD",
            SupplyNet::Vss => "VSS",
        }
    }

    /// Nets in the order they appear on the macro, starting from the bottom or left edge.
    pub const ORDER: [SupplyNet; 2] = [SupplyNet::Vss, SupplyNet::Vdd];
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct StrapSpec {
    pub net: SupplyNet,
    pub layer: Layer,
    pub rect: Rect,
}

/// The direction in which successive straps advance.
///
/// Straps run horizontally, stacked up the macro, unless pins are flipped.
pub fn strap_dir(rules: &ProcessRules) -> Dir {
    if rules.flip_pins() {
        Dir::Horiz
    } else {
        Dir::Vert
    }
}

/// The band of the macro that straps span, perpendicular to [`strap_dir`].
pub fn strap_span(rules: &ProcessRules, shape: &MemoryShape) -> Span {
    let across = shape.extent(strap_dir(rules).other());
    Span::new(
        across.start() + rules.edge_offset(),
        across.stop() - rules.edge_offset(),
    )
}

/// Places alternating VSS and VDD straps across the macro.
///
/// Straps are walked from the edge margin for as long as they fit, so a small
/// macro may get a single strap or none at all.
pub fn plan_straps(rules: &ProcessRules, shape: &MemoryShape) -> LayoutResult<Vec<StrapSpec>> {
    let dir = strap_dir(rules);
    let along = shape.extent(dir);
    let across = shape.extent(dir.other());
    let e = rules.edge_offset();

    let mut straps = Vec::new();
    if across.length() <= Decimal::TWO * e {
        log::warn!(
            "{}: no room for supply straps across {} um",
            shape.name(),
            across.length()
        );
        return Ok(straps);
    }

    let span = strap_span(rules, shape);
    let layer = rules.strap_layer();
    let last = along.stop() - e;
    let mut center = along.start() + e;
    while center <= last {
        let net = SupplyNet::ORDER[straps.len() % SupplyNet::ORDER.len()];
        let track = Span::from_center_width(center, rules.strap_width());
        straps.push(StrapSpec {
            net,
            layer,
            rect: Rect::from_dir_spans(dir, track, span),
        });
        center += rules.strap_pitch();
    }

    log::info!(
        "{}: {} supply straps on {}",
        shape.name(),
        straps.len(),
        rules.layer_name(layer)
    );

    Ok(straps)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::config::process::tests::test_rules;
    use crate::layout::plan_pins;
    use crate::layout::tests::test_shape;

    #[test]
    fn test_horizontal_straps() {
        let rules = test_rules(false);
        let shape = test_shape(dec!(50));
        let straps = plan_straps(&rules, &shape).unwrap();

        // Centers at 2.0, 3.6, ..., 46.8.
        assert_eq!(straps.len(), 29);
        assert_eq!(straps[0].net, SupplyNet::Vss);
        assert_eq!(straps[1].net, SupplyNet::Vdd);
        assert_eq!(straps[28].net, SupplyNet::Vss);
        assert_eq!(
            straps[0].rect,
            Rect::new(dec!(2), dec!(1.8), dec!(38), dec!(2.2))
        );
        assert_eq!(
            straps[1].rect,
            Rect::new(dec!(2), dec!(3.4), dec!(38), dec!(3.8))
        );
        assert_eq!(straps[28].rect.vspan(), Span::new(dec!(46.6), dec!(47.0)));
        assert!(straps.iter().all(|s| s.layer == Layer::Metal(4)));
        assert!(straps.iter().all(|s| shape.bbox().contains(&s.rect)));
    }

    #[test]
    fn test_vertical_straps() {
        let rules = test_rules(true);
        let shape = test_shape(dec!(50));
        let straps = plan_straps(&rules, &shape).unwrap();

        // Centers at 2.0, 3.6, ..., 37.2 across the 40um width.
        assert_eq!(straps.len(), 23);
        assert_eq!(
            straps[0].rect,
            Rect::new(dec!(1.8), dec!(2), dec!(2.2), dec!(48))
        );
        assert_eq!(straps[21].net, SupplyNet::Vdd);
        assert_eq!(straps[22].rect.hspan(), Span::new(dec!(37.0), dec!(37.4)));
    }

    #[test]
    fn test_straps_clear_of_pins() {
        let rules = test_rules(false);
        let shape = test_shape(dec!(50));
        let pins = plan_pins(&rules, &shape).unwrap();
        let straps = plan_straps(&rules, &shape).unwrap();
        for strap in straps.iter() {
            for pin in pins.pins.iter() {
                assert!(!strap.rect.overlaps(&pin.rect));
            }
        }
    }

    #[test]
    fn test_strap_count_follows_space() {
        let rules = test_rules(false);
        let count = |height| plan_straps(&rules, &test_shape(height)).unwrap().len();
        // Centers at 2.0 and 3.6 need 3.6 + 2um of margin.
        assert_eq!(count(dec!(5.6)), 2);
        assert_eq!(count(dec!(5.5)), 1);
        assert_eq!(count(dec!(4)), 1);
        assert_eq!(count(dec!(3.9)), 0);

        let single = plan_straps(&rules, &test_shape(dec!(5.5))).unwrap();
        assert_eq!(single[0].net, SupplyNet::Vss);

        let sliver = MemoryShape::new("sliver", 64, 8, dec!(4.2), dec!(50)).unwrap();
        let straps = plan_straps(&rules, &sliver).unwrap();
        assert_eq!(straps.len(), 29);
        assert_eq!(straps[0].rect.hspan(), Span::new(dec!(2), dec!(2.2)));

        let narrow = MemoryShape::new("narrow", 64, 8, dec!(4), dec!(50)).unwrap();
        assert!(plan_straps(&rules, &narrow).unwrap().is_empty());
    }

    #[test]
    fn test_single_vertical_strap() {
        let rules = test_rules(true);
        let narrow = MemoryShape::new("narrow", 64, 8, dec!(5), dec!(50)).unwrap();
        let straps = plan_straps(&rules, &narrow).unwrap();
        assert_eq!(straps.len(), 1);
        assert_eq!(straps[0].net, SupplyNet::Vss);
        assert_eq!(
            straps[0].rect,
            Rect::new(dec!(1.8), dec!(2), dec!(2.2), dec!(48))
        );
    }
}
