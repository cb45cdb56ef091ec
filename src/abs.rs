//! LEF abstract export.

use std::path::Path;

use anyhow::{anyhow, Context};
use lef21::{
    LefDbuPerMicron, LefDecimal, LefForeign, LefGeometry, LefLayerGeometries, LefLibrary,
    LefLibraryBuilder, LefMacroBuilder, LefMacroClass, LefPin, LefPinDirection, LefPinShape,
    LefPinUse, LefPoint, LefPort, LefShape, LefSymmetry, LefUnits,
};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::config::ProcessRules;
use crate::layout::{MemoryShape, PhysicalView, PinDirection, Rect, SupplyNet};
use crate::Result;

pub const DB_PER_MICRON: u32 = 1000;

/// Builds the LEF library holding the abstract of a single macro.
pub fn generate_lef_library(
    rules: &ProcessRules,
    shape: &MemoryShape,
    view: &PhysicalView,
) -> Result<LefLibrary> {
    let mut pins = view
        .pins
        .pins
        .iter()
        .map(|pin| {
            export_pin(ExportPin {
                layer_name: rules.layer_name(pin.layer),
                pin_name: pin.name.to_string(),
                rects: &[pin.rect],
                direction: match pin.direction {
                    PinDirection::Input => LefPinDirection::Input,
                    PinDirection::Output => LefPinDirection::Output { tristate: false },
                },
                use_: LefPinUse::Signal,
                shape: Some(LefPinShape::Abutment),
            })
        })
        .collect::<Vec<_>>();

    for net in SupplyNet::ORDER {
        let rects = view
            .straps
            .iter()
            .filter(|s| s.net == net)
            .map(|s| s.rect)
            .collect::<Vec<_>>();
        let layer = view
            .straps
            .first()
            .map(|s| s.layer)
            .unwrap_or_else(|| rules.strap_layer());
        pins.push(export_pin(ExportPin {
            layer_name: rules.layer_name(layer),
            pin_name: net.name().to_string(),
            rects: &rects,
            direction: LefPinDirection::Inout,
            use_: match net {
                SupplyNet::Vdd => LefPinUse::Power,
                SupplyNet::Vss => LefPinUse::Ground,
            },
            shape: None,
        }));
    }

    let obs = view
        .obstructions
        .iter()
        .map(|region| LefLayerGeometries {
            layer_name: rules.layer_name(region.layer),
            geometries: region.rects.iter().copied().map(export_rect).collect(),
            ..Default::default()
        })
        .collect::<Vec<_>>();

    // macro is a reserved keyword in Rust
    let makro = LefMacroBuilder::default()
        .name(shape.name().to_string())
        .class(LefMacroClass::Block { tp: None })
        .foreign(LefForeign {
            cell_name: shape.name().to_string(),
            pt: Some(LefPoint::new(export_decimal(Decimal::ZERO), export_decimal(Decimal::ZERO))),
            orient: None,
        })
        .size((export_decimal(shape.width()), export_decimal(shape.height())))
        .symmetry([LefSymmetry::X, LefSymmetry::Y, LefSymmetry::R90])
        .pins(pins)
        .obs(obs)
        .build()?;

    let units = LefUnits {
        database_microns: Some(LefDbuPerMicron(DB_PER_MICRON)),
        ..Default::default()
    };

    let lib = LefLibraryBuilder::default()
        .version(dec!(5.7))
        .macros([makro])
        .bus_bit_chars(('[', ']'))
        .units(units)
        .sites([])
        .build()?;
    Ok(lib)
}

pub fn generate_lef(
    rules: &ProcessRules,
    shape: &MemoryShape,
    view: &PhysicalView,
) -> Result<String> {
    let lib = generate_lef_library(rules, shape, view)?;
    lib.to_string()
        .map_err(|e| anyhow!("failed to write LEF for {}: {e}", shape.name()))
}

pub fn save_lef(
    path: impl AsRef<Path>,
    rules: &ProcessRules,
    shape: &MemoryShape,
    view: &PhysicalView,
) -> Result<()> {
    let lef = generate_lef(rules, shape, view)?;

    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, lef).with_context(|| format!("failed to write {path:?}"))?;

    Ok(())
}

fn export_rect(r: Rect) -> LefGeometry {
    LefGeometry::Shape(LefShape::Rect(
        None,
        LefPoint::new(export_decimal(r.x0), export_decimal(r.y0)),
        LefPoint::new(export_decimal(r.x1), export_decimal(r.y1)),
    ))
}

/// Rounds to the nearest nanometer, always printing three decimals.
fn export_decimal(x: Decimal) -> LefDecimal {
    let mut x = x.round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero);
    x.rescale(3);
    x
}

struct ExportPin<'a> {
    layer_name: String,
    pin_name: String,
    rects: &'a [Rect],
    direction: LefPinDirection,
    use_: LefPinUse,
    shape: Option<LefPinShape>,
}

fn export_pin(pin: ExportPin<'_>) -> LefPin {
    let ExportPin {
        layer_name,
        pin_name,
        rects,
        direction,
        use_,
        shape,
    } = pin;

    let port = LefPort {
        class: None,
        layers: vec![LefLayerGeometries {
            layer_name,
            geometries: rects.iter().copied().map(export_rect).collect(),
            ..Default::default()
        }],
    };

    LefPin {
        name: pin_name,
        ports: vec![port],
        direction: Some(direction),
        use_: Some(use_),
        shape,
        ..Default::default()
    }
}
