//! Liberty timing view.

use std::path::Path;

use arcstr::ArcStr;
use derive_builder::Builder;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tera::Context;

use crate::cacti::Characterization;
use crate::layout::signals::signals;
use crate::layout::MemoryShape;
use crate::{Result, TEMPLATES};

/// Setup time assumed for every input, in nanoseconds.
pub const T_SETUP_NS: f64 = 0.050;
/// Hold time assumed for every input, in nanoseconds.
pub const T_HOLD_NS: f64 = 0.050;
/// Capacitance of every input pin, in picofarads.
pub const CAP_INPUT_PF: f64 = 0.005;

#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(derive(Debug))]
pub struct LibParams {
    #[builder(setter(into))]
    pub name: ArcStr,
    pub depth: usize,
    pub data_width: usize,
    pub addr_width: usize,
    /// Supply voltage.
    pub voltage: f64,
    /// Area in square micrometers.
    pub area_um2: Decimal,
    pub leakage_mw: f64,
    pub access_time_ns: f64,
    pub cycle_time_ns: f64,
    /// Internal energy per input transition.
    pub pin_power_mw: f64,
    #[builder(default = "T_SETUP_NS")]
    pub t_setup_ns: f64,
    #[builder(default = "T_HOLD_NS")]
    pub t_hold_ns: f64,
    #[builder(default = "CAP_INPUT_PF")]
    pub cap_input_pf: f64,
    #[builder(default = "0.009")]
    pub min_slew_ns: f64,
    #[builder(default = "0.227")]
    pub max_transition_ns: f64,
    #[builder(default = "0.005")]
    pub min_load_pf: f64,
    #[builder(default = "0.5")]
    pub max_load_pf: f64,
}

impl LibParams {
    #[inline]
    pub fn builder() -> LibParamsBuilder {
        LibParamsBuilder::default()
    }

    /// Timing parameters of a characterized memory.
    pub fn new(
        shape: &MemoryShape,
        characterization: &Characterization,
        voltage: f64,
    ) -> Result<Self> {
        let params = Self::builder()
            .name(shape.name().clone())
            .depth(shape.depth())
            .data_width(shape.data_width())
            .addr_width(shape.addr_width())
            .voltage(voltage)
            .area_um2(shape.area())
            .leakage_mw(characterization.standby_leakage_per_bank_mw)
            .access_time_ns(characterization.access_time_ns)
            .cycle_time_ns(characterization.cycle_time_ns)
            .pin_power_mw(characterization.dyn_write_energy_nj)
            .build()?;
        Ok(params)
    }
}

/// A pin or bus of the timing view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct LibPin {
    name: &'static str,
    direction: &'static str,
    width: usize,
    bus: bool,
    clock: bool,
}

fn lib_pins(params: &LibParams) -> Vec<LibPin> {
    signals()
        .map(|signal| LibPin {
            name: signal.name,
            direction: signal.direction.as_str(),
            width: signal.bits_for(params.data_width, params.addr_width),
            bus: signal.is_bus(),
            clock: signal.name == "clk",
        })
        .filter(|pin| pin.width > 0)
        .collect()
}

pub fn generate_lib(params: &LibParams) -> Result<String> {
    let mut ctx = Context::from_serialize(params)?;
    ctx.insert("pins", &lib_pins(params));
    Ok(TEMPLATES.render("sram.lib", &ctx)?)
}

pub fn save_lib(path: impl AsRef<Path>, params: &LibParams) -> Result<()> {
    let lib = generate_lib(params)?;

    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, lib)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn test_params(depth: usize) -> LibParams {
        let shape = MemoryShape::new("fakeram_64x8", depth, 8, dec!(40), dec!(50)).unwrap();
        let characterization = Characterization {
            access_time_ns: 0.293,
            cycle_time_ns: 0.214,
            dyn_write_energy_nj: 0.0048,
            standby_leakage_per_bank_mw: 0.722,
            ..Default::default()
        };
        LibParams::new(&shape, &characterization, 1.1).unwrap()
    }

    #[test]
    fn test_lib_params() {
        let params = test_params(64);
        assert_eq!(params.addr_width, 6);
        assert_eq!(params.area_um2, dec!(2000));
        assert_eq!(params.t_setup_ns, T_SETUP_NS);
        assert_eq!(params.cap_input_pf, CAP_INPUT_PF);
        assert!(LibParams::builder().name("incomplete").build().is_err());
    }

    #[test]
    fn test_generate_lib() -> Result<()> {
        let lib = generate_lib(&test_params(64))?;
        assert!(lib.starts_with("library (fakeram_64x8) {"));
        assert!(lib.contains("cell (fakeram_64x8) {"));
        assert!(lib.contains("area : 2000"));
        assert!(lib.contains("address_width : 6;"));
        assert!(lib.contains("word_width : 8;"));
        assert!(lib.contains("cell_leakage_power : 0.722;"));
        assert!(lib.contains("min_period : 0.214;"));
        assert!(lib.contains("\"0.293, 0.293\""));
        assert!(lib.contains("\"0.05, 0.05\""));
        assert!(lib.contains("capacitance : 0.005;"));
        for bus in ["rd_out", "wd_in", "w_mask_in", "addr_in"] {
            assert!(lib.contains(&format!("bus ({bus}) {{")), "missing bus {bus}");
        }
        for pin in ["we_in", "ce_in", "clk"] {
            assert!(lib.contains(&format!("pin ({pin}) {{")), "missing pin {pin}");
        }
        assert!(lib.contains("bit_from : 5;"));
        assert!(lib.contains("bit_from : 7;"));
        assert_eq!(lib.matches("timing_type : setup_rising;").count(), 5);
        Ok(())
    }

    #[test]
    fn test_generate_lib_single_word() -> Result<()> {
        let lib = generate_lib(&test_params(1))?;
        assert!(!lib.contains("addr_in"));
        assert!(lib.contains("address_width : 0;"));
        Ok(())
    }
}
