use std::path::Path;

use crate::layout::MemoryShape;
use crate::{Result, TEMPLATES};

use serde::{Deserialize, Serialize};
use tera::Context;

#[derive(Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Sram1RwParams {
    pub module_name: String,
    pub num_words: usize,
    pub data_width: usize,
    pub addr_width: usize,
    /// Expression selecting the accessed word.
    pub addr_index: String,
}

impl Sram1RwParams {
    pub fn new(shape: &MemoryShape) -> Self {
        let addr_index = if shape.addr_width() > 0 {
            "addr_in".to_string()
        } else {
            "0".to_string()
        };
        Self {
            module_name: shape.name().to_string(),
            num_words: shape.depth(),
            data_width: shape.data_width(),
            addr_width: shape.addr_width(),
            addr_index,
        }
    }
}

pub fn generate_1rw_verilog(shape: &MemoryShape) -> Result<String> {
    let template_params = Sram1RwParams::new(shape);
    Ok(TEMPLATES.render("sram_1rw.v", &Context::from_serialize(template_params)?)?)
}

pub fn save_1rw_verilog(path: impl AsRef<Path>, shape: &MemoryShape) -> Result<()> {
    let verilog = generate_1rw_verilog(shape)?;

    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, verilog)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::paths::out_verilog;

    #[test]
    fn test_generate_1rw_verilog() -> Result<()> {
        let shape = MemoryShape::new("fakeram45_64x32", 64, 32, dec!(10), dec!(10))?;
        let verilog = generate_1rw_verilog(&shape)?;
        assert!(verilog.starts_with("module fakeram45_64x32\n(\n   rd_out,\n   addr_in,\n"));
        assert!(verilog.contains("parameter BITS = 32;"));
        assert!(verilog.contains("parameter WORD_DEPTH = 64;"));
        assert!(verilog.contains("parameter ADDR_WIDTH = 6;"));
        assert!(verilog.contains(
            "mem[addr_in] <= (wd_in & w_mask_in) | (mem[addr_in] & ~w_mask_in);"
        ));
        assert!(verilog.contains("(^addr_in === 1'bx)"));
        assert!(verilog.contains("in fakeram45_64x32\", we_in, addr_in);"));
        assert!(verilog.contains("rd_out <= 'x;"));
        assert!(verilog.trim_end().ends_with("endmodule"));
        Ok(())
    }

    #[test]
    fn test_single_word_verilog() -> Result<()> {
        let shape = MemoryShape::new("fakeram_1x4", 1, 4, dec!(10), dec!(10))?;
        let verilog = generate_1rw_verilog(&shape)?;
        assert!(!verilog.contains("addr_in"));
        assert!(verilog.contains("rd_out <= mem[0];"));
        Ok(())
    }

    #[test]
    fn test_save_1rw_verilog() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let shape = MemoryShape::new("fakeram_16x8", 16, 8, dec!(10), dec!(10))?;
        let path = out_verilog(dir.path().join("fakeram_16x8"), shape.name());
        save_1rw_verilog(&path, &shape)?;
        assert_eq!(std::fs::read_to_string(&path)?, generate_1rw_verilog(&shape)?);
        Ok(())
    }
}
