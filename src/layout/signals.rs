//! The signal interface shared by every view of the macro.

use serde::{Deserialize, Serialize};

use super::MemoryShape;
use crate::bus_bit;
use PinDirection::*;
use SignalWidth::*;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinDirection {
    Input,
    Output,
}

impl PinDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Input => "input",
            Output => "output",
        }
    }
}

/// How many bits a signal carries for a given memory.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalWidth {
    /// One bit per data bit.
    Data,
    /// One bit per address bit.
    Address,
    /// A single wire.
    Scalar,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Signal {
    pub name: &'static str,
    pub width: SignalWidth,
    pub direction: PinDirection,
}

impl Signal {
    const fn new(name: &'static str, width: SignalWidth, direction: PinDirection) -> Self {
        Self {
            name,
            width,
            direction,
        }
    }

    pub fn bits(&self, shape: &MemoryShape) -> usize {
        self.bits_for(shape.data_width(), shape.addr_width())
    }

    pub fn bits_for(&self, data_width: usize, addr_width: usize) -> usize {
        match self.width {
            Data => data_width,
            Address => addr_width,
            Scalar => 1,
        }
    }

    #[inline]
    pub fn is_bus(&self) -> bool {
        self.width != Scalar
    }

    /// Names of the individual pins of this signal, least significant bit first.
    pub fn pin_names(&self, shape: &MemoryShape) -> Vec<String> {
        if self.is_bus() {
            (0..self.bits(shape))
                .map(|i| bus_bit(self.name, i))
                .collect()
        } else {
            vec![self.name.to_string()]
        }
    }
}

/// Signals placed together on the pin edge.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SignalGroup {
    pub name: &'static str,
    pub signals: &'static [Signal],
}

impl SignalGroup {
    pub fn bits(&self, shape: &MemoryShape) -> usize {
        self.signals.iter().map(|s| s.bits(shape)).sum()
    }
}

/// Signal groups in pin order, from the bottom of the pin edge up.
pub const SIGNAL_GROUPS: [SignalGroup; 5] = [
    SignalGroup {
        name: "write mask",
        signals: &[Signal::new("w_mask_in", Data, Input)],
    },
    SignalGroup {
        name: "read data",
        signals: &[Signal::new("rd_out", Data, Output)],
    },
    SignalGroup {
        name: "write data",
        signals: &[Signal::new("wd_in", Data, Input)],
    },
    SignalGroup {
        name: "address",
        signals: &[Signal::new("addr_in", Address, Input)],
    },
    SignalGroup {
        name: "control",
        signals: &[
            Signal::new("we_in", Scalar, Input),
            Signal::new("ce_in", Scalar, Input),
            Signal::new("clk", Scalar, Input),
        ],
    },
];

/// Every signal of the macro, in pin order.
pub fn signals() -> impl Iterator<Item = &'static Signal> {
    SIGNAL_GROUPS.iter().flat_map(|g| g.signals.iter())
}

/// Total number of signal pins of the macro.
pub fn number_of_pins(shape: &MemoryShape) -> usize {
    SIGNAL_GROUPS.iter().map(|g| g.bits(shape)).sum()
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_number_of_pins() {
        let shape = MemoryShape::new("m", 64, 8, dec!(10), dec!(10)).unwrap();
        assert_eq!(number_of_pins(&shape), 3 * 8 + 6 + 3);

        let single = MemoryShape::new("m", 1, 4, dec!(10), dec!(10)).unwrap();
        assert_eq!(number_of_pins(&single), 3 * 4 + 3);
    }

    #[test]
    fn test_pin_names() {
        let shape = MemoryShape::new("m", 4, 2, dec!(10), dec!(10)).unwrap();
        let names = signals()
            .flat_map(|s| s.pin_names(&shape))
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            vec![
                "w_mask_in[0]",
                "w_mask_in[1]",
                "rd_out[0]",
                "rd_out[1]",
                "wd_in[0]",
                "wd_in[1]",
                "addr_in[0]",
                "addr_in[1]",
                "we_in",
                "ce_in",
                "clk",
            ]
        );
        assert_eq!(
            signals()
                .filter(|s| s.direction == PinDirection::Output)
                .count(),
            1
        );
    }
}
