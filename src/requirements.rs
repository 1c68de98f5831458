//! Resource requirement maps shared by software and hardware implementations.
//!
//! Actors describe what they need as nested maps: an instruction family (for example
//! [`SW_INSTRUCTIONS`]) maps instruction names to counts. Processing modules describe what they
//! offer with the same shape, keyed by instruction mode, holding instructions per cycle. The
//! external solver matches the two by family/mode name and instruction name.

use std::collections::BTreeMap;

use crate::Symbol;

/// Instruction name → count (or cycles) for a single instruction family.
pub type InstructionCosts = BTreeMap<Symbol, u64>;

/// Instruction family → instruction costs.
pub type ComputationalRequirements = BTreeMap<Symbol, InstructionCosts>;

/// Instruction mode → instruction name → value.
///
/// Builders take cycles per instruction; processing modules store instructions per cycle.
pub type ModalInstructions = BTreeMap<Symbol, BTreeMap<Symbol, f64>>;

pub const SW_INSTRUCTIONS: &str = "SW_Instructions";
pub const HW_INSTRUCTIONS: &str = "HW_Instructions";
pub const CLOCK_CYCLES: &str = "clock_cycles";

pub const FLOP: &str = "FloatOp";
pub const NON_FLOP: &str = "NonFloatOp";
pub const INT_OP: &str = "IntegerOp";

/// Key of the code size entry of a software implementation.
pub const IMPL_SIZE: &str = "impl";

/// Unit multipliers used by the catalogs.
pub mod units {
    pub const MHZ: u64 = 1_000_000;
    pub const GHZ: u64 = 1_000_000_000;

    pub const KB: u64 = 1_000;
    pub const MB: u64 = 1_000_000;
    pub const GB: u64 = 1_000_000_000;
    pub const BYTES_TO_BITS: u64 = 8;

    pub const CLOCK_CYCLE: u64 = 1;
    pub const CLB: u64 = 1;
}

/// Build an instruction cost map from `(instruction, count)` pairs.
pub fn instruction_costs<'a>(
    entries: impl IntoIterator<Item = (&'a str, u64)>,
) -> InstructionCosts {
    entries
        .into_iter()
        .map(|(name, count)| (Symbol::from(name), count))
        .collect()
}

/// Build a single-mode instruction table from `(instruction, cycles per instruction)` pairs.
pub fn modal_instructions<'a>(
    mode: &str,
    entries: impl IntoIterator<Item = (&'a str, f64)>,
) -> ModalInstructions {
    let mut table = ModalInstructions::new();
    table.insert(
        Symbol::from(mode),
        entries
            .into_iter()
            .map(|(name, cycles)| (Symbol::from(name), cycles))
            .collect(),
    );
    table
}
