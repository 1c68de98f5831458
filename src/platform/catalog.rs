//! Fixed platforms known to the `build` command.

use std::fmt;

use clap::ValueEnum;
use itertools::Itertools;

use super::{PlatformBuilder, SwitchConfig};
use crate::{
    model::{ModelError, SystemGraph},
    requirements::{
        FLOP, INT_OP, ModalInstructions, NON_FLOP, modal_instructions,
        units::{BYTES_TO_BITS, CLB, GB, GHZ, KB, MB, MHZ},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlatformKind {
    /// Multi-core processing system with on-chip switch, DDR and programmable logic
    Mpsoc,
    /// Dual-core ARM with an AXI interconnect and programmable logic
    Zynq,
    /// Two cores sharing one memory
    Mm,
}

impl PlatformKind {
    pub fn build(self) -> Result<SystemGraph, ModelError> {
        match self {
            PlatformKind::Mpsoc => mpsoc(),
            PlatformKind::Zynq => zynq(),
            PlatformKind::Mm => mm(),
        }
    }
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlatformKind::Mpsoc => "mpsoc",
            PlatformKind::Zynq => "zynq",
            PlatformKind::Mm => "mm",
        };
        f.write_str(name)
    }
}

const ECONOMY: &str = "economy";

fn application_cores(flop_cycles: f64) -> ModalInstructions {
    modal_instructions(
        ECONOMY,
        [(FLOP, flop_cycles), (INT_OP, 1.0), (NON_FLOP, 1.0)],
    )
}

/// Multi-processor system on chip.
///
/// A quad-core application cluster (APU) and a dual-core real-time cluster (RPU) share the
/// on-chip switch with the DDR and the programmable logic. Memory traffic of the cores and
/// the fabric goes through the switch; the block RAM of the fabric is reachable from the
/// cores as well.
pub fn mpsoc() -> Result<SystemGraph, ModelError> {
    const SWITCH: &str = "OCM_SWITCH";
    const DDR: &str = "DDR";
    const FPGA: &str = "FPGA";

    let mut p = PlatformBuilder::new("MPSoC");

    let apu = p.add_cpu("APU", 4, 3 * GHZ / 2, &application_cores(2.0))?;
    let rpu = p.add_cpu("RPU", 2, 600 * MHZ, &application_cores(4.0))?;
    p.add_router(SWITCH, 600 * MHZ)?;
    p.add_memory(DDR, 600 * MHZ, 4 * GB * BYTES_TO_BITS)?;
    p.add_fpga(FPGA, 600_000 * CLB, 4 * MB * BYTES_TO_BITS, 64, 300 * MHZ)?;
    let bram_switch = format!("{}_BRAM_SWITCH", FPGA);

    p.connect_two_way("APU", SWITCH)?;
    p.connect_two_way("RPU", SWITCH)?;
    p.connect_two_way(SWITCH, DDR)?;
    p.connect_two_way(FPGA, SWITCH)?;
    p.connect_two_way(&bram_switch, SWITCH)?;

    let cores = apu
        .into_iter()
        .chain(rpu)
        .map(|ix| p.graph().name(ix).to_string())
        .collect_vec();
    let core_names = cores.iter().map(String::as_str).collect_vec();

    let mut routes: Vec<(&str, Vec<&str>)> = core_names
        .iter()
        .map(|&core| (core, vec![DDR, FPGA, bram_switch.as_str()]))
        .collect();
    routes.push((DDR, core_names.iter().copied().chain([FPGA]).collect()));
    routes.push((FPGA, core_names.iter().copied().chain([DDR]).collect()));
    routes.push((bram_switch.as_str(), core_names.clone()));
    p.add_internal_switch_routes(SWITCH, routes)?;

    Ok(p.into_graph())
}

/// Zynq-7000 style board: dual ARM cores, DDR and the programmable logic behind one AXI
/// interconnect.
pub fn zynq() -> Result<SystemGraph, ModelError> {
    let mut p = PlatformBuilder::new("Zynq");

    p.add_cpu("ARM", 2, 667 * MHZ, &application_cores(2.0))?;
    p.add_switch(
        "AXI",
        100 * MHZ,
        SwitchConfig {
            flit_size_in_bits: 32,
            ..SwitchConfig::default()
        },
    )?;
    p.add_memory("DDR", 533 * MHZ, GB * BYTES_TO_BITS)?;
    p.add_fpga("PL", 53_200 * CLB, 560 * KB * BYTES_TO_BITS, 32, 200 * MHZ)?;

    p.connect_two_way("ARM", "AXI")?;
    p.connect_two_way("AXI", "DDR")?;
    p.connect_two_way("PL", "AXI")?;
    p.connect_two_way("PL_BRAM_SWITCH", "AXI")?;

    Ok(p.into_graph())
}

/// Smallest useful platform: two cores, one bus and one memory.
pub fn mm() -> Result<SystemGraph, ModelError> {
    let mut p = PlatformBuilder::new("MM");

    p.add_cpu("CPU", 2, GHZ, &application_cores(1.0))?;
    p.add_router("BUS", 500 * MHZ)?;
    p.add_memory("MEM", 500 * MHZ, 512 * MB * BYTES_TO_BITS)?;

    p.connect_two_way("CPU", "BUS")?;
    p.connect_two_way("BUS", "MEM")?;

    Ok(p.into_graph())
}
