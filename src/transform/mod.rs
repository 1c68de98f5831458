//! Rewrite of hardware-capable actors into dedicated processing modules.
//!
//! The external solver only maps actors onto processing modules. To let it consider the
//! hardware implementation of an actor, every pair of (hardware actor `a`, logic module `L`)
//! gets a tailored single-core processing module `<L>_HW_Impl_<a>` next to `L`'s switch. Its
//! only instruction family `<L>_HW_Instructions_<a>` is also added to the software
//! requirements of `a`, so `a` is the only actor that can run on it.
//!
//! ```text
//! actor a:   SW_Instructions            -> { FloatOp: 80 }
//!            L_HW_Instructions_a        -> { L_a_clock_cycles: 10 }
//! L_HW_Impl_a: L_HW_Instructions_a      -> { L_a_clock_cycles: 1.0 per cycle }
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use itertools::Itertools;
use petgraph::graph::NodeIndex;
use tracing::info;

use crate::{
    Symbol,
    codec,
    model::{
        ModelError, SystemGraph,
        summary::write_summary,
        views::{
            CommunicationModule, HardwareImplementation, LogicProgrammableModule,
            SoftwareImplementation,
        },
    },
    platform::PlatformBuilder,
    requirements::{HW_INSTRUCTIONS, InstructionCosts, ModalInstructions},
};

pub fn instruction_family(logic: &str, actor: &str) -> String {
    format!("{}_{}_{}", logic, HW_INSTRUCTIONS, actor)
}

pub fn hardware_processor(logic: &str, actor: &str) -> String {
    format!("{}_HW_Impl_{}", logic, actor)
}

fn qualified_instruction(logic: &str, actor: &str, instruction: &str) -> String {
    format!("{}_{}_{}", logic, actor, instruction)
}

/// Whether `transform` has anything to do: the platform has programmable logic and the
/// application has at least one actor with a hardware implementation.
pub fn should_transform(platform: &SystemGraph, application: &SystemGraph) -> bool {
    platform.viewers::<LogicProgrammableModule>().next().is_some()
        && application.viewers::<HardwareImplementation>().next().is_some()
}

/// Every logic module with the first communication module it links to.
fn logic_switches(platform: &SystemGraph) -> Result<Vec<(Symbol, Symbol, u64)>, ModelError> {
    platform
        .viewers::<LogicProgrammableModule>()
        .map(|(ix, lpm)| -> Result<_, ModelError> {
            let switch = platform
                .adjacent(ix)
                .into_iter()
                .find(|&n| platform.has_view::<CommunicationModule>(n))
                .ok_or_else(|| {
                    ModelError::Topology(format!(
                        "logic module {} is not linked to any communication module",
                        platform.name(ix)
                    ))
                })?;
            Ok((
                platform.name(ix).clone(),
                platform.name(switch).clone(),
                lpm.operating_frequency_in_hertz,
            ))
        })
        .collect()
}

/// Hardware actors with their hardware instruction costs.
fn hardware_actors(application: &SystemGraph) -> Vec<(NodeIndex, Symbol, InstructionCosts)> {
    application
        .viewers::<HardwareImplementation>()
        .map(|(ix, hw)| {
            (
                ix,
                application.name(ix).clone(),
                hw.hardware_instructions().cloned().unwrap_or_default(),
            )
        })
        .collect()
}

/// Produce the rewritten `(platform, application)` pair.
///
/// Both inputs are left untouched. Fails with [`ModelError::Topology`] when a logic module is
/// not linked to a communication module, in which case nothing is produced.
pub fn transform(
    platform: &SystemGraph,
    application: &SystemGraph,
) -> Result<(SystemGraph, SystemGraph), ModelError> {
    let logic = logic_switches(platform)?;
    let actors = hardware_actors(application);

    let mut platform_out = PlatformBuilder::from_graph(platform.clone());
    let mut application_out = application.clone();

    for (actor_ix, actor, hw_costs) in &actors {
        let mut families = Vec::with_capacity(logic.len());

        for (lpm, switch, frequency) in &logic {
            let family = instruction_family(lpm, actor);

            let mut cycles_per_instruction = ModalInstructions::new();
            cycles_per_instruction.insert(
                Symbol::from(family.as_str()),
                hw_costs
                    .keys()
                    .map(|instr| (Symbol::from(qualified_instruction(lpm, actor, instr)), 1.0))
                    .collect(),
            );
            let merged: InstructionCosts = hw_costs
                .iter()
                .map(|(instr, &cycles)| {
                    (Symbol::from(qualified_instruction(lpm, actor, instr)), cycles)
                })
                .collect();

            let pe = hardware_processor(lpm, actor);
            platform_out.add_cpu(&pe, 1, *frequency, &cycles_per_instruction)?;
            platform_out.connect_two_way(&pe, switch)?;

            families.push((Symbol::from(family), merged));
        }

        application_out
            .enforce::<SoftwareImplementation>(*actor_ix)
            .computational_requirements
            .extend(families);
    }

    info!(
        "Transformed {} actors: [{}]",
        actors.len(),
        actors.iter().map(|(_, name, _)| name).join(", ")
    );

    Ok((platform_out.into_graph(), application_out))
}

/// Command-line arguments for the FPGA transformation.
#[derive(Parser, Debug)]
pub struct FpgaTransformArgs {
    /// Platform design model
    pub platform: PathBuf,

    /// Application design model
    pub application: PathBuf,
}

/// `<dir>/<stem>_Intermediate.<ext>` next to `path`.
pub fn intermediate_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match path.extension() {
        Some(ext) => format!("{}_Intermediate.{}", stem, ext.to_string_lossy()),
        None => format!("{}_Intermediate", stem),
    };
    path.with_file_name(file_name)
}

pub fn fpga_transform_main(args: FpgaTransformArgs) -> Result<()> {
    let FpgaTransformArgs {
        platform,
        application,
    } = args;

    let platform_graph = codec::load(&platform)
        .with_context(|| format!("Failed to load platform '{}'", platform.display()))?;
    let application_graph = codec::load(&application)
        .with_context(|| format!("Failed to load application '{}'", application.display()))?;

    if !should_transform(&platform_graph, &application_graph) {
        info!("Both FPGAs and hardware actors must exist, no transformation needed");
        return Ok(());
    }

    let (platform_graph, application_graph) = transform(&platform_graph, &application_graph)?;

    let mut stdout = std::io::stdout();
    write_summary(&platform_graph, &mut stdout)?;

    for (graph, path) in [(&platform_graph, &platform), (&application_graph, &application)] {
        let out = intermediate_path(path);
        codec::save(graph, &out)?;
        info!("Wrote '{}'", out.display());
    }

    Ok(())
}
