//! Platform and application models for dataflow design-space exploration.
//!
//! This library builds machine-readable descriptions of heterogeneous embedded platforms
//! (processor clusters, memories, switches, programmable logic) and of synchronous-dataflow
//! applications (actors, channels, rates, implementation costs) as one attributed graph, the
//! [`SystemGraph`]. An external design-space-exploration solver reads these graphs and writes
//! mappings and schedules back into them.
//!
//! # Main Workflows
//!
//! 1. **Build** ([`application`], [`platform`]): grow models with the builder APIs, or pick one
//!    from the catalogs.
//! 2. **Transform** ([`transform`]): give hardware-capable actors dedicated processing modules
//!    on the programmable logic.
//! 3. **Persist** ([`codec`]): write design models for the solver, or Graphviz renderings.
//! 4. **Report** ([`solution`]): summarise what the solver decided.
//!
//! # Usage Example
//!
//! ```
//! use dse_models::application::ApplicationBuilder;
//! use dse_models::platform::PlatformBuilder;
//! use dse_models::requirements::{FLOP, instruction_costs, modal_instructions};
//! use dse_models::transform::{should_transform, transform};
//!
//! let mut app = ApplicationBuilder::new("App");
//! app.add_actor("Filter").unwrap();
//! app.set_software_implementation("Filter", instruction_costs([(FLOP, 1000)]), 256).unwrap();
//! app.set_hardware_implementation("Filter", 20, 200_000_000, 0, 50).unwrap();
//!
//! let mut platform = PlatformBuilder::new("Board");
//! let cpu_costs = modal_instructions("default", [(FLOP, 1.0)]);
//! platform.add_cpu("CPU", 1, 1_000_000_000, &cpu_costs).unwrap();
//! platform.add_router("BUS", 100_000_000).unwrap();
//! platform.add_fpga("PL", 1000, 0, 0, 200_000_000).unwrap();
//! platform.connect_two_way("CPU", "BUS").unwrap();
//! platform.connect_two_way("PL", "BUS").unwrap();
//!
//! let (platform, app) = (platform.into_graph(), app.into_graph());
//! assert!(should_transform(&platform, &app));
//! let (platform, _app) = transform(&platform, &app).unwrap();
//! assert!(platform.contains("PL_HW_Impl_Filter"));
//! ```
//!
//! # Modules
//!
//! - **[`model`]**: the attributed multigraph, vertex views and [`ModelError`]
//! - **[`requirements`]**: instruction cost maps and unit constants
//! - **[`application`]**: [`ApplicationBuilder`](application::ApplicationBuilder) and the
//!   benchmark applications
//! - **[`platform`]**: [`PlatformBuilder`](platform::PlatformBuilder) and the fixed platforms
//! - **[`transform`]**: the FPGA rewrite
//! - **[`solution`]**: the solution report
//! - **[`codec`]**: design model and visualisation files

use clap::Parser;

pub mod application;
pub mod build;
pub mod codec;
pub mod model;
pub mod platform;
pub mod requirements;
pub mod solution;
pub mod transform;

#[cfg(test)]
mod test_helpers;

pub use application::{BenchApplicationArgs, build_bench_application_main};
pub use build::{BuildArgs, build_main};
pub use codec::{ToKgtArgs, to_kgt_main};
pub use model::{ModelError, Symbol, SystemGraph};
pub use solution::{ParseSolutionArgs, parse_solution_main};
pub use transform::{FpgaTransformArgs, fpga_transform_main};

/// Command-line interface of the model tools.
#[derive(Debug, Parser)]
#[clap(
    name = "dse-models",
    about = "Platform and application models for dataflow design-space exploration",
    rename_all = "snake_case"
)]
pub enum CLIArguments {
    /// Write a catalog platform and application as design models.
    Build(BuildArgs),
    /// Render a design model as a Graphviz graph.
    ToKgt(ToKgtArgs),
    /// Print the mappings, schedules and buffers of a solved design model.
    ParseSolution(ParseSolutionArgs),
    /// Generate a sequential application of a given size.
    BuildBenchApplication(BenchApplicationArgs),
    /// Give hardware actors dedicated processing modules on the programmable logic.
    FpgaTransform(FpgaTransformArgs),
}
