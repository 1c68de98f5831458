//! Construction of synchronous-dataflow application models.
//!
//! [`ApplicationBuilder`] grows an application graph one operation at a time. Every
//! operation validates its arguments and the derived names before it touches the graph, so
//! a failed call leaves the model exactly as it was.
//!
//! # Naming
//!
//! - channel between `A` and `B`: `CH_A_B`
//! - production port on `A`: `to_B`, consumption port on `B`: `from_A`
//! - boundary ports: `in_A` (input channel), `out_A` (output channel)
//!
//! Ports are append-only, so two channels between the same ordered pair of actors are
//! rejected with [`ModelError::PortCollision`]. Channel names are not escaped: once
//! `CH_A_B_C` exists for `A_B -> C`, a channel `A -> B_C` is rejected with
//! [`ModelError::DuplicateName`].
//!
//! # Example
//!
//! ```
//! use dse_models::application::ApplicationBuilder;
//! use dse_models::requirements::{FLOP, instruction_costs};
//!
//! let mut app = ApplicationBuilder::new("Pipeline");
//! app.add_actor("A").unwrap();
//! app.add_actor("B").unwrap();
//! app.set_software_implementation("A", instruction_costs([(FLOP, 100)]), 256).unwrap();
//! app.create_channel("A", "B", 2, 3).unwrap();
//!
//! let graph = app.into_graph();
//! assert!(graph.contains("CH_A_B"));
//! ```

pub mod catalog;

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;
use petgraph::graph::NodeIndex;
use tracing::{debug, info};

use crate::{
    Symbol,
    codec,
    model::{
        EdgeTrait, ModelError, SystemGraph,
        views::{GreyBox, HardwareImplementation, SdfActor, SdfChannel, SoftwareImplementation},
    },
    requirements::{
        CLOCK_CYCLES, HW_INSTRUCTIONS, IMPL_SIZE, InstructionCosts, SW_INSTRUCTIONS,
        instruction_costs,
    },
};

/// Element size given to new channels.
pub const DEFAULT_TOKEN_SIZE_IN_BITS: u64 = 8;

const SDF_EDGE: &[EdgeTrait] = &[EdgeTrait::SdfNetworkEdge, EdgeTrait::VisualConnection];

pub fn channel_name(src: &str, dst: &str) -> String {
    format!("CH_{}_{}", src, dst)
}

pub fn production_port(dst: &str) -> String {
    format!("to_{}", dst)
}

pub fn consumption_port(src: &str) -> String {
    format!("from_{}", src)
}

/// Incremental builder of an application graph.
#[derive(Debug)]
pub struct ApplicationBuilder {
    graph: SystemGraph,
    root: NodeIndex,
}

impl ApplicationBuilder {
    /// Start an empty application whose root grey box is named `name`.
    pub fn new(name: &str) -> Self {
        let mut graph = SystemGraph::new();
        let root = graph
            .new_vertex(name)
            .expect("a fresh graph has no vertices");
        graph.attach(root, GreyBox::default());
        Self { graph, root }
    }

    /// Continue building on an existing application graph.
    ///
    /// The graph must have a vertex with a [`GreyBox`] view, which becomes the root.
    pub fn from_graph(graph: SystemGraph) -> Result<Self, ModelError> {
        let root = graph
            .viewers::<GreyBox>()
            .map(|(ix, _)| ix)
            .next()
            .ok_or_else(|| {
                ModelError::Validation("no grey box root found in the application graph".into())
            })?;
        Ok(Self { graph, root })
    }

    /// Current state of the graph.
    pub fn graph(&self) -> &SystemGraph {
        &self.graph
    }

    /// Finish building and take the graph.
    pub fn into_graph(self) -> SystemGraph {
        self.graph
    }

    pub fn root_name(&self) -> &Symbol {
        self.graph.name(self.root)
    }

    fn actor(&self, name: &str) -> Result<NodeIndex, ModelError> {
        self.graph
            .index_of(name)
            .filter(|&ix| self.graph.has_view::<SdfActor>(ix))
            .ok_or_else(|| ModelError::ActorNotFound(name.into()))
    }

    fn check_port_free(&self, ix: NodeIndex, port: &str) -> Result<(), ModelError> {
        if self.graph[ix].has_port(port) {
            Err(ModelError::PortCollision {
                vertex: self.graph.name(ix).clone(),
                port: port.into(),
            })
        } else {
            Ok(())
        }
    }

    fn contain(&mut self, ix: NodeIndex) {
        let name = self.graph.name(ix).clone();
        self.graph.enforce::<GreyBox>(self.root).contained.push(name);
    }

    /// Add an actor with empty production and consumption maps.
    pub fn add_actor(&mut self, name: &str) -> Result<NodeIndex, ModelError> {
        let ix = self.graph.new_vertex(name)?;
        self.graph.attach(ix, SdfActor::default());
        self.contain(ix);
        debug!("Added actor {}", name);
        Ok(ix)
    }

    /// Attach (or overwrite) the software implementation of `actor`.
    pub fn set_software_implementation(
        &mut self,
        actor: &str,
        instructions: InstructionCosts,
        code_size_in_bits: u64,
    ) -> Result<(), ModelError> {
        let ix = self.actor(actor)?;
        if instructions.is_empty() {
            return Err(ModelError::Validation(format!(
                "software implementation of {} must require at least one instruction type",
                actor
            )));
        }
        if code_size_in_bits == 0 {
            return Err(ModelError::Validation(format!(
                "software implementation of {} must have a code size in bits",
                actor
            )));
        }

        let mut sw = SoftwareImplementation::default();
        sw.computational_requirements
            .insert(SW_INSTRUCTIONS.into(), instructions);
        sw.max_size_in_bits
            .insert(IMPL_SIZE.into(), code_size_in_bits);
        self.graph.replace_view(ix, sw);
        Ok(())
    }

    /// Attach (or overwrite) the hardware implementation of `actor`.
    pub fn set_hardware_implementation(
        &mut self,
        actor: &str,
        clock_cycles: u64,
        frequency_in_hertz: u64,
        block_ram_in_bits: u64,
        required_area: u64,
    ) -> Result<(), ModelError> {
        let ix = self.actor(actor)?;
        for (value, what) in [
            (clock_cycles, "clock cycles"),
            (frequency_in_hertz, "frequency"),
            (required_area, "logic area"),
        ] {
            if value == 0 {
                return Err(ModelError::Validation(format!(
                    "hardware implementation of {}: {} must be >= 1",
                    actor, what
                )));
            }
        }

        let mut hw = HardwareImplementation {
            frequency_in_hertz,
            block_ram_in_bits,
            required_area,
            ..Default::default()
        };
        hw.resource_requirements.insert(
            HW_INSTRUCTIONS.into(),
            instruction_costs([(CLOCK_CYCLES, clock_cycles)]),
        );
        self.graph.replace_view(ix, hw);
        Ok(())
    }

    /// Create the channel `CH_<src>_<dst>` with zero initial tokens.
    pub fn create_channel(
        &mut self,
        src: &str,
        dst: &str,
        produced: u64,
        consumed: u64,
    ) -> Result<NodeIndex, ModelError> {
        let src_ix = self.actor(src)?;
        let dst_ix = self.actor(dst)?;
        let chan_name = channel_name(src, dst);
        let prod_port = production_port(dst);
        let cons_port = consumption_port(src);

        self.check_port_free(src_ix, &prod_port)?;
        self.check_port_free(dst_ix, &cons_port)?;
        if self.graph.contains(&chan_name) {
            return Err(ModelError::DuplicateName(chan_name.into()));
        }

        let chan = self.graph.new_vertex(&chan_name)?;
        self.graph.attach(
            chan,
            SdfChannel {
                num_initial_tokens: 0,
                producer: src.into(),
                consumer: dst.into(),
                token_size_in_bits: DEFAULT_TOKEN_SIZE_IN_BITS,
            },
        );
        self.contain(chan);

        self.graph.add_port(src_ix, &prod_port)?;
        self.graph.add_port(dst_ix, &cons_port)?;
        self.graph.add_port(chan, &cons_port)?;
        self.graph.add_port(chan, &prod_port)?;

        if let Some(a) = self.graph.try_view_mut::<SdfActor>(src_ix) {
            a.production.insert(prod_port.as_str().into(), produced);
        }
        if let Some(a) = self.graph.try_view_mut::<SdfActor>(dst_ix) {
            a.consumption.insert(cons_port.as_str().into(), consumed);
        }

        self.graph
            .connect(src_ix, chan, Some(&prod_port), Some(&cons_port), SDF_EDGE)?;
        self.graph
            .connect(chan, dst_ix, Some(&prod_port), Some(&cons_port), SDF_EDGE)?;

        debug!("Created channel {} ({} -> {})", chan_name, produced, consumed);
        Ok(chan)
    }

    /// Change the element size of the channel from `src` to `dst`.
    pub fn set_channel_token_size(
        &mut self,
        src: &str,
        dst: &str,
        token_size_in_bits: u64,
    ) -> Result<(), ModelError> {
        if token_size_in_bits == 0 {
            return Err(ModelError::Validation(
                "token size must be at least one bit".into(),
            ));
        }
        let name = channel_name(src, dst);
        let chan = self
            .graph
            .index_of(&name)
            .and_then(|ix| self.graph.try_view_mut::<SdfChannel>(ix))
            .ok_or(ModelError::ComponentNotFound(name.into()))?;
        chan.token_size_in_bits = token_size_in_bits;
        Ok(())
    }

    /// Register the boundary input port `in_<actor>` consuming `consumed` tokens per firing.
    pub fn set_input_channel(&mut self, actor: &str, consumed: u64) -> Result<(), ModelError> {
        let ix = self.actor(actor)?;
        let port = format!("in_{}", actor);
        self.check_port_free(ix, &port)?;
        self.graph.add_port(ix, &port)?;
        if let Some(a) = self.graph.try_view_mut::<SdfActor>(ix) {
            a.consumption.insert(port.as_str().into(), consumed);
        }
        Ok(())
    }

    /// Register the boundary output port `out_<actor>` producing `produced` tokens per firing.
    pub fn set_output_channel(&mut self, actor: &str, produced: u64) -> Result<(), ModelError> {
        let ix = self.actor(actor)?;
        let port = format!("out_{}", actor);
        self.check_port_free(ix, &port)?;
        self.graph.add_port(ix, &port)?;
        if let Some(a) = self.graph.try_view_mut::<SdfActor>(ix) {
            a.production.insert(port.as_str().into(), produced);
        }
        Ok(())
    }
}

/// Command-line arguments for the bench application generator.
#[derive(Parser, Debug)]
pub struct BenchApplicationArgs {
    /// Number of actors in the sequential chain
    pub num_actors: usize,

    /// Number of leading actors with a hardware implementation
    pub num_hw_impls: usize,

    /// Output directory
    pub out_dir: PathBuf,
}

/// Generate a sequential bench application and write it as a design model.
pub fn build_bench_application_main(args: BenchApplicationArgs) -> Result<()> {
    let BenchApplicationArgs {
        num_actors,
        num_hw_impls,
        out_dir,
    } = args;

    let name = format!("Bench_{}_{}", num_actors, num_hw_impls);
    let graph = catalog::sequential(&name, num_actors, num_hw_impls)
        .map_err(|e| anyhow!("Failed to build bench application: {}", e))?;

    let path = out_dir.join(format!("{}.{}", name, codec::MODEL_EXT));
    codec::save(&graph, &path)?;
    info!("Bench application '{}' written to '{}'", name, path.display());

    Ok(())
}
