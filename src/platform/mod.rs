//! Construction of heterogeneous platform models.
//!
//! A platform is a set of components (processor cores with their runtimes, memories,
//! switches and programmable logic) joined by physical links. [`PlatformBuilder`] creates
//! the components with their capability views and wires them together.
//!
//! # Links
//!
//! - [`PlatformBuilder::connect_one_way`] adds a single directed link with ports
//!   `to_<dst>` on the source and `from_<src>` on the destination.
//! - [`PlatformBuilder::connect_two_way`] adds a bidirectional link: two opposite edges, ports
//!   `to_from_<dst>` on the source and `to_from_<src>` on the destination. The source may be a
//!   group name, in which case every member of the group is linked.
//!
//! Processing modules never link directly to memory modules; they reach memory through a
//! communication module.
//!
//! # Groups
//!
//! Groups are vertex tags. [`PlatformBuilder::add_cpu`] puts every core in a group named after
//! the CPU, [`PlatformBuilder::add_fpga`] groups the FPGA with its block RAM, and
//! [`PlatformBuilder::add_to_group`] declares further memberships.
//!
//! ```
//! use dse_models::platform::PlatformBuilder;
//! use dse_models::requirements::{FLOP, modal_instructions};
//!
//! let mut platform = PlatformBuilder::new("Board");
//! platform
//!     .add_cpu("CPU", 2, 1_000_000_000, &modal_instructions("default", [(FLOP, 2.0)]))
//!     .unwrap();
//! platform.add_router("BUS", 100_000_000).unwrap();
//! platform.add_memory("MEM", 100_000_000, 8 * 1024).unwrap();
//!
//! platform.connect_two_way("CPU", "BUS").unwrap();
//! platform.connect_two_way("BUS", "MEM").unwrap();
//! assert!(platform.graph().contains("CPU_C1_Scheduler"));
//! ```

pub mod catalog;

use std::collections::BTreeMap;

use petgraph::graph::NodeIndex;
use tracing::debug;

use crate::{
    Symbol,
    model::{
        EdgeTrait, ModelError, SystemGraph,
        views::{
            CommunicationModule, GreyBox, LogicProgrammableModule, MemoryModule, ProcessingModule,
            SuperLoopRuntime,
        },
    },
    requirements::ModalInstructions,
};

const PHYSICAL_LINK: &[EdgeTrait] = &[EdgeTrait::PhysicalConnection, EdgeTrait::VisualConnection];
const RUNTIME_LINK: &[EdgeTrait] = &[EdgeTrait::StructuralContainment, EdgeTrait::VisualConnection];

/// Flit and timing parameters of a switch.
///
/// `traversal_time(size) = initial_latency
///     + ceil(size / flit_size_in_bits) * (max_cycles_per_flit / max_concurrent_flits) / frequency`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchConfig {
    pub flit_size_in_bits: u64,
    pub initial_latency: u64,
    pub max_cycles_per_flit: u64,
    pub max_concurrent_flits: u64,
}

impl Default for SwitchConfig {
    /// One byte per cycle, one flit at a time, no initial latency.
    fn default() -> Self {
        Self {
            flit_size_in_bits: 8,
            initial_latency: 0,
            max_cycles_per_flit: 1,
            max_concurrent_flits: 1,
        }
    }
}

pub fn core_name(cpu: &str, cores: usize, core: usize) -> String {
    if cores > 1 {
        format!("{}_C{}", cpu, core)
    } else {
        cpu.to_string()
    }
}

pub fn scheduler_name(core: &str) -> String {
    format!("{}_Scheduler", core)
}

fn positive(value: u64, what: &str, component: &str) -> Result<(), ModelError> {
    if value == 0 {
        Err(ModelError::Validation(format!(
            "{} of {} must be >= 1",
            what, component
        )))
    } else {
        Ok(())
    }
}

/// Incremental builder of a platform graph.
#[derive(Debug)]
pub struct PlatformBuilder {
    graph: SystemGraph,
    root: Option<NodeIndex>,
}

impl PlatformBuilder {
    pub fn new(name: &str) -> Self {
        let mut graph = SystemGraph::new();
        let root = graph
            .new_vertex(name)
            .expect("a fresh graph has no vertices");
        graph.attach(root, GreyBox::default());
        Self {
            graph,
            root: Some(root),
        }
    }

    /// Continue building on an existing platform graph.
    ///
    /// The first vertex with a [`GreyBox`] view becomes the root. Without one, new components
    /// are added without a containing grey box. Group tags carried by the graph remain usable
    /// with [`connect_two_way`](Self::connect_two_way).
    pub fn from_graph(graph: SystemGraph) -> Self {
        let root = graph.viewers::<GreyBox>().map(|(ix, _)| ix).next();
        Self { graph, root }
    }

    pub fn graph(&self) -> &SystemGraph {
        &self.graph
    }

    pub fn into_graph(self) -> SystemGraph {
        self.graph
    }

    fn component(&self, name: &str) -> Result<NodeIndex, ModelError> {
        self.graph
            .index_of(name)
            .ok_or_else(|| ModelError::ComponentNotFound(name.into()))
    }

    fn check_free(&self, names: &[&str]) -> Result<(), ModelError> {
        match names.iter().find(|name| self.graph.contains(name)) {
            Some(name) => Err(ModelError::DuplicateName((*name).into())),
            None => Ok(()),
        }
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

    fn check_topology(&self, a: NodeIndex, b: NodeIndex) -> Result<(), ModelError> {
        let pe = |ix| self.graph.has_view::<ProcessingModule>(ix);
        let mem = |ix| self.graph.has_view::<MemoryModule>(ix);
        if (pe(a) && mem(b)) || (mem(a) && pe(b)) {
            Err(ModelError::Topology(format!(
                "cannot link processing module and memory directly: {} <-> {}",
                self.graph.name(a),
                self.graph.name(b)
            )))
        } else {
            Ok(())
        }
    }

    fn contain(&mut self, ix: NodeIndex) {
        if let Some(root) = self.root {
            let name = self.graph.name(ix).clone();
            self.graph.enforce::<GreyBox>(root).contained.push(name);
        }
    }

    fn new_component(&mut self, name: &str) -> Result<NodeIndex, ModelError> {
        let ix = self.graph.new_vertex(name)?;
        self.contain(ix);
        Ok(ix)
    }

    /// Add a memory module.
    pub fn add_memory(
        &mut self,
        name: &str,
        frequency_in_hertz: u64,
        space_in_bits: u64,
    ) -> Result<NodeIndex, ModelError> {
        positive(frequency_in_hertz, "frequency", name)?;
        self.check_free(&[name])?;

        let ix = self.new_component(name)?;
        self.graph.attach(
            ix,
            MemoryModule {
                operating_frequency_in_hertz: frequency_in_hertz,
                space_in_bits,
            },
        );
        debug!("Added memory {}", name);
        Ok(ix)
    }

    /// Add a switch with the [`SwitchConfig::default`] parameters.
    pub fn add_router(
        &mut self,
        name: &str,
        frequency_in_hertz: u64,
    ) -> Result<NodeIndex, ModelError> {
        self.add_switch(name, frequency_in_hertz, SwitchConfig::default())
    }

    /// Add a switch with explicit flit parameters.
    pub fn add_switch(
        &mut self,
        name: &str,
        frequency_in_hertz: u64,
        config: SwitchConfig,
    ) -> Result<NodeIndex, ModelError> {
        positive(frequency_in_hertz, "frequency", name)?;
        positive(config.flit_size_in_bits, "flit size", name)?;
        positive(config.max_cycles_per_flit, "cycles per flit", name)?;
        positive(config.max_concurrent_flits, "concurrent flits", name)?;
        self.check_free(&[name])?;

        let ix = self.new_component(name)?;
        self.graph.attach(
            ix,
            CommunicationModule {
                operating_frequency_in_hertz: frequency_in_hertz,
                flit_size_in_bits: config.flit_size_in_bits,
                initial_latency: config.initial_latency,
                max_cycles_per_flit: config.max_cycles_per_flit,
                max_concurrent_flits: config.max_concurrent_flits,
                port_connections: None,
            },
        );
        debug!("Added switch {}", name);
        Ok(ix)
    }

    /// Add `cores` independent single-issue cores, each managed by its own runtime.
    ///
    /// `cycles_per_instruction` is given per mode and instruction; the cores store the
    /// reciprocal (instructions per cycle). A single core is named `name`, several cores are
    /// named `name_C0`, `name_C1`, ... Every core is tagged with group `name`.
    pub fn add_cpu(
        &mut self,
        name: &str,
        cores: usize,
        frequency_in_hertz: u64,
        cycles_per_instruction: &ModalInstructions,
    ) -> Result<Vec<NodeIndex>, ModelError> {
        if cores == 0 {
            return Err(ModelError::Validation(format!(
                "CPU {} needs at least one core",
                name
            )));
        }
        positive(frequency_in_hertz, "frequency", name)?;

        let mut per_cycle = ModalInstructions::new();
        for (mode, instructions) in cycles_per_instruction {
            let mut table = BTreeMap::new();
            for (instruction, &cycles) in instructions {
                if !(cycles > 0.0) {
                    return Err(ModelError::Validation(format!(
                        "{} of {} needs a positive cycle count, got {}",
                        instruction, name, cycles
                    )));
                }
                table.insert(instruction.clone(), 1.0 / cycles);
            }
            per_cycle.insert(mode.clone(), table);
        }

        let names: Vec<(String, String)> = (0..cores)
            .map(|i| {
                let core = core_name(name, cores, i);
                let runtime = scheduler_name(&core);
                (core, runtime)
            })
            .collect();
        for (core, runtime) in &names {
            self.check_free(&[core.as_str(), runtime.as_str()])?;
        }

        let mut created = Vec::with_capacity(cores);
        for (core, runtime) in names {
            let core_ix = self.new_component(&core)?;
            self.graph.attach(
                core_ix,
                ProcessingModule {
                    operating_frequency_in_hertz: frequency_in_hertz,
                    maximum_computation_parallelism: 1,
                    modal_instructions_per_cycle: per_cycle.clone(),
                },
            );
            self.graph.tag(core_ix, name);

            let runtime_ix = self.new_component(&runtime)?;
            self.graph.attach(
                runtime_ix,
                SuperLoopRuntime {
                    managed: vec![Symbol::from(core.as_str())],
                    super_loop_entries: Vec::new(),
                },
            );
            self.graph.connect(core_ix, runtime_ix, None, None, RUNTIME_LINK)?;
            self.graph.connect(runtime_ix, core_ix, None, None, RUNTIME_LINK)?;

            created.push(core_ix);
        }

        debug!("Added CPU {} with {} cores", name, cores);
        Ok(created)
    }

    /// Add a programmable-logic module.
    ///
    /// With `bram_size_in_bits > 0` the module also gets a block RAM `<name>_BRAM` behind the
    /// switch `<name>_BRAM_SWITCH`, both in group `name`.
    pub fn add_fpga(
        &mut self,
        name: &str,
        available_logic_area: u64,
        bram_size_in_bits: u64,
        bram_flit_size_in_bits: u64,
        frequency_in_hertz: u64,
    ) -> Result<NodeIndex, ModelError> {
        positive(frequency_in_hertz, "frequency", name)?;
        let switch = format!("{}_BRAM_SWITCH", name);
        let bram = format!("{}_BRAM", name);
        if bram_size_in_bits > 0 {
            positive(bram_flit_size_in_bits, "block RAM flit size", name)?;
            self.check_free(&[name, switch.as_str(), bram.as_str()])?;
        } else {
            self.check_free(&[name])?;
        }

        let fpga = self.new_component(name)?;
        self.graph.attach(
            fpga,
            LogicProgrammableModule {
                available_logic_area,
                block_ram_size_in_bits: bram_size_in_bits,
                operating_frequency_in_hertz: frequency_in_hertz,
            },
        );
        self.graph.tag(fpga, name);

        if bram_size_in_bits > 0 {
            let sw = self.add_switch(
                &switch,
                frequency_in_hertz,
                SwitchConfig {
                    flit_size_in_bits: bram_flit_size_in_bits,
                    ..SwitchConfig::default()
                },
            )?;
            let mem = self.add_memory(&bram, frequency_in_hertz, bram_size_in_bits)?;
            self.graph.tag(sw, name);
            self.graph.tag(mem, name);
            self.connect_two_way(name, &switch)?;
            self.connect_two_way(&switch, &bram)?;
        }

        debug!("Added FPGA {}", name);
        Ok(fpga)
    }

    /// Put `component` in `group` so it takes part in group-wide links.
    pub fn add_to_group(&mut self, group: &str, component: &str) -> Result<(), ModelError> {
        let ix = self.component(component)?;
        self.graph.tag(ix, group);
        Ok(())
    }

    /// Link `src` to `dst` in one direction only.
    pub fn connect_one_way(&mut self, src: &str, dst: &str) -> Result<(), ModelError> {
        let src_ix = self.component(src)?;
        let dst_ix = self.component(dst)?;
        self.check_topology(src_ix, dst_ix)?;

        let src_port = format!("to_{}", dst);
        let dst_port = format!("from_{}", src);
        self.check_port_free(src_ix, &src_port)?;
        self.check_port_free(dst_ix, &dst_port)?;

        self.graph.add_port(src_ix, &src_port)?;
        self.graph.add_port(dst_ix, &dst_port)?;
        self.graph.connect(
            src_ix,
            dst_ix,
            Some(&src_port),
            Some(&dst_port),
            &[EdgeTrait::PhysicalConnection],
        )?;
        Ok(())
    }

    /// Components named by `src_or_group`: the exact component if one exists, otherwise the
    /// members of that group without `dst`.
    fn resolve_sources(
        &self,
        src_or_group: &str,
        dst: NodeIndex,
    ) -> Result<Vec<NodeIndex>, ModelError> {
        if let Some(ix) = self.graph.index_of(src_or_group) {
            if ix == dst {
                return Err(ModelError::Validation(format!(
                    "cannot link {} to itself",
                    src_or_group
                )));
            }
            return Ok(vec![ix]);
        }

        let members: Vec<_> = self
            .graph
            .tagged(src_or_group)
            .into_iter()
            .filter(|&ix| ix != dst)
            .collect();
        if members.is_empty() {
            Err(ModelError::NoMatch(src_or_group.into()))
        } else {
            Ok(members)
        }
    }

    /// Link `src_or_group` and `dst` in both directions.
    pub fn connect_two_way(&mut self, src_or_group: &str, dst: &str) -> Result<(), ModelError> {
        let dst_ix = self.component(dst)?;
        let sources = self.resolve_sources(src_or_group, dst_ix)?;

        let src_port = format!("to_from_{}", dst);
        let mut links = Vec::with_capacity(sources.len());
        for &src_ix in &sources {
            self.check_topology(src_ix, dst_ix)?;
            let dst_port = format!("to_from_{}", self.graph.name(src_ix));
            self.check_port_free(src_ix, &src_port)?;
            self.check_port_free(dst_ix, &dst_port)?;
            links.push((src_ix, dst_port));
        }

        for (src_ix, dst_port) in links {
            self.graph.add_port(src_ix, &src_port)?;
            self.graph.add_port(dst_ix, &dst_port)?;
            self.graph
                .connect(src_ix, dst_ix, Some(&src_port), Some(&dst_port), PHYSICAL_LINK)?;
            self.graph
                .connect(dst_ix, src_ix, Some(&dst_port), Some(&src_port), PHYSICAL_LINK)?;
            debug!("Linked {} <-> {}", self.graph.name(src_ix), dst);
        }
        Ok(())
    }

    /// Port of `switch` bound to its link with `neighbour`.
    fn port_towards(&self, switch: NodeIndex, neighbour: &str) -> Result<Symbol, ModelError> {
        let not_found = || ModelError::PortNotFound {
            vertex: self.graph.name(switch).clone(),
            port: neighbour.into(),
        };
        let other = self.graph.index_of(neighbour).ok_or_else(not_found)?;

        let outgoing = self
            .graph
            .outgoing(switch)
            .into_iter()
            .filter(|(dst, _)| *dst == other)
            .find_map(|(_, c)| c.src_port.clone());
        let incoming = || {
            self.graph
                .incoming(switch)
                .into_iter()
                .filter(|(src, _)| *src == other)
                .find_map(|(_, c)| c.dst_port.clone())
        };
        outgoing.or_else(incoming).ok_or_else(not_found)
    }

    /// Restrict which ports of `switch` can forward to which.
    ///
    /// Routes are given by neighbour name: `("A", ["B", "C"])` lets traffic from `A` leave
    /// towards `B` and `C`. Names are resolved to the switch ports bound to the links with
    /// those neighbours before anything is recorded.
    pub fn add_internal_switch_routes<'a, R, T>(
        &mut self,
        switch: &str,
        routes: R,
    ) -> Result<(), ModelError>
    where
        R: IntoIterator<Item = (&'a str, T)>,
        T: IntoIterator<Item = &'a str>,
    {
        let sw = self.component(switch)?;
        if !self.graph.has_view::<CommunicationModule>(sw) {
            return Err(ModelError::ComponentNotFound(switch.into()));
        }

        let mut table = BTreeMap::new();
        for (from, to) in routes {
            let from_port = self.port_towards(sw, from)?;
            let to_ports = to
                .into_iter()
                .map(|n| self.port_towards(sw, n))
                .collect::<Result<Vec<_>, _>>()?;
            table.insert(from_port, to_ports);
        }

        if let Some(comm) = self.graph.try_view_mut::<CommunicationModule>(sw) {
            comm.port_connections
                .get_or_insert_with(BTreeMap::new)
                .extend(table);
        }
        Ok(())
    }
}
