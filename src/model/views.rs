//! Typed views (capabilities) that can be attached to a vertex.
//!
//! A vertex exposes a view only when it was explicitly attached. Every vertex carries the same
//! fixed table of optional slots ([`Views`]), and the [`View`] trait gives typed access to the
//! slot of each record type, so lookups never need a runtime cast.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Symbol;
use crate::requirements::{
    CLOCK_CYCLES, ComputationalRequirements, HW_INSTRUCTIONS, InstructionCosts,
    ModalInstructions, SW_INSTRUCTIONS,
};

/// Access to one typed slot of [`Views`].
pub trait View: Sized {
    const KIND: ViewKind;
    fn slot(views: &Views) -> &Option<Self>;
    fn slot_mut(views: &mut Views) -> &mut Option<Self>;
}

macro_rules! define_views {
    ($($(#[$doc:meta])* $field:ident: $ty:ident),* $(,)?) => {
        /// Optional view slots carried by every vertex.
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct Views {
            $(
                $(#[$doc])*
                #[serde(skip_serializing_if = "Option::is_none")]
                pub $field: Option<$ty>,
            )*
        }

        /// Discriminant of every view type.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum ViewKind {
            $($ty,)*
        }

        impl ViewKind {
            pub fn name(&self) -> &'static str {
                match self {
                    $(ViewKind::$ty => stringify!($ty),)*
                }
            }
        }

        $(
            impl View for $ty {
                const KIND: ViewKind = ViewKind::$ty;

                fn slot(views: &Views) -> &Option<Self> {
                    &views.$field
                }

                fn slot_mut(views: &mut Views) -> &mut Option<Self> {
                    &mut views.$field
                }
            }
        )*

        impl Views {
            /// Kinds of the attached views, in declaration order.
            pub fn kinds(&self) -> Vec<ViewKind> {
                let mut kinds = Vec::new();
                $(
                    if self.$field.is_some() {
                        kinds.push(ViewKind::$ty);
                    }
                )*
                kinds
            }
        }
    };
}

define_views! {
    /// Visual grouping of the model's components.
    grey_box: GreyBox,
    sdf_actor: SdfActor,
    sdf_channel: SdfChannel,
    software: SoftwareImplementation,
    hardware: HardwareImplementation,
    processing_module: ProcessingModule,
    runtime: SuperLoopRuntime,
    memory_module: MemoryModule,
    communication_module: CommunicationModule,
    logic_module: LogicProgrammableModule,
    // Written by the solver.
    memory_mapped: MemoryMapped,
    scheduled: Scheduled,
    synthetized: LogicProgrammableSynthetized,
    analyzed: AnalyzedBehavior,
    bounded_buffer: BoundedBuffer,
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GreyBox {
    pub contained: Vec<Symbol>,
}

/// Per-firing token rates of a dataflow actor, keyed by port.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SdfActor {
    pub production: BTreeMap<Symbol, u64>,
    pub consumption: BTreeMap<Symbol, u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SdfChannel {
    pub num_initial_tokens: u64,
    pub producer: Symbol,
    pub consumer: Symbol,
    pub token_size_in_bits: u64,
}

/// Software implementation alternative of an actor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SoftwareImplementation {
    pub computational_requirements: ComputationalRequirements,
    pub max_size_in_bits: BTreeMap<Symbol, u64>,
}

impl SoftwareImplementation {
    pub fn software_instructions(&self) -> Option<&InstructionCosts> {
        self.computational_requirements
            .get(&Symbol::from(SW_INSTRUCTIONS))
    }
}

/// Hardware implementation alternative of an actor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HardwareImplementation {
    pub resource_requirements: ComputationalRequirements,
    pub frequency_in_hertz: u64,
    pub block_ram_in_bits: u64,
    pub required_area: u64,
}

impl HardwareImplementation {
    pub fn hardware_instructions(&self) -> Option<&InstructionCosts> {
        self.resource_requirements.get(&Symbol::from(HW_INSTRUCTIONS))
    }

    pub fn clock_cycles(&self) -> Option<u64> {
        self.hardware_instructions()?
            .get(&Symbol::from(CLOCK_CYCLES))
            .copied()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingModule {
    pub operating_frequency_in_hertz: u64,
    pub maximum_computation_parallelism: u32,
    pub modal_instructions_per_cycle: ModalInstructions,
}

impl ProcessingModule {
    /// Cycles needed by one `instruction` in `mode`, if the module offers it.
    pub fn cycles_per_instruction(&self, mode: &str, instruction: &str) -> Option<f64> {
        self.modal_instructions_per_cycle
            .get(&Symbol::from(mode))?
            .get(&Symbol::from(instruction))
            .map(|per_cycle| 1.0 / per_cycle)
    }
}

/// Runtime that time-multiplexes the work mapped on its processing module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuperLoopRuntime {
    pub managed: Vec<Symbol>,
    pub super_loop_entries: Vec<Symbol>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryModule {
    pub operating_frequency_in_hertz: u64,
    pub space_in_bits: u64,
}

/// Switch or router.
///
/// `traversal_time(size) = initial_latency
///     + ceil(size / flit_size_in_bits) * (max_cycles_per_flit / max_concurrent_flits) / frequency`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommunicationModule {
    pub operating_frequency_in_hertz: u64,
    pub flit_size_in_bits: u64,
    pub initial_latency: u64,
    pub max_cycles_per_flit: u64,
    pub max_concurrent_flits: u64,
    /// Port → ports it can route to. `None` means every port reaches every other port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_connections: Option<BTreeMap<Symbol, Vec<Symbol>>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogicProgrammableModule {
    pub available_logic_area: u64,
    pub block_ram_size_in_bits: u64,
    pub operating_frequency_in_hertz: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryMapped {
    pub mapping_host: Symbol,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scheduled {
    pub runtime_host: Symbol,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicProgrammableSynthetized {
    pub host_logic_programmable_module: Symbol,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedBehavior {
    pub throughput_in_secs_numerator: u64,
    pub throughput_in_secs_denominator: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundedBuffer {
    pub max_elements: u64,
    pub element_size_in_bits: u64,
}
