//! Shared fixtures for unit tests.

use petgraph::graph::NodeIndex;

use crate::{
    Symbol,
    application::ApplicationBuilder,
    model::{
        SystemGraph,
        views::{
            AnalyzedBehavior, BoundedBuffer, LogicProgrammableSynthetized, MemoryMapped, Scheduled,
            SuperLoopRuntime,
        },
    },
    platform::PlatformBuilder,
    requirements::{FLOP, INT_OP, ModalInstructions, instruction_costs, modal_instructions},
};

/// One mode with float and integer instructions.
pub fn cpu_costs() -> ModalInstructions {
    modal_instructions("economy", [(FLOP, 2.0), (INT_OP, 1.0)])
}

/// Assert that `a` and `b` are linked in both directions with swapped ports.
pub fn assert_bidirectional(graph: &SystemGraph, a: NodeIndex, b: NodeIndex) {
    let forward: Vec<_> = graph
        .outgoing(a)
        .into_iter()
        .filter(|(dst, _)| *dst == b)
        .collect();
    let backward: Vec<_> = graph
        .outgoing(b)
        .into_iter()
        .filter(|(dst, _)| *dst == a)
        .collect();
    assert_eq!(forward.len(), 1, "{} -> {}", graph.name(a), graph.name(b));
    assert_eq!(backward.len(), 1, "{} -> {}", graph.name(b), graph.name(a));

    let (_, f) = forward[0];
    let (_, r) = backward[0];
    assert_eq!(f.src_port, r.dst_port);
    assert_eq!(f.dst_port, r.src_port);
    assert_eq!(f.traits, r.traits);
}

/// `A -> B`, where `A` has both implementations and `B` is software only.
pub fn hardware_application() -> SystemGraph {
    let mut app = ApplicationBuilder::new("HwApp");
    app.add_actor("A").unwrap();
    app.add_actor("B").unwrap();
    app.set_software_implementation("A", instruction_costs([(FLOP, 80)]), 32)
        .unwrap();
    app.set_hardware_implementation("A", 10, 200_000_000, 16, 110)
        .unwrap();
    app.set_software_implementation("B", instruction_costs([(INT_OP, 5)]), 32)
        .unwrap();
    app.create_channel("A", "B", 1, 1).unwrap();
    app.into_graph()
}

/// Dual-core CPU and memory behind one switch.
pub fn platform_without_fpga() -> SystemGraph {
    let mut p = PlatformBuilder::new("Plain");
    p.add_cpu("CPU", 2, 1_000_000_000, &cpu_costs()).unwrap();
    p.add_router("AXI", 100_000_000).unwrap();
    p.add_memory("DDR", 100_000_000, 1 << 20).unwrap();
    p.connect_two_way("CPU", "AXI").unwrap();
    p.connect_two_way("AXI", "DDR").unwrap();
    p.into_graph()
}

/// [`platform_without_fpga`] plus programmable logic `PL` (200 MHz, no block RAM) on the switch.
pub fn platform_with_fpga() -> SystemGraph {
    let mut p = PlatformBuilder::from_graph(platform_without_fpga());
    p.add_fpga("PL", 1000, 0, 0, 200_000_000).unwrap();
    p.connect_two_way("PL", "AXI").unwrap();
    p.into_graph()
}

/// A graph annotated the way the solver annotates a solution.
pub fn solved_graph() -> SystemGraph {
    let mut g = SystemGraph::new();
    let actor1 = g.new_vertex("actor1").unwrap();
    let actor2 = g.new_vertex("actor2").unwrap();
    let channel = g.new_vertex("CH_actor1_actor2").unwrap();
    let runtime = g.new_vertex("cpu_Scheduler").unwrap();

    g.attach(
        actor1,
        MemoryMapped {
            mapping_host: Symbol::from("mem1"),
        },
    );
    g.attach(
        actor1,
        Scheduled {
            runtime_host: Symbol::from("cpu_Scheduler"),
        },
    );
    g.attach(
        actor1,
        AnalyzedBehavior {
            throughput_in_secs_numerator: 3,
            throughput_in_secs_denominator: 2,
        },
    );
    g.attach(
        actor2,
        LogicProgrammableSynthetized {
            host_logic_programmable_module: Symbol::from("fpga"),
        },
    );
    g.attach(
        channel,
        BoundedBuffer {
            max_elements: 4,
            element_size_in_bits: 16,
        },
    );
    g.attach(
        runtime,
        SuperLoopRuntime {
            managed: vec![Symbol::from("cpu")],
            super_loop_entries: vec![Symbol::from("actor1"), Symbol::from("actor1")],
        },
    );
    g
}

/// Two logic modules, `PL0` on `SW0` (200 MHz) and `PL1` on `SW1` (250 MHz), with the
/// switches linked to each other and a single-core CPU on `SW0`.
pub fn platform_with_two_fpgas() -> SystemGraph {
    let mut p = PlatformBuilder::new("Dual");
    p.add_cpu("CPU", 1, 1_000_000_000, &cpu_costs()).unwrap();
    p.add_router("SW0", 100_000_000).unwrap();
    p.add_router("SW1", 100_000_000).unwrap();
    p.add_fpga("PL0", 1000, 0, 0, 200_000_000).unwrap();
    p.add_fpga("PL1", 2000, 0, 0, 250_000_000).unwrap();
    p.connect_two_way("CPU", "SW0").unwrap();
    p.connect_two_way("SW0", "SW1").unwrap();
    p.connect_two_way("PL0", "SW0").unwrap();
    p.connect_two_way("PL1", "SW1").unwrap();
    p.into_graph()
}

/// `A -> B`, both with a hardware implementation; only `A` has software.
pub fn two_hardware_actors() -> SystemGraph {
    let mut app = ApplicationBuilder::new("HwPair");
    app.add_actor("A").unwrap();
    app.add_actor("B").unwrap();
    app.set_software_implementation("A", instruction_costs([(FLOP, 80)]), 32)
        .unwrap();
    app.set_hardware_implementation("A", 10, 200_000_000, 16, 110)
        .unwrap();
    app.set_hardware_implementation("B", 15, 200_000_000, 0, 90)
        .unwrap();
    app.create_channel("A", "B", 1, 1).unwrap();
    app.into_graph()
}
