//! Fixed benchmark applications and the sequential-chain generator.

use std::fmt;

use clap::ValueEnum;

use super::ApplicationBuilder;
use crate::{
    model::{ModelError, SystemGraph},
    requirements::{
        FLOP, INT_OP, instruction_costs,
        units::{BYTES_TO_BITS, CLB, CLOCK_CYCLE, GB, KB, MB, MHZ},
    },
};

/// Applications known to the `build` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ApplicationKind {
    Tc1,
    Tc2,
    Tc3,
    Tc45,
    Real,
}

impl ApplicationKind {
    pub fn build(self) -> Result<SystemGraph, ModelError> {
        match self {
            ApplicationKind::Tc1 => tc1(),
            ApplicationKind::Tc2 => tc2(),
            ApplicationKind::Tc3 => tc3(),
            ApplicationKind::Tc45 => tc45(),
            ApplicationKind::Real => realistic(),
        }
    }
}

impl fmt::Display for ApplicationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ApplicationKind::Tc1 => "tc1",
            ApplicationKind::Tc2 => "tc2",
            ApplicationKind::Tc3 => "tc3",
            ApplicationKind::Tc45 => "tc45",
            ApplicationKind::Real => "real",
        };
        f.write_str(name)
    }
}

const ACTOR_1: &str = "Actor_1";
const ACTOR_2: &str = "Actor_2";

/// Two actors joined by a 15/3 channel, fed with 5 tokens and draining 1.
fn two_actor_chain(app: &mut ApplicationBuilder) -> Result<(), ModelError> {
    app.set_input_channel(ACTOR_1, 5)?;
    app.create_channel(ACTOR_1, ACTOR_2, 15, 3)?;
    app.set_output_channel(ACTOR_2, 1)
}

/// One hardware-only and one software-only actor.
pub fn tc1() -> Result<SystemGraph, ModelError> {
    let mut app = ApplicationBuilder::new("TC1");

    app.add_actor(ACTOR_1)?;
    app.set_hardware_implementation(
        ACTOR_1,
        10 * CLOCK_CYCLE,
        300 * MHZ,
        2 * KB * BYTES_TO_BITS,
        110 * CLB,
    )?;

    app.add_actor(ACTOR_2)?;
    app.set_software_implementation(
        ACTOR_2,
        instruction_costs([(FLOP, 8)]),
        4 * KB * BYTES_TO_BITS,
    )?;

    two_actor_chain(&mut app)?;
    Ok(app.into_graph())
}

/// Both actors have cheap hardware and expensive software implementations.
pub fn tc2() -> Result<SystemGraph, ModelError> {
    let mut app = ApplicationBuilder::new("TC2");

    for (actor, area, flops) in [(ACTOR_1, 110, 9000), (ACTOR_2, 90, 8000)] {
        app.add_actor(actor)?;
        app.set_hardware_implementation(
            actor,
            10 * CLOCK_CYCLE,
            200 * MHZ,
            2 * KB * BYTES_TO_BITS,
            area * CLB,
        )?;
        app.set_software_implementation(
            actor,
            instruction_costs([(FLOP, flops)]),
            4 * KB * BYTES_TO_BITS,
        )?;
    }

    two_actor_chain(&mut app)?;
    Ok(app.into_graph())
}

/// Hardware implementations exceeding the block RAM and logic area of the platforms.
pub fn tc3() -> Result<SystemGraph, ModelError> {
    let mut app = ApplicationBuilder::new("TC3");

    app.add_actor(ACTOR_1)?;
    app.set_hardware_implementation(
        ACTOR_1,
        10 * CLOCK_CYCLE,
        200 * MHZ,
        GB * BYTES_TO_BITS,
        10 * CLB,
    )?;

    app.add_actor(ACTOR_2)?;
    app.set_hardware_implementation(
        ACTOR_2,
        15 * CLOCK_CYCLE,
        200 * MHZ,
        2 * KB * BYTES_TO_BITS,
        600_100 * CLB,
    )?;

    two_actor_chain(&mut app)?;
    Ok(app.into_graph())
}

/// Stresses the bandwidth between the processors and the programmable logic.
pub fn tc45() -> Result<SystemGraph, ModelError> {
    let mut app = ApplicationBuilder::new("TC4And5");

    app.add_actor(ACTOR_1)?;
    app.set_software_implementation(
        ACTOR_1,
        instruction_costs([(FLOP, 1)]),
        4 * KB * BYTES_TO_BITS,
    )?;
    app.set_hardware_implementation(
        ACTOR_1,
        200_000_000 * CLOCK_CYCLE,
        200 * MHZ,
        2 * MB * BYTES_TO_BITS,
        110 * CLB,
    )?;

    app.add_actor(ACTOR_2)?;
    app.set_software_implementation(
        ACTOR_2,
        instruction_costs([(FLOP, 8_000_000)]),
        KB * BYTES_TO_BITS,
    )?;
    app.set_hardware_implementation(
        ACTOR_2,
        15 * CLOCK_CYCLE,
        200 * MHZ,
        2 * KB * BYTES_TO_BITS,
        90 * CLB,
    )?;

    two_actor_chain(&mut app)?;
    Ok(app.into_graph())
}

/// Video pipeline: split, parallel grayscale and Sobel stages, resize, object detection.
pub fn realistic() -> Result<SystemGraph, ModelError> {
    const SPLIT: &str = "SplitInput";
    const SYNC: &str = "SyncAndResize";
    const DETECT: &str = "ObjectDetection";
    const FRAME_SIZE: u64 = 3840 * 2160;
    const RGB_FRAME_SIZE: u64 = FRAME_SIZE * 3;
    const LANES: u64 = 5;

    let mut app = ApplicationBuilder::new("RealisticSDF");

    app.add_actor(SPLIT)?;
    app.set_software_implementation(SPLIT, instruction_costs([(INT_OP, 1)]), 3 * BYTES_TO_BITS)?;
    app.set_hardware_implementation(SPLIT, 200 * CLOCK_CYCLE, 300 * MHZ, 8, 100 * CLB)?;
    app.set_input_channel(SPLIT, RGB_FRAME_SIZE)?;

    app.add_actor(SYNC)?;
    app.set_software_implementation(SYNC, instruction_costs([(INT_OP, 1000)]), 3 * BYTES_TO_BITS)?;

    for lane in 0..LANES {
        let gray = format!("Grayscale{}", lane);
        app.add_actor(&gray)?;
        app.set_software_implementation(
            &gray,
            instruction_costs([(FLOP, 8 * FRAME_SIZE / LANES)]),
            100 * BYTES_TO_BITS,
        )?;
        app.set_hardware_implementation(
            &gray,
            2_070_000 * CLOCK_CYCLE / LANES,
            300 * MHZ,
            0,
            100 * CLB,
        )?;
        app.create_channel(SPLIT, &gray, RGB_FRAME_SIZE / LANES, RGB_FRAME_SIZE / LANES)?;

        let sobel = format!("Sobel{}", lane);
        app.add_actor(&sobel)?;
        app.set_software_implementation(
            &sobel,
            instruction_costs([(INT_OP, 18 * FRAME_SIZE / LANES)]),
            6 * KB * BYTES_TO_BITS,
        )?;
        app.set_hardware_implementation(
            &sobel,
            2_250_000 * CLOCK_CYCLE,
            300 * MHZ,
            6 * KB * BYTES_TO_BITS,
            132 * CLB,
        )?;
        app.create_channel(&gray, &sobel, FRAME_SIZE / LANES, FRAME_SIZE / LANES)?;
        app.create_channel(&sobel, SYNC, FRAME_SIZE / LANES, FRAME_SIZE / LANES)?;
    }

    app.add_actor(DETECT)?;
    app.set_software_implementation(
        DETECT,
        instruction_costs([(FLOP, 21_000_000)]),
        756 * KB * BYTES_TO_BITS,
    )?;
    app.set_hardware_implementation(
        DETECT,
        5_600_000 * CLOCK_CYCLE,
        300 * MHZ,
        756 * KB * BYTES_TO_BITS,
        5650 * CLB,
    )?;
    app.create_channel(SYNC, DETECT, FRAME_SIZE, FRAME_SIZE)?;
    app.set_output_channel(DETECT, 10)?;

    Ok(app.into_graph())
}

/// Chain `Actor_1 -> ... -> Actor_<actors>` with 5/5 rates.
///
/// Every actor gets the same software implementation; the first `hw_actors` also get a
/// hardware implementation.
pub fn sequential(name: &str, actors: usize, hw_actors: usize) -> Result<SystemGraph, ModelError> {
    if actors == 0 {
        return Err(ModelError::Validation(
            "a sequential application needs at least one actor".into(),
        ));
    }
    if hw_actors > actors {
        return Err(ModelError::Validation(format!(
            "{} hardware implementations requested for {} actors",
            hw_actors, actors
        )));
    }

    let mut app = ApplicationBuilder::new(name);
    let actor_name = |i: usize| format!("Actor_{}", i);

    for i in 1..=actors {
        let actor = actor_name(i);
        app.add_actor(&actor)?;
        app.set_software_implementation(
            &actor,
            instruction_costs([(FLOP, 80)]),
            4 * BYTES_TO_BITS,
        )?;
        if i <= hw_actors {
            app.set_hardware_implementation(
                &actor,
                10 * CLOCK_CYCLE,
                200 * MHZ,
                2 * BYTES_TO_BITS,
                110 * CLB,
            )?;
        }
        if i == 1 {
            app.set_input_channel(&actor, 5)?;
        } else {
            app.create_channel(&actor_name(i - 1), &actor, 5, 5)?;
        }
    }
    app.set_output_channel(&actor_name(actors), 5)?;

    Ok(app.into_graph())
}
