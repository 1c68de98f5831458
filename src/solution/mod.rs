//! Human-readable report of a solved design model.
//!
//! The external solver annotates the design model with mapping, scheduling and analysis
//! views. [`SolutionReader::read`] walks the vertices once, in creation order, and sorts what
//! it finds into the report sections:
//!
//! | Section          | View                             | Line                                   |
//! |------------------|----------------------------------|----------------------------------------|
//! | Mappings         | `MemoryMapped`                   | `v --> memory`                         |
//! | Schedules        | `Scheduled`                      | `v --> runtime`                        |
//! | PL Mappings      | `LogicProgrammableSynthetized`   | `v --> logic module`                   |
//! | Superloops       | `SuperLoopRuntime` (non-empty)   | `v: [e1, e2, ...]`                     |
//! | Actor throughput | `AnalyzedBehavior`               | `v: num/den tokens/sec`                |
//! | Buffers          | `BoundedBuffer`                  | `v: n * bits bits (bytes Bytes)`       |
//!
//! Nothing is validated: the report shows whatever the solver wrote.

use std::{
    fs,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::info;

use crate::{
    codec,
    model::{
        SystemGraph,
        views::{
            AnalyzedBehavior, BoundedBuffer, LogicProgrammableSynthetized, MemoryMapped, Scheduled,
            SuperLoopRuntime,
        },
    },
};

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Extracted solution, one list of lines per section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolutionReport {
    pub mappings: Vec<String>,
    pub schedules: Vec<String>,
    pub pl_mappings: Vec<String>,
    pub super_loops: Vec<String>,
    pub throughputs: Vec<String>,
    pub buffers: Vec<String>,
}

/// Walks a solved graph into a [`SolutionReport`].
pub struct SolutionReader;

impl SolutionReader {
    pub fn read(graph: &SystemGraph) -> SolutionReport {
        let mut report = SolutionReport::default();

        for (ix, vertex) in graph.vertices() {
            let v = &vertex.name;

            if let Some(mm) = graph.try_view::<MemoryMapped>(ix) {
                report
                    .mappings
                    .push(format!("{} --> {}", v, mm.mapping_host));
            }
            if let Some(s) = graph.try_view::<Scheduled>(ix) {
                report.schedules.push(format!("{} --> {}", v, s.runtime_host));
            }
            if let Some(lps) = graph.try_view::<LogicProgrammableSynthetized>(ix) {
                report
                    .pl_mappings
                    .push(format!("{} --> {}", v, lps.host_logic_programmable_module));
            }
            if let Some(sl) = graph.try_view::<SuperLoopRuntime>(ix) {
                if !sl.super_loop_entries.is_empty() {
                    report.super_loops.push(format!(
                        "{}: [{}]",
                        v,
                        sl.super_loop_entries.iter().join(", ")
                    ));
                }
            }
            if let Some(ab) = graph.try_view::<AnalyzedBehavior>(ix) {
                report.throughputs.push(format!(
                    "{}: {}/{} tokens/sec",
                    v, ab.throughput_in_secs_numerator, ab.throughput_in_secs_denominator
                ));
            }
            if let Some(bb) = graph.try_view::<BoundedBuffer>(ix) {
                let bits = u128::from(bb.max_elements) * u128::from(bb.element_size_in_bits);
                report.buffers.push(format!(
                    "{}: {} * {} bits ({} Bytes)",
                    v,
                    bb.max_elements,
                    bb.element_size_in_bits,
                    bits / 8
                ));
            }
        }

        report
    }
}

impl SolutionReport {
    fn sections(&self) -> [(&'static str, &[String]); 6] {
        [
            ("Mappings: Actor/Buffer <--> Memory", self.mappings.as_slice()),
            ("Schedules:", self.schedules.as_slice()),
            ("PL Mappings:", self.pl_mappings.as_slice()),
            ("Superloops:", self.super_loops.as_slice()),
            ("Actor throughput:", self.throughputs.as_slice()),
            ("Buffers:", self.buffers.as_slice()),
        ]
    }

    /// Formatted report with bold section titles.
    pub fn report(&self) -> String {
        let mut out = String::new();
        for (title, lines) in self.sections() {
            out.push_str(&format!("\n{}{}{}\n", BOLD, title, RESET));
            for line in lines {
                out.push_str(line);
                out.push('\n');
            }
        }
        out
    }

    /// The report without terminal escape sequences.
    pub fn plain(&self) -> String {
        lazy_static! {
            static ref ANSI_RE: Regex = Regex::new(r"\x1b\[[0-9;]*m").unwrap();
        }

        ANSI_RE.replace_all(&self.report(), "").into_owned()
    }

    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        let mut out = BufWriter::new(fs::File::create(path)?);
        out.write_all(self.plain().as_bytes())?;
        out.flush()
    }
}

/// Command-line arguments for the solution report.
#[derive(Parser, Debug)]
pub struct ParseSolutionArgs {
    /// Solved design model
    pub input: PathBuf,

    /// Directory for the plain-text report
    pub out_dir: PathBuf,
}

pub fn parse_solution_main(args: ParseSolutionArgs) -> Result<()> {
    let ParseSolutionArgs { input, out_dir } = args;

    let graph = codec::load(&input)
        .with_context(|| format!("Failed to load solution '{}'", input.display()))?;
    let report = SolutionReader::read(&graph);
    println!("{}", report.report());

    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "solution".to_string());
    let out = out_dir.join(format!("{}.txt", stem));
    report
        .write_to(&out)
        .with_context(|| format!("Failed to write '{}'", out.display()))?;
    info!("Solution written to '{}'", out.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Symbol;
    use crate::test_helpers::solved_graph;

    #[test]
    fn report_lines() {
        let report = SolutionReader::read(&solved_graph());
        let text = report.report();

        assert!(text.contains("actor1 --> mem1"));
        assert!(text.contains("actor1: 3/2 tokens/sec"));
        assert!(text.contains("actor1 --> cpu_Scheduler"));
        assert!(text.contains("actor2 --> fpga"));
        assert!(text.contains("cpu_Scheduler: [actor1, actor1]"));
        assert!(text.contains("CH_actor1_actor2: 4 * 16 bits (8 Bytes)"));
        assert_eq!(text, report.report());
    }

    #[test]
    fn sections_in_order() {
        let text = SolutionReader::read(&solved_graph()).plain();
        let titles = [
            "Mappings:",
            "Schedules:",
            "PL Mappings:",
            "Superloops:",
            "Actor throughput:",
            "Buffers:",
        ];
        let positions = titles
            .iter()
            .map(|t| text.find(t).unwrap())
            .collect_vec();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn empty_super_loops_are_skipped() {
        let mut g = SystemGraph::new();
        let rt = g.new_vertex("idle_Scheduler").unwrap();
        g.attach(
            rt,
            SuperLoopRuntime {
                managed: vec![Symbol::from("idle")],
                super_loop_entries: vec![],
            },
        );
        assert!(SolutionReader::read(&g).super_loops.is_empty());
    }

    #[test]
    fn huge_buffers_do_not_overflow() {
        let mut g = SystemGraph::new();
        let ch = g.new_vertex("CH_big").unwrap();
        g.attach(
            ch,
            BoundedBuffer {
                max_elements: u64::MAX / 4,
                element_size_in_bits: 64,
            },
        );

        let report = SolutionReader::read(&g);
        let expected = u128::from(u64::MAX / 4) * 8;
        assert_eq!(
            report.buffers,
            vec![format!(
                "CH_big: {} * 64 bits ({} Bytes)",
                u64::MAX / 4,
                expected
            )]
        );
    }

    #[test]
    fn written_report_is_plain() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("solution.txt");
        let report = SolutionReader::read(&solved_graph());
        report.write_to(&path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, report.plain());
        assert!(written.contains("actor1 --> mem1"));
    }
}
