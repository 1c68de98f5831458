use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

// Helper function to run the model tools binary
fn run_dse_models(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dse-models"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to run dse-models")
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("Temp path should be UTF-8")
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "Command should succeed. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

const SOLVED_MODEL: &str = r#"{
  "vertices": [
    {"name": "actor1", "views": {
        "memory_mapped": {"mapping_host": "mem1"},
        "scheduled": {"runtime_host": "cpu_Scheduler"},
        "analyzed": {"throughput_in_secs_numerator": 3, "throughput_in_secs_denominator": 2}}},
    {"name": "actor2", "views": {
        "synthetized": {"host_logic_programmable_module": "fpga"}}},
    {"name": "CH_actor1_actor2", "views": {
        "bounded_buffer": {"max_elements": 4, "element_size_in_bits": 16}}},
    {"name": "cpu_Scheduler", "views": {
        "runtime": {"managed": ["cpu"], "super_loop_entries": ["actor1", "actor2"]}}}
  ],
  "edges": []
}
"#;

#[cfg(test)]
mod build_tests {
    use super::*;

    /// Catalog platform and application land in the output directory
    #[test]
    fn test_build_writes_both_models() {
        let out = TempDir::new().expect("Failed to create temp dir");
        let output = run_dse_models(&["build", "mpsoc", "tc1", path_arg(out.path())]);
        assert_success(&output);

        let platform = out.path().join("mpsoc.json");
        let application = out.path().join("tc1.json");
        assert!(platform.exists(), "Platform model should be written");
        assert!(application.exists(), "Application model should be written");

        let platform_text = fs::read_to_string(&platform).unwrap();
        assert!(platform_text.contains("\"APU_C0\""));
        assert!(platform_text.contains("\"FPGA\""));

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("MPSoC"), "Summary should name the platform");
    }

    #[test]
    fn test_build_every_catalog_entry() {
        let out = TempDir::new().expect("Failed to create temp dir");
        for platform in ["mpsoc", "zynq", "mm"] {
            for application in ["tc1", "tc2", "tc3", "tc45", "real"] {
                let output =
                    run_dse_models(&["build", platform, application, path_arg(out.path())]);
                assert_success(&output);
                assert!(out.path().join(format!("{}.json", platform)).exists());
                assert!(out.path().join(format!("{}.json", application)).exists());
            }
        }
    }

    #[test]
    fn test_unknown_catalog_token_fails() {
        let out = TempDir::new().expect("Failed to create temp dir");
        let output = run_dse_models(&["build", "versal", "tc1", path_arg(out.path())]);
        assert_eq!(output.status.code(), Some(1));
        assert!(!out.path().join("tc1.json").exists());
    }

    #[test]
    fn test_missing_arguments_fail() {
        let output = run_dse_models(&["build", "mpsoc"]);
        assert_eq!(output.status.code(), Some(1));

        let output = run_dse_models(&["build_bench_application", "3"]);
        assert_eq!(output.status.code(), Some(1));
    }

    #[test]
    fn test_unknown_command_fails() {
        let output = run_dse_models(&["synthesise"]);
        assert_eq!(output.status.code(), Some(1));
    }
}

#[cfg(test)]
mod bench_application_tests {
    use super::*;

    #[test]
    fn test_bench_application_file_name() {
        let out = TempDir::new().expect("Failed to create temp dir");
        let output = run_dse_models(&["build_bench_application", "3", "1", path_arg(out.path())]);
        assert_success(&output);

        let path = out.path().join("Bench_3_1.json");
        assert!(path.exists(), "Bench application should be written");
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"Actor_3\""));
        assert!(text.contains("\"CH_Actor_2_Actor_3\""));
    }

    #[test]
    fn test_more_hardware_actors_than_actors_fails() {
        let out = TempDir::new().expect("Failed to create temp dir");
        let output = run_dse_models(&["build_bench_application", "2", "3", path_arg(out.path())]);
        assert!(!output.status.success());
        assert!(!out.path().join("Bench_2_3.json").exists());
    }
}

#[cfg(test)]
mod conversion_tests {
    use super::*;

    #[test]
    fn test_to_kgt_writes_graphviz() {
        let out = TempDir::new().expect("Failed to create temp dir");
        assert_success(&run_dse_models(&["build", "zynq", "tc2", path_arg(out.path())]));

        let model = out.path().join("zynq.json");
        let output = run_dse_models(&["to_kgt", path_arg(&model), path_arg(out.path())]);
        assert_success(&output);

        let dot = fs::read_to_string(out.path().join("zynq.dot")).unwrap();
        assert!(dot.starts_with("digraph"));
        assert!(dot.contains("ARM_C0"));
    }

    #[test]
    fn test_to_kgt_missing_input_fails() {
        let out = TempDir::new().expect("Failed to create temp dir");
        let missing = out.path().join("missing.json");
        let output = run_dse_models(&["to_kgt", path_arg(&missing), path_arg(out.path())]);
        assert!(!output.status.success());
    }

    #[test]
    fn test_fpga_transform_writes_intermediate_models() {
        let out = TempDir::new().expect("Failed to create temp dir");
        assert_success(&run_dse_models(&["build", "mpsoc", "tc1", path_arg(out.path())]));
        assert_success(&run_dse_models(&[
            "build_bench_application",
            "3",
            "1",
            path_arg(out.path()),
        ]));

        let platform = out.path().join("mpsoc.json");
        let application = out.path().join("Bench_3_1.json");
        let output = run_dse_models(&[
            "fpga_transform",
            path_arg(&platform),
            path_arg(&application),
        ]);
        assert_success(&output);

        let platform_out = fs::read_to_string(out.path().join("mpsoc_Intermediate.json")).unwrap();
        assert!(platform_out.contains("FPGA_HW_Impl_Actor_1"));
        assert!(!platform_out.contains("FPGA_HW_Impl_Actor_2"));

        let application_out =
            fs::read_to_string(out.path().join("Bench_3_1_Intermediate.json")).unwrap();
        assert!(application_out.contains("FPGA_HW_Instructions_Actor_1"));
    }

    #[test]
    fn test_fpga_transform_without_logic_is_a_no_op() {
        let out = TempDir::new().expect("Failed to create temp dir");
        assert_success(&run_dse_models(&["build", "mm", "tc1", path_arg(out.path())]));
        assert_success(&run_dse_models(&[
            "build_bench_application",
            "2",
            "2",
            path_arg(out.path()),
        ]));

        let output = run_dse_models(&[
            "fpga_transform",
            path_arg(&out.path().join("mm.json")),
            path_arg(&out.path().join("Bench_2_2.json")),
        ]);
        assert_success(&output);
        assert!(!out.path().join("mm_Intermediate.json").exists());
    }
}

#[cfg(test)]
mod solution_tests {
    use super::*;

    #[test]
    fn test_parse_solution_writes_plain_report() {
        let out = TempDir::new().expect("Failed to create temp dir");
        let input = out.path().join("solved.json");
        fs::write(&input, SOLVED_MODEL).unwrap();

        let output = run_dse_models(&["parse_solution", path_arg(&input), path_arg(out.path())]);
        assert_success(&output);

        let report = fs::read_to_string(out.path().join("solved.txt")).unwrap();
        assert!(report.contains("actor1 --> mem1"));
        assert!(report.contains("actor2 --> fpga"));
        assert!(report.contains("cpu_Scheduler: [actor1, actor2]"));
        assert!(report.contains("CH_actor1_actor2: 4 * 16 bits (8 Bytes)"));
        assert!(!report.contains('\x1b'), "Written report should be plain text");
    }

    #[test]
    fn test_parse_solution_rejects_malformed_model() {
        let out = TempDir::new().expect("Failed to create temp dir");
        let input = out.path().join("broken.json");
        fs::write(&input, "{ \"vertices\": [").unwrap();

        let output = run_dse_models(&["parse_solution", path_arg(&input), path_arg(out.path())]);
        assert!(!output.status.success());
        assert!(!out.path().join("broken.txt").exists());
    }
}
