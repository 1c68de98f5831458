use anyhow::Result;
use clap::Parser;
use dse_models::{
    CLIArguments, build_bench_application_main, build_main, fpga_transform_main,
    parse_solution_main, to_kgt_main,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = match CLIArguments::try_parse() {
        Ok(args) => args,
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    };

    match args {
        CLIArguments::Build(args) => build_main(args),
        CLIArguments::ToKgt(args) => to_kgt_main(args),
        CLIArguments::ParseSolution(args) => parse_solution_main(args),
        CLIArguments::BuildBenchApplication(args) => build_bench_application_main(args),
        CLIArguments::FpgaTransform(args) => fpga_transform_main(args),
    }
}
