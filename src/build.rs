//! The `build` command: write a catalog platform and application as design models.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use crate::{
    application::catalog::ApplicationKind,
    codec,
    model::summary::write_summary,
    platform::catalog::PlatformKind,
};

#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Platform to build
    #[clap(value_enum)]
    pub platform: PlatformKind,

    /// Application to build
    #[clap(value_enum)]
    pub application: ApplicationKind,

    /// Output directory
    pub out_dir: PathBuf,
}

pub fn build_main(args: BuildArgs) -> Result<()> {
    let BuildArgs {
        platform,
        application,
        out_dir,
    } = args;

    let platform_graph = platform
        .build()
        .with_context(|| format!("Failed to build platform {}", platform))?;
    let application_graph = application
        .build()
        .with_context(|| format!("Failed to build application {}", application))?;

    let mut stdout = std::io::stdout();
    write_summary(&platform_graph, &mut stdout)?;
    write_summary(&application_graph, &mut stdout)?;

    for (graph, name) in [
        (&platform_graph, platform.to_string()),
        (&application_graph, application.to_string()),
    ] {
        let path = out_dir.join(format!("{}.{}", name, codec::MODEL_EXT));
        codec::save(graph, &path)?;
        info!("Wrote '{}'", path.display());
    }

    Ok(())
}
