mod cli;

use std::fs;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use log::info;

use cli::Args;
use posegen::gfx::geometry::shapegen::ExtrusionShapeBuilder;
use posegen::gfx::rendering::SilhouetteRenderer;
use posegen::gfx::scene::{ObjImporter, Scene};
use posegen::{BatchDriver, BatchReport};

fn main() -> ExitCode {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };

    match run(&args) {
        Ok(report) => {
            info!("Batch finished: {}", report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("posegen: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Fails only on configuration problems; unit failures end up in the report.
fn run(args: &Args) -> Result<BatchReport> {
    let (config, enumerator) = args.batch()?;
    fs::create_dir_all(&config.output_dir).with_context(|| {
        format!("failed to create output directory {}", config.output_dir.display())
    })?;

    info!(
        "Rendering {} units into {} ({} steps of {}°, {} strategy)",
        enumerator.unit_count(),
        config.output_dir.display(),
        config.step_count,
        args.degrees,
        config.strategy
    );

    let mut scene = Scene::new();
    let mut shapes = ExtrusionShapeBuilder::default();
    let mut importer = ObjImporter::new();
    let mut renderer = SilhouetteRenderer::new();
    let report = BatchDriver::new(&mut scene, &mut shapes, &mut importer, &mut renderer, &config)
        .run(&enumerator);
    Ok(report)
}
