//! tsbundle
//!
//! Builds the project described by the nearest tsconfig.json.

use std::process;

use anyhow::Context;
use ts::file_system::NodeJSFileSystem;
use tsbundle_cli::cli::{command, settings_from_matches};
use tsbundle_cli::logging::init_logging;
use tsbundle_cli::perform_build;

fn main() {
    let matches = command().get_matches();
    let (settings, level) = settings_from_matches(&matches);
    init_logging(level);

    if let Err(err) = run(settings) {
        eprintln!("Error: {:#}", err);
        process::exit(1);
    }
}

fn run(settings: tsbundle_cli::BuildSettings) -> anyhow::Result<()> {
    let fs = NodeJSFileSystem::new();
    let outcome = perform_build(&fs, settings).context("tsbundle failed")?;
    println!(
        "Built {} file(s) into {}",
        outcome.output_files.len(),
        outcome.config.out_dir.display()
    );
    Ok(())
}
