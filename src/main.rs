use std::env;
use std::fs;
use std::path;
use std::process::ExitCode;

use log::error;

use fraghub::filters::DeletionReason;
use fraghub::prelude::*;
use fraghub::{FilterConfig, ReferenceData};
use fraghub::scheduler::SchedulerConfig;

fn load_filters(path: &path::Path) -> Result<FilterConfig, Box<dyn std::error::Error>> {
    let handle = fs::File::open(path)?;
    let config: FilterConfig = serde_json::from_reader(handle)?;
    config.validate()?;
    Ok(config)
}

fn run(input: &path::Path, filters: FilterConfig) -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = SpectrumPipeline::new(
        ReferenceData::builtin().into(),
        filters,
        SchedulerConfig::default(),
    )?;
    let output = pipeline.process_path(input, &LogProgress::default())?;

    println!("Path: {}", input.display());
    println!("Kept: {}", output.records.len());
    println!("Unparsed: {}", output.unparsed);
    println!("Deleted: {}", output.deletions.len());
    for reason in DeletionReason::ALL {
        let n = output.deletions.count(reason);
        if n > 0 {
            println!("  {n}\t{reason}");
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args: Vec<String> = env::args().collect();
    let input = match args.get(1) {
        Some(p) => path::PathBuf::from(p),
        None => path::PathBuf::from("./test/data/small.msp"),
    };
    let filters = match args.get(2) {
        Some(p) => match load_filters(path::Path::new(p)) {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to read filter parameters from {p}: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => FilterConfig::default(),
    };
    match run(&input, filters) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Failed to process {}: {e}", input.display());
            ExitCode::FAILURE
        }
    }
}
