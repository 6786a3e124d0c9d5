use serde::Serialize;

use super::{load_config, EXECUTION_ERROR, SUCCESS};
use crate::cli::CheckArgs;
use crate::logic::dataset::DatasetSummary;
use crate::logic::features::LayoutInfo;
use crate::logic::setup;

#[derive(Serialize)]
struct CheckReport {
    dataset: DatasetSummary,
    layout: LayoutInfo,
    classifiers: Vec<String>,
}

pub fn execute(args: CheckArgs) -> i32 {
    match run(&args) {
        Ok(report) => {
            if args.json {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        return EXECUTION_ERROR;
                    }
                }
            } else {
                println!("Dataset:     {}", report.dataset);
                println!(
                    "Layout:      v{} hash={:#010x} width={}",
                    report.layout.version, report.layout.hash, report.layout.feature_count
                );
                println!("Classifiers: {}", report.classifiers.join(", "));
                println!("All startup checks passed");
            }
            SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXECUTION_ERROR
        }
    }
}

fn run(args: &CheckArgs) -> anyhow::Result<CheckReport> {
    let config = load_config(&args.source)?;
    let prepared = setup::prepare(&config)?;

    Ok(CheckReport {
        dataset: prepared.summary,
        layout: prepared.layout.info(),
        classifiers: prepared.classifiers.iter().map(|c| c.name().to_string()).collect(),
    })
}
