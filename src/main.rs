use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use batch_consolidator::consolidation::{ApplyRequest, BatchRequest, StylingMapping, UserAnswers};
use batch_consolidator::{BatchConsolidator, ConsolidationConfig};
use serde::de::DeserializeOwned;

const USAGE: &str = "usage:
  batch-consolidator consolidate <request.json>
  batch-consolidator apply <styling_mappings.json> <answers.json>";

fn read_json<T: DeserializeOwned>(path: &str) -> anyhow::Result<T> {
    let raw = fs::read_to_string(Path::new(path)).with_context(|| format!("failed to read {path}"))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {path}"))
}

fn run(args: &[String]) -> anyhow::Result<()> {
    let config = ConsolidationConfig::from_env();
    let consolidator = BatchConsolidator::from_config(&config)?;

    let output = match args {
        [command, request] if command == "consolidate" => {
            let request: BatchRequest = read_json(request)?;
            let result = consolidator.consolidate_request(&request)?;
            serde_json::to_string_pretty(&result)?
        }
        [command, mappings, answers] if command == "apply" => {
            let request = ApplyRequest {
                styling_mappings: read_json::<StylingMapping>(mappings)?,
                answers: read_json::<UserAnswers>(answers)?,
            };
            let applied = consolidator.apply_request(&request)?;
            serde_json::to_string_pretty(&applied)?
        }
        _ => bail!("{USAGE}"),
    };

    println!("{output}");
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = run(&args) {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}
