use crate::output;

use std::path::PathBuf;

use clap::Args;
use color_eyre::Result;

use stage_graph::{AncestryResolver, TopologicalSorter};

/// Validate the stage graph of an execution file
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the execution file (JSON, or YAML with a .yml/.yaml extension)
    pub execution: PathBuf,
}

pub fn execute(args: ValidateArgs) -> Result<()> {
    let path = &args.execution;

    // Step 1: Load the definition
    output::status("Validating", &format!("{}", path.display()));
    let execution = super::load_execution(path)?;

    let total = execution.stages().len();
    let synthetic = execution
        .stages()
        .iter()
        .filter(|s| s.parent_stage_id().is_some())
        .count();
    output::check(&format!(
        "Structure: {} stages ({} top-level, {} synthetic)",
        total,
        total - synthetic,
        synthetic
    ));

    // Step 2: Top-level ordering
    match TopologicalSorter::layers(execution.stages()) {
        Ok(layers) => {
            output::check(&format!("Ordering: {} parallel layer(s)", layers.len()));
        }
        Err(e) => {
            output::error("stage relationships cannot be ordered:");
            for edge in &e.edges {
                output::error(&format!("  - {}", edge));
            }
            std::process::exit(1);
        }
    }

    // Step 3: Parent chains and ancestry
    let resolver = AncestryResolver::new(&execution);
    let mut failures = 0;
    for stage in execution.stages() {
        let result = resolver
            .top_level_stage(stage)
            .and_then(|_| resolver.ancestors_of(stage));
        if let Err(e) = result {
            output::failure(&format!("{} ({}): {}", stage.name(), stage.id(), e));
            failures += 1;
        }
    }

    if failures > 0 {
        output::error(&format!("{} stage(s) with broken relationships", failures));
        std::process::exit(1);
    }
    output::check("Parent chains and ancestry resolve");

    println!();
    output::success("Execution graph is valid");

    Ok(())
}
