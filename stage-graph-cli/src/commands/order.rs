use crate::output;

use std::path::PathBuf;

use clap::Args;
use color_eyre::Result;

use stage_graph::TopologicalSorter;

/// Print top-level stages in execution order
#[derive(Args, Debug)]
pub struct OrderArgs {
    /// Path to the execution file
    pub execution: PathBuf,

    /// Group stages into layers that can run in parallel
    #[arg(long)]
    pub layers: bool,
}

pub fn execute(args: OrderArgs) -> Result<()> {
    let execution = super::load_execution(&args.execution)?;
    let layers = TopologicalSorter::layers(execution.stages())?;

    if args.layers {
        for (i, layer) in layers.iter().enumerate() {
            output::header(&format!("Layer {} ({} stages)", i + 1, layer.len()));
            for stage in layer {
                output::stage_line(2, stage);
            }
        }
    } else {
        for stage in layers.iter().flatten() {
            output::stage_line(0, stage);
        }
    }

    Ok(())
}
