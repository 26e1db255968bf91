use crate::output;

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use color_eyre::Result;

use stage_graph::{
    AncestryResolver, DownstreamResolver, Execution, Stage, TimeoutResolver,
};

/// Show how one stage relates to the rest of its execution
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to the execution file
    pub execution: PathBuf,

    /// Stage id, or refId of a top-level stage
    pub stage: String,
}

struct StageReport<'a> {
    ancestors: Vec<&'a Stage>,
    downstream: Vec<&'a Stage>,
    top_level: &'a Stage,
    timeout_owner: Option<&'a Stage>,
    timeout: Option<Duration>,
}

fn describe<'a>(execution: &'a Execution, stage: &'a Stage) -> stage_graph::Result<StageReport<'a>> {
    let ancestry = AncestryResolver::new(execution);
    let timeouts = TimeoutResolver::new(execution);

    Ok(StageReport {
        ancestors: ancestry.ancestors_of(stage)?.into_iter().skip(1).collect(),
        downstream: DownstreamResolver::new(execution).downstream_of(stage),
        top_level: ancestry.top_level_stage(stage)?,
        timeout_owner: timeouts.effective_timeout_owner(stage)?,
        timeout: timeouts.effective_timeout(stage)?,
    })
}

pub fn execute(args: InspectArgs) -> Result<()> {
    let execution = super::load_execution(&args.execution)?;

    let Some(stage) = execution
        .stage_by_id(&args.stage)
        .or_else(|| execution.stage_by_ref_id(&args.stage))
    else {
        color_eyre::eyre::bail!("No stage with id or refId '{}'", args.stage);
    };

    let report = describe(&execution, stage)?;

    output::header(&format!("{} ({})", stage.name(), stage.stage_type()));
    output::info(&format!("id: {}", stage.id()));
    output::info(&format!("status: {:?}", stage.status()));
    output::info(&format!("join: {}", stage.is_join()));
    if report.top_level != stage {
        output::info(&format!("top-level stage: {}", report.top_level.name()));
    }

    match (report.timeout_owner, report.timeout) {
        (Some(owner), Some(timeout)) => output::info(&format!(
            "timeout: {}ms (from {})",
            timeout.as_millis(),
            owner.name()
        )),
        _ => output::info("timeout: none"),
    }

    output::header(&format!("Ancestors ({})", report.ancestors.len()));
    for ancestor in &report.ancestors {
        output::stage_line(2, ancestor);
    }

    output::header(&format!("Downstream ({})", report.downstream.len()));
    for downstream in &report.downstream {
        output::stage_line(2, downstream);
    }

    Ok(())
}
