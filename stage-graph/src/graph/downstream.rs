// Direct Stage Dependents
// Reverse lookups over requisiteStageRefIds

use crate::model::{Execution, Stage};

pub struct DownstreamResolver<'a> {
    execution: &'a Execution,
}

impl<'a> DownstreamResolver<'a> {
    pub fn new(execution: &'a Execution) -> Self {
        Self { execution }
    }

    /// Stages that list this stage's refId as a requisite
    pub fn downstream_of(&self, stage: &Stage) -> Vec<&'a Stage> {
        let Some(ref_id) = stage.ref_id() else {
            return Vec::new();
        };

        self.execution
            .stages()
            .iter()
            .filter(|s| s.requires(ref_id))
            .collect()
    }

    /// Stages whose refId this stage lists as a requisite
    pub fn upstream_of(&self, stage: &Stage) -> Vec<&'a Stage> {
        self.execution
            .stages()
            .iter()
            .filter(|s| s.ref_id().is_some_and(|r| stage.requires(r)))
            .collect()
    }

    /// Whether every direct requisite finished in a state that lets this stage run
    pub fn all_upstream_complete(&self, stage: &Stage) -> bool {
        self.upstream_of(stage)
            .iter()
            .all(|s| s.status().is_successful())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExecutionStatus, StageContext};
    use pretty_assertions::assert_eq;

    fn build(definitions: &[(&str, Option<&str>, Vec<&str>)]) -> Execution {
        let mut execution = Execution::pipeline("app");
        for (id, ref_id, requires) in definitions {
            let mut stage = Stage::new(&execution, "wait", None, StageContext::new())
                .with_id(*id)
                .with_requisite_stage_ref_ids(requires.iter().copied());
            if let Some(ref_id) = ref_id {
                stage = stage.with_ref_id(*ref_id);
            }
            execution.add_stage(stage).unwrap();
        }
        execution
    }

    fn ids(stages: &[&Stage]) -> Vec<String> {
        stages.iter().map(|s| s.id().to_string()).collect()
    }

    #[test]
    fn test_downstream_of() {
        let execution = build(&[
            ("a", Some("1"), vec![]),
            ("b", Some("2"), vec!["1"]),
            ("c", Some("3"), vec!["1", "2"]),
            ("d", Some("4"), vec!["3"]),
        ]);
        let resolver = DownstreamResolver::new(&execution);

        let a = execution.stage_by_id("a").unwrap();
        assert_eq!(ids(&resolver.downstream_of(a)), vec!["b", "c"]);

        let d = execution.stage_by_id("d").unwrap();
        assert!(resolver.downstream_of(d).is_empty());
    }

    #[test]
    fn test_stage_without_ref_id_has_no_downstream() {
        let execution = build(&[("a", None, vec![]), ("b", Some("2"), vec!["1"])]);
        let a = execution.stage_by_id("a").unwrap();

        assert!(DownstreamResolver::new(&execution).downstream_of(a).is_empty());
    }

    #[test]
    fn test_upstream_is_inverse_of_downstream() {
        let execution = build(&[
            ("a", Some("1"), vec![]),
            ("b", Some("2"), vec!["1"]),
            ("c", Some("3"), vec!["1", "2"]),
        ]);
        let resolver = DownstreamResolver::new(&execution);

        for stage in execution.stages() {
            for downstream in resolver.downstream_of(stage) {
                assert!(resolver.upstream_of(downstream).contains(&stage));
            }
            for upstream in resolver.upstream_of(stage) {
                assert!(resolver.downstream_of(upstream).contains(&stage));
            }
        }

        let c = execution.stage_by_id("c").unwrap();
        assert_eq!(ids(&resolver.upstream_of(c)), vec!["a", "b"]);
    }

    #[test]
    fn test_all_upstream_complete() {
        let mut execution = build(&[
            ("a", Some("1"), vec![]),
            ("b", Some("2"), vec![]),
            ("c", Some("3"), vec!["1", "2"]),
        ]);
        execution
            .stage_by_id_mut("a")
            .unwrap()
            .set_status(ExecutionStatus::Succeeded);
        execution
            .stage_by_id_mut("b")
            .unwrap()
            .set_status(ExecutionStatus::Running);

        {
            let c = execution.stage_by_id("c").unwrap();
            assert!(!DownstreamResolver::new(&execution).all_upstream_complete(c));
        }

        execution
            .stage_by_id_mut("b")
            .unwrap()
            .set_status(ExecutionStatus::Skipped);
        let c = execution.stage_by_id("c").unwrap();
        assert!(DownstreamResolver::new(&execution).all_upstream_complete(c));

        let a = execution.stage_by_id("a").unwrap();
        assert!(DownstreamResolver::new(&execution).all_upstream_complete(a));
    }
}
