// Stage Ancestry
// Resolves every stage that must conceptually precede a given stage

use super::error::GraphError;
use crate::model::{Execution, Stage, SyntheticStageOwner};

use std::collections::HashSet;
use tracing::debug;

/// Walks requisite edges and parent links of one execution.
///
/// Ancestors are reported in discovery order. A stage reachable over more
/// than one path (a diamond) is reported once per path; callers that need a
/// set must dedupe by id themselves.
pub struct AncestryResolver<'a> {
    execution: &'a Execution,
}

impl<'a> AncestryResolver<'a> {
    pub fn new(execution: &'a Execution) -> Self {
        Self { execution }
    }

    /// The stage itself followed by all of its ancestors
    pub fn ancestors_of(&self, stage: &'a Stage) -> Result<Vec<&'a Stage>, GraphError> {
        let mut ancestors = vec![stage];
        let mut path = vec![stage.id()];
        self.collect_ancestors(stage, &mut path, &mut ancestors)?;

        debug!(
            stage = stage.id(),
            ancestors = ancestors.len() - 1,
            "resolved stage ancestry"
        );

        Ok(ancestors)
    }

    /// The stage's direct parent, if it has one
    pub fn parent_of(&self, stage: &Stage) -> Result<Option<&'a Stage>, GraphError> {
        match stage.parent_stage_id() {
            None => Ok(None),
            Some(parent_id) => self
                .execution
                .stage_by_id(parent_id)
                .map(Some)
                .ok_or_else(|| GraphError::dangling_parent(stage.id(), parent_id)),
        }
    }

    /// Follow parent links up to the stage that has no parent
    pub fn top_level_stage(&self, stage: &'a Stage) -> Result<&'a Stage, GraphError> {
        let mut current = stage;
        let mut visited = vec![current.id()];

        while let Some(parent) = self.parent_of(current)? {
            if visited.contains(&parent.id()) {
                visited.push(parent.id());
                return Err(GraphError::cyclic(&visited));
            }
            visited.push(parent.id());
            current = parent;
        }

        Ok(current)
    }

    fn collect_ancestors(
        &self,
        stage: &'a Stage,
        path: &mut Vec<&'a str>,
        ancestors: &mut Vec<&'a Stage>,
    ) -> Result<(), GraphError> {
        let stages = self.execution.stages();

        if stage.has_requisites() {
            let previous: Vec<&'a Stage> = stages
                .iter()
                .filter(|s| s.ref_id().is_some_and(|r| stage.requires(r)))
                .collect();
            let previous_ids: HashSet<&str> = previous.iter().map(|s| s.id()).collect();

            // Work injected into a predecessor counts as part of that predecessor
            let synthetic = stages.iter().filter(|s| {
                s.parent_stage_id()
                    .is_some_and(|parent_id| previous_ids.contains(parent_id))
            });

            ancestors.extend(previous.iter().copied());
            ancestors.extend(synthetic);

            for predecessor in previous {
                self.descend(predecessor, path, ancestors)?;
            }
        } else if let Some(parent_id) = stage.parent_stage_id() {
            if stage.synthetic_stage_owner() == SyntheticStageOwner::StageAfter {
                ancestors.extend(stages.iter().filter(|s| {
                    s.parent_stage_id() == Some(parent_id)
                        && s.synthetic_stage_owner() == SyntheticStageOwner::StageBefore
                }));
            }

            let parent = self
                .execution
                .stage_by_id(parent_id)
                .ok_or_else(|| GraphError::dangling_parent(stage.id(), parent_id))?;
            ancestors.push(parent);
            self.descend(parent, path, ancestors)?;
        }

        Ok(())
    }

    fn descend(
        &self,
        next: &'a Stage,
        path: &mut Vec<&'a str>,
        ancestors: &mut Vec<&'a Stage>,
    ) -> Result<(), GraphError> {
        if path.contains(&next.id()) {
            let mut cycle = path.clone();
            cycle.push(next.id());
            return Err(GraphError::cyclic(&cycle));
        }

        path.push(next.id());
        self.collect_ancestors(next, path, ancestors)?;
        path.pop();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphErrorKind;
    use crate::model::StageContext;
    use pretty_assertions::assert_eq;

    fn make_stage(execution: &Execution, id: &str, ref_id: &str, requires: &[&str]) -> Stage {
        Stage::new(execution, "wait", None, StageContext::new())
            .with_id(id)
            .with_ref_id(ref_id)
            .with_requisite_stage_ref_ids(requires.iter().copied())
    }

    fn make_child(
        execution: &Execution,
        id: &str,
        parent_id: &str,
        owner: SyntheticStageOwner,
    ) -> Stage {
        Stage::new(execution, "wait", None, StageContext::new())
            .with_id(id)
            .with_parent(parent_id, owner)
    }

    fn build(stages: impl FnOnce(&Execution) -> Vec<Stage>) -> Execution {
        let mut execution = Execution::pipeline("app");
        for stage in stages(&execution) {
            execution.add_stage(stage).unwrap();
        }
        execution
    }

    fn ancestor_ids(execution: &Execution, id: &str) -> Vec<String> {
        let stage = execution.stage_by_id(id).unwrap();
        AncestryResolver::new(execution)
            .ancestors_of(stage)
            .unwrap()
            .iter()
            .map(|s| s.id().to_string())
            .collect()
    }

    #[test]
    fn test_root_stage_has_only_itself() {
        let execution = build(|e| vec![make_stage(e, "a", "1", &[])]);
        assert_eq!(ancestor_ids(&execution, "a"), vec!["a"]);
    }

    #[test]
    fn test_linear_requisites() {
        let execution = build(|e| {
            vec![
                make_stage(e, "a", "1", &[]),
                make_stage(e, "b", "2", &["1"]),
                make_stage(e, "c", "3", &["2"]),
            ]
        });

        assert_eq!(ancestor_ids(&execution, "c"), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_synthetic_children_of_predecessor_included() {
        let execution = build(|e| {
            vec![
                make_stage(e, "a", "1", &[]),
                make_child(e, "a-before", "a", SyntheticStageOwner::StageBefore),
                make_child(e, "a-after", "a", SyntheticStageOwner::StageAfter),
                make_stage(e, "b", "2", &["1"]),
            ]
        });

        assert_eq!(
            ancestor_ids(&execution, "b"),
            vec!["b", "a", "a-before", "a-after"]
        );
    }

    #[test]
    fn test_after_stage_includes_before_siblings_then_parent() {
        let execution = build(|e| {
            vec![
                make_stage(e, "a", "1", &[]),
                make_stage(e, "p", "2", &["1"]),
                make_child(e, "before-1", "p", SyntheticStageOwner::StageBefore),
                make_child(e, "after", "p", SyntheticStageOwner::StageAfter),
                make_child(e, "before-2", "p", SyntheticStageOwner::StageBefore),
            ]
        });

        assert_eq!(
            ancestor_ids(&execution, "after"),
            vec!["after", "before-1", "before-2", "p", "a"]
        );
    }

    #[test]
    fn test_before_stage_skips_siblings() {
        let execution = build(|e| {
            vec![
                make_stage(e, "p", "1", &[]),
                make_child(e, "before-1", "p", SyntheticStageOwner::StageBefore),
                make_child(e, "before-2", "p", SyntheticStageOwner::StageBefore),
            ]
        });

        assert_eq!(ancestor_ids(&execution, "before-2"), vec!["before-2", "p"]);
    }

    #[test]
    fn test_diamond_keeps_duplicates() {
        let execution = build(|e| {
            vec![
                make_stage(e, "a", "1", &[]),
                make_stage(e, "b", "2", &["1"]),
                make_stage(e, "c", "3", &["1"]),
                make_stage(e, "d", "4", &["2", "3"]),
            ]
        });

        assert_eq!(ancestor_ids(&execution, "d"), vec!["d", "b", "c", "a", "a"]);
    }

    #[test]
    fn test_dangling_parent() {
        let execution = build(|e| {
            vec![make_child(e, "orphan", "missing", SyntheticStageOwner::StageBefore)]
        });
        let stage = execution.stage_by_id("orphan").unwrap();
        let resolver = AncestryResolver::new(&execution);

        let err = resolver.ancestors_of(stage).unwrap_err();
        assert_eq!(err.kind, GraphErrorKind::DanglingParent);
        assert!(err.message.contains("missing"));

        let err = resolver.top_level_stage(stage).unwrap_err();
        assert_eq!(err.kind, GraphErrorKind::DanglingParent);
    }

    #[test]
    fn test_requisite_cycle_is_an_error() {
        let execution = build(|e| {
            vec![
                make_stage(e, "a", "1", &["2"]),
                make_stage(e, "b", "2", &["1"]),
            ]
        });
        let stage = execution.stage_by_id("a").unwrap();

        let err = AncestryResolver::new(&execution)
            .ancestors_of(stage)
            .unwrap_err();
        assert_eq!(err.kind, GraphErrorKind::CyclicDependency);
    }

    #[test]
    fn test_top_level_stage() {
        let execution = build(|e| {
            vec![
                make_stage(e, "root", "1", &[]),
                make_child(e, "child", "root", SyntheticStageOwner::StageBefore),
                make_child(e, "grandchild", "child", SyntheticStageOwner::StageAfter),
            ]
        });
        let resolver = AncestryResolver::new(&execution);

        let grandchild = execution.stage_by_id("grandchild").unwrap();
        assert_eq!(resolver.top_level_stage(grandchild).unwrap().id(), "root");

        let root = execution.stage_by_id("root").unwrap();
        assert_eq!(resolver.top_level_stage(root).unwrap().id(), "root");
        assert!(resolver.parent_of(root).unwrap().is_none());
        assert_eq!(
            resolver.parent_of(grandchild).unwrap().map(|s| s.id()),
            Some("child")
        );
    }

    #[test]
    fn test_parent_cycle_is_an_error() {
        let execution = build(|e| {
            vec![
                make_child(e, "x", "y", SyntheticStageOwner::StageBefore),
                make_child(e, "y", "x", SyntheticStageOwner::StageBefore),
            ]
        });
        let stage = execution.stage_by_id("x").unwrap();
        let resolver = AncestryResolver::new(&execution);

        let err = resolver.top_level_stage(stage).unwrap_err();
        assert_eq!(err.kind, GraphErrorKind::CyclicDependency);

        let err = resolver.ancestors_of(stage).unwrap_err();
        assert_eq!(err.kind, GraphErrorKind::CyclicDependency);
    }
}
