// Topological Stage Sorting
// Orders top-level stages by their refId / requisiteStageRefIds edges

use super::error::GraphError;
use crate::model::Stage;

use std::collections::HashSet;
use tracing::debug;

/// Orders top-level stages so every stage follows all stages it requires.
///
/// Stages with a parent are left out; they run as part of their parent.
pub struct TopologicalSorter;

impl TopologicalSorter {
    /// Stages in execution order
    pub fn sort(stages: &[Stage]) -> Result<Vec<&Stage>, GraphError> {
        Ok(Self::layers(stages)?.into_iter().flatten().collect())
    }

    /// Stages grouped by ready layer. Every stage in a layer has all of its
    /// requisites in earlier layers, so a layer can run in parallel.
    ///
    /// Within a layer stages keep the order in which they were given.
    pub fn layers(stages: &[Stage]) -> Result<Vec<Vec<&Stage>>, GraphError> {
        let mut unsorted: Vec<&Stage> = stages
            .iter()
            .filter(|s| s.parent_stage_id().is_none())
            .collect();
        let mut ref_ids: HashSet<&str> = HashSet::new();
        let mut layers: Vec<Vec<&Stage>> = Vec::new();

        while !unsorted.is_empty() {
            let (sortable, blocked): (Vec<&Stage>, Vec<&Stage>) = unsorted
                .into_iter()
                .partition(|s| s.requisites().all(|r| ref_ids.contains(r)));

            if sortable.is_empty() {
                return Err(GraphError::invalid_relationships(relationship_edges(stages)));
            }

            ref_ids.extend(sortable.iter().filter_map(|s| s.ref_id()));
            layers.push(sortable);
            unsorted = blocked;
        }

        debug!(
            stages = layers.iter().map(Vec::len).sum::<usize>(),
            layers = layers.len(),
            "sorted top-level stages"
        );

        Ok(layers)
    }
}

/// One `[requisites]->refId` entry per stage
fn relationship_edges(stages: &[Stage]) -> Vec<String> {
    stages
        .iter()
        .map(|s| {
            format!(
                "[{}]->{}",
                s.requisites().collect::<Vec<_>>().join(", "),
                s.ref_id().unwrap_or("?")
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphErrorKind;
    use crate::model::{Execution, StageContext, SyntheticStageOwner};
    use pretty_assertions::assert_eq;

    fn make_stage(execution: &Execution, ref_id: &str, requires: &[&str]) -> Stage {
        Stage::new(execution, "wait", None, StageContext::new())
            .with_id(format!("stage-{}", ref_id))
            .with_ref_id(ref_id)
            .with_requisite_stage_ref_ids(requires.iter().copied())
    }

    fn ref_ids<'a>(stages: &[&'a Stage]) -> Vec<&'a str> {
        stages.iter().filter_map(|s| s.ref_id()).collect()
    }

    #[test]
    fn test_simple_linear_stages() {
        let execution = Execution::pipeline("app");
        let stages = vec![
            make_stage(&execution, "3", &["2"]),
            make_stage(&execution, "1", &[]),
            make_stage(&execution, "2", &["1"]),
        ];

        let order = TopologicalSorter::sort(&stages).unwrap();
        assert_eq!(ref_ids(&order), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_parallel_stages() {
        let execution = Execution::pipeline("app");
        let stages = vec![
            make_stage(&execution, "build", &[]),
            make_stage(&execution, "unit", &["build"]),
            make_stage(&execution, "integration", &["build"]),
            make_stage(&execution, "deploy", &["unit", "integration"]),
        ];

        let layers = TopologicalSorter::layers(&stages).unwrap();
        assert_eq!(layers.len(), 3);
        assert_eq!(ref_ids(&layers[0]), vec!["build"]);
        assert_eq!(ref_ids(&layers[1]), vec!["unit", "integration"]);
        assert_eq!(ref_ids(&layers[2]), vec!["deploy"]);

        let order = TopologicalSorter::sort(&stages).unwrap();
        let flattened: Vec<&Stage> = layers.into_iter().flatten().collect();
        assert_eq!(order, flattened);
    }

    #[test]
    fn test_independent_stages_keep_input_order() {
        let execution = Execution::pipeline("app");
        let stages = vec![
            make_stage(&execution, "b", &[]),
            make_stage(&execution, "a", &[]),
            make_stage(&execution, "c", &[]),
        ];

        let layers = TopologicalSorter::layers(&stages).unwrap();
        assert_eq!(layers.len(), 1);
        assert_eq!(ref_ids(&layers[0]), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_cycle_detection() {
        let execution = Execution::pipeline("app");
        let stages = vec![
            make_stage(&execution, "A", &["B"]),
            make_stage(&execution, "B", &["A"]),
        ];

        let err = TopologicalSorter::sort(&stages).unwrap_err();
        assert_eq!(err.kind, GraphErrorKind::InvalidRelationships);
        assert_eq!(err.edges, vec!["[B]->A", "[A]->B"]);
    }

    #[test]
    fn test_unknown_dependency() {
        let execution = Execution::pipeline("app");
        let stages = vec![
            make_stage(&execution, "1", &[]),
            make_stage(&execution, "2", &["X"]),
        ];

        let err = TopologicalSorter::sort(&stages).unwrap_err();
        assert_eq!(err.kind, GraphErrorKind::InvalidRelationships);
        assert!(err.message.contains("[X]->2"));
        assert!(err.message.contains("[]->1"));
    }

    #[test]
    fn test_child_stages_are_not_sorted() {
        let execution = Execution::pipeline("app");
        let parent = make_stage(&execution, "1", &[]);
        let child = Stage::new(&execution, "wait", None, StageContext::new())
            .with_ref_id("1<1")
            .with_requisite_stage_ref_ids(["never-resolved"])
            .with_parent(parent.id(), SyntheticStageOwner::StageBefore);
        let stages = vec![child, parent, make_stage(&execution, "2", &["1"])];

        let order = TopologicalSorter::sort(&stages).unwrap();
        assert_eq!(ref_ids(&order), vec!["1", "2"]);
    }

    #[test]
    fn test_empty_input() {
        let order = TopologicalSorter::sort(&[]).unwrap();
        assert!(order.is_empty());
    }
}
