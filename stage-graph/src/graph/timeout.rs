// Inherited Stage Timeouts
// A stage without its own override inherits the nearest parent's

use super::ancestry::AncestryResolver;
use super::error::GraphError;
use crate::model::{Execution, Stage};

use std::time::Duration;

pub struct TimeoutResolver<'a> {
    ancestry: AncestryResolver<'a>,
}

impl<'a> TimeoutResolver<'a> {
    pub fn new(execution: &'a Execution) -> Self {
        Self {
            ancestry: AncestryResolver::new(execution),
        }
    }

    /// Nearest stage on the parent chain (starting with `stage`) that carries
    /// a timeout override. Requisite edges are not followed.
    pub fn effective_timeout_owner(&self, stage: &'a Stage) -> Result<Option<&'a Stage>, GraphError> {
        let mut current = stage;
        let mut visited = vec![current.id()];

        loop {
            if current.timeout().is_some() {
                return Ok(Some(current));
            }

            let Some(parent) = self.ancestry.parent_of(current)? else {
                return Ok(None);
            };

            if visited.contains(&parent.id()) {
                visited.push(parent.id());
                return Err(GraphError::cyclic(&visited));
            }
            visited.push(parent.id());
            current = parent;
        }
    }

    /// The owner's timeout; negative overrides count as zero
    pub fn effective_timeout(&self, stage: &'a Stage) -> Result<Option<Duration>, GraphError> {
        Ok(self
            .effective_timeout_owner(stage)?
            .and_then(Stage::timeout)
            .map(|ms| Duration::from_millis(ms.max(0) as u64)))
    }
}
