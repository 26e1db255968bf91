// Stage Graph Algorithms
// Ordering, ancestry, reverse edges and inherited timeouts over one execution

pub mod ancestry;
pub mod downstream;
pub mod error;
pub mod sort;
pub mod timeout;

// Re-export key types
pub use ancestry::AncestryResolver;
pub use downstream::DownstreamResolver;
pub use error::{GraphError, GraphErrorKind};
pub use sort::TopologicalSorter;
pub use timeout::TimeoutResolver;
