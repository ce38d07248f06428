//! OntoView Store — in-memory indexes behind the visualization server.
//!
//! Four stores cover the supported shapes of data: pairwise graphs,
//! hypergraphs, flat ordered lists and unrelated node sets. Each is built
//! once from caller records and answers sampling, lookup and pagination
//! queries without mutating its index.

pub mod extract;
pub mod graph;
pub mod highlight;
pub mod hypergraph;
pub mod ident;
pub mod list;
pub mod node;
pub mod storage;
pub mod types;

pub use extract::Record;
pub use graph::GraphStorage;
pub use hypergraph::HypergraphStorage;
pub use list::ListStorage;
pub use node::NodeStorage;
pub use storage::{Matches, Sample, Stats, Storage, StorageKind};
pub use types::*;
