//! OntoView server — REST surface over a visualization session.

pub mod dataset;
pub mod routes;
pub mod state;

pub use dataset::Dataset;
pub use state::{ChatHandler, ChatReply, LabelSearch, SearchHandler, Session};
