pub mod id;
pub mod node;
pub mod dag;

pub use id::CommitId;
pub use node::CommitNode;
pub use dag::Dag;
