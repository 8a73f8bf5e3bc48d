pub mod refs;

pub use refs::{HeadSource, LabelIndex, RefKind, Reference};
