//! Value types shared by the engine interface and snapshots.

pub mod tags;
pub mod output_type;
pub mod dependency;

pub use tags::{TagValue, Tags};
pub use output_type::TypeDescriptor;
pub use dependency::{DependencyKind, InputDependency};
