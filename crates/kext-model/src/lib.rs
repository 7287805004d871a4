//! Lazily navigable model of the types on a classpath.
//!
//! [`TypeGraph`] turns a [`kext_classpath::ByteSource`] into [`TypeNode`]s and
//! [`FunctionNode`]s whose parameter and return types are [`TypeUsage`]s,
//! already translated to Kotlin source names.

mod assemble;
mod error;
mod graph;
mod markers;
pub mod names;
mod node;
mod param_names;
mod usage;

pub use crate::error::ModelError;
pub use crate::graph::{AllTypes, GraphOptions, TypeGraph};
pub use crate::markers::{Annotated, Marker, Markers};
pub use crate::node::{FunctionNode, Parameter, TypeNode};
pub use crate::param_names::{
    parameter_names_key, NoParameterNames, ParameterNameIndex, ParameterNames,
};
pub use crate::usage::{TypeUsage, UsageKind, Variance};
