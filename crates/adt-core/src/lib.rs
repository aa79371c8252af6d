//! Object catalogue, atomic ADT operations, workflow composition, and
//! in-process lock bookkeeping.

pub mod catalogue;
pub mod error;
pub mod locks;
pub mod ops;
#[cfg(test)]
mod testutil;
pub mod workflow;

pub use catalogue::{descriptor, kind_from_type_code, ObjectKind, ObjectRef, SourceSection};
pub use error::{CoreError, CoreResult};
pub use ops::{ActivationOutcome, AtomicOps, CatalogueEntry, CdsDependencyLevel};
pub use workflow::WorkflowComposer;
