//! Per-dialect XML marshal/unmarshal for the SAP ADT protocol.
//!
//! ADT does not follow one schema; every resource has its own XML
//! dialect and its own namespace. Rather than a single generic decoder,
//! this crate provides one marshal/unmarshal pair per dialect, all
//! sharing the namespace-stripping preprocessing step in [`strip`].

pub mod activation;
pub mod cds;
pub mod create;
pub mod error;
pub mod exception;
pub mod lock;
pub mod query;
pub mod strip;
pub mod unittest;
pub mod whereused;

pub use error::{XmlError, XmlResult};
