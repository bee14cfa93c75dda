//! Mosaic builder service library.
//!
//! Exposes the pipeline and the cloud-model client so integration tests can
//! drive them with in-process collaborators.

pub mod cloud;
pub mod pipeline;
