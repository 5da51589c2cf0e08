//! Job-portal service: application intake, resume uploads, and recruiter
//! review workflows.
//!
//! The crate is organized around two pillars. `storage` holds the
//! validate-then-persist upload pipeline (file constraint policies, the
//! upload gate, and the durable object store capability). `workflows`
//! holds the application lifecycle: submission, the status transition
//! workflow, and the recruiter review composition.

pub mod config;
pub mod error;
pub mod storage;
pub mod telemetry;
pub mod workflows;
