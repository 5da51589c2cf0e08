//! Business workflows exposed by the service.

pub mod applications;
