//! The upload pipeline: constraint policies, the validate-then-persist
//! gate, and the durable object store capability it writes through.

pub mod gate;
pub mod policy;
pub mod router;
pub mod store;

pub use gate::{UploadError, UploadGate, UploadedFile};
pub use policy::{FileConstraintPolicy, FileDescriptor, PolicyViolation};
pub use router::{upload_router, UploadGates};
pub use store::{ContentKind, LocalDiskStore, ObjectStore, RetrievalHandle, StorageError};
