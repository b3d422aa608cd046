//! # Avatar Domain
//!
//! Shared domain objects and types for the avatar media pipeline.
//!
//! This crate contains the contract types that sit between the media
//! services (speech generation, lip-sync compositing) and whatever web
//! layer calls into them: the compute backend enum, the error taxonomy,
//! media artifact descriptors, and the uniform service status snapshot.

pub mod backend;
pub mod error;
pub mod media;
pub mod status;

// Re-export core types
pub use backend::Backend;
pub use error::{ErrorKind, MediaError, Result};
pub use media::{MediaArtifact, MediaKind};
pub use status::{ServiceHealth, ServiceStatus};
