//! # Cache
//!
//! Expiring result cache and the artifact handles it stores.

pub mod artifact;
pub mod result_cache;

pub use artifact::{ArtifactRef, ArtifactStore, FsArtifactStore};
pub use result_cache::{CacheConfig, CacheKey, ResultCache};
