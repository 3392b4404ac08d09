//! Policy Document Service Layer
//!
//! This module provides the service interface that encapsulates document assembly so
//! the CLI and library callers share one entry point. The service only holds the hasher
//! used to derive document identifiers; every build is independent.

use crate::hashing::{HashAlgorithm, PolicyHasher};

/// Main service struct that assembles policy documents
pub struct PolicyDocumentService {
    pub(crate) hasher: Box<dyn PolicyHasher + Send + Sync>,
}

impl PolicyDocumentService {
    /// Create a service using the default CRC-32 identifier
    #[must_use]
    pub fn new() -> Self {
        Self::with_algorithm(HashAlgorithm::default())
    }

    #[must_use]
    pub fn with_algorithm(algorithm: HashAlgorithm) -> Self {
        Self {
            hasher: algorithm.hasher(),
        }
    }

    /// Create a service with a caller-supplied hasher
    #[must_use]
    pub fn with_hasher(hasher: impl PolicyHasher + Send + Sync + 'static) -> Self {
        Self {
            hasher: Box::new(hasher),
        }
    }

    // assemble() and build_document() are implemented in assemble.rs
}

impl Default for PolicyDocumentService {
    fn default() -> Self {
        Self::new()
    }
}
