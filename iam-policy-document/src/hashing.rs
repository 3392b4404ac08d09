//! Stable identifiers derived from the canonical policy text

use aws_lc_rs::digest;

/// Computes an identifier from policy JSON text. Equal text must give equal output.
pub trait PolicyHasher {
    fn hash(&self, text: &str) -> String;
}

/// CRC-32 (IEEE) of the text in decimal, the identifier format Terraform uses for
/// data sources
#[derive(Debug, Clone, Copy, Default)]
pub struct Crc32Hasher;

impl PolicyHasher for Crc32Hasher {
    fn hash(&self, text: &str) -> String {
        crc32fast::hash(text.as_bytes()).to_string()
    }
}

/// Lowercase hex SHA-256 of the text
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl PolicyHasher for Sha256Hasher {
    fn hash(&self, text: &str) -> String {
        hex::encode(digest::digest(&digest::SHA256, text.as_bytes()))
    }
}

/// Hash algorithms selectable by name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HashAlgorithm {
    #[default]
    Crc32,
    Sha256,
}

impl HashAlgorithm {
    #[must_use]
    pub fn hasher(self) -> Box<dyn PolicyHasher + Send + Sync> {
        match self {
            Self::Crc32 => Box::new(Crc32Hasher),
            Self::Sha256 => Box::new(Sha256Hasher),
        }
    }
}
