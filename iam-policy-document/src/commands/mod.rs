//! Commands module - service layer for policy document assembly

mod assemble;
pub(crate) mod service;

pub use assemble::{assemble, AssembledPolicy};
pub use service::PolicyDocumentService;
