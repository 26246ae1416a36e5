#![forbid(unsafe_code)]

pub mod constants;
pub mod models;
pub mod part_range;
pub mod checksums;
pub mod crypt4gh;
pub mod ports;
pub mod interrogator;
pub mod cleaner;

pub use checksums::ChecksumTracker;
pub use crypt4gh::{Crypt4GhEnvelopeDecoder, EnvelopeDecoder};
pub use cleaner::Cleaner;
pub use interrogator::Interrogator;
pub use models::{FileUpload, InterrogationReport, PartRange};
