//! Database record structures passed to and returned from the repositories.
//!
//! Create requests carry fully defaulted values; responses expose the public UUID as `id` and
//! never the internal sequential key.

pub mod file_storage;
pub mod informatieobjecten;
pub mod zaakinformatieobjecten;
