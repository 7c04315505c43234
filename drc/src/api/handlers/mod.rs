//! HTTP request handlers, one module per resource.
//!
//! - [`informatieobjecten`]: register, list, fetch, download and delete documents
//! - [`zaakinformatieobjecten`]: link documents to cases

pub mod informatieobjecten;
pub mod zaakinformatieobjecten;
