//! Request and response models for the REST API.
//!
//! Request models declare their field rules with `validator` attributes. Response models
//! render resources with hyperlinks built by [`crate::api::links::ResourceLinks`].

pub mod informatieobjecten;
pub mod pagination;
pub mod zaakinformatieobjecten;
