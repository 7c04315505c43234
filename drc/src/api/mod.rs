//! REST API for the registration component.
//!
//! - **[`handlers`]**: Axum route handlers
//! - **[`models`]**: Request/response bodies
//! - **[`links`]**: Building and resolving resource hyperlinks
//!
//! Both resources live under `/api/v1`. Resources refer to each other by hyperlink
//! (`<public_url>/api/v1/enkelvoudiginformatieobjecten/<uuid>`), never by bare id.

pub mod handlers;
pub mod links;
pub mod models;
