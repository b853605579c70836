//! Core traits for the CUPI client
//!
//! - [`Transport`]: Send one HTTP request to the server
//! - [`Resource`]: Shared behaviour of every typed server object

pub mod resource;
pub mod transport;

pub use resource::{EntityState, Resource};
pub use transport::{HttpMethod, HttpRequest, HttpResponse, RequestBody, Transport};
