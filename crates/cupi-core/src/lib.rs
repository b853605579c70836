// # cupi-core
//
// Typed client for the CUPI provisioning API of a voicemail server.
//
// ## Architecture Overview
//
// - **Transport**: Trait for sending one HTTP request (reqwest lives in
//   `cupi-transport-http`)
// - **ConnectionServer**: Shared handle that turns each operation into
//   exactly one request and classifies the answer
// - **Resource**: Trait every typed server object implements (identity,
//   change list, update / delete / refetch)
// - **PropertyList**: Ordered change list sent as a partial update
// - **LazyList**: Child collections fetched at most once until invalidated
// - **BlockingServer**: Synchronous facade that drives each operation on an
//   owned current-thread runtime
//
// ## Design Principles
//
// 1. **Partial updates**: setters queue changes; `update()` sends only those
// 2. **Clean hydration**: objects come from serde and never start dirty
// 3. **One call per operation**: no retries, no background tasks
// 4. **Caller errors first**: misuse fails before anything is sent

pub mod blocking;
pub mod changes;
pub mod config;
pub mod error;
pub mod lazy;
pub mod query;
pub mod resources;
pub mod result;
pub mod server;
pub mod traits;
pub mod wire;

// Re-export core types for convenience
pub use blocking::BlockingServer;
pub use changes::{PropertyList, PropertyValue};
pub use config::ServerConfig;
pub use error::{Error, Result};
pub use lazy::{Lazy, LazyList};
pub use query::{ListQuery, QueryClause, QueryOperator, SortOrder};
pub use result::WebCallResult;
pub use server::ConnectionServer;
pub use traits::{Resource, Transport};
