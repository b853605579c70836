// # Resource Trait
//
// Shared behaviour of every typed server object: identity, the change
// list, and the instance forms of update / delete / refetch.
//
// ## Implementations
//
// One per type in `crate::resources`. Implementors provide identity and
// paths; the default methods do the rest through `ConnectionServer`.
//
// ## Hydration vs. mutation
//
// Objects are populated by serde. Deserialization never calls setters, so
// it never touches `EntityState::changes`: a freshly fetched object is
// clean. Only setters (and `EntityState::record`) make it dirty.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::changes::{PropertyList, PropertyValue};
use crate::error::{Error, Result};
use crate::query::DEFAULT_ROWS_PER_PAGE;
use crate::result::WebCallResult;
use crate::server::ConnectionServer;
use crate::wire;

/// Client-side state carried by every entity, never serialized
#[derive(Debug, Clone, Default)]
pub struct EntityState {
    /// Handle the object was fetched through (or created with)
    pub server: Option<ConnectionServer>,
    /// Changes made through setters since the last clean state
    pub changes: PropertyList,
}

impl EntityState {
    /// State bound to a server with no pending changes
    pub fn bound(server: &ConnectionServer) -> Self {
        Self {
            server: Some(server.clone()),
            changes: PropertyList::new(),
        }
    }

    /// Bind to a server (after deserialization)
    pub fn attach(&mut self, server: &ConnectionServer) {
        self.server = Some(server.clone());
    }

    /// Queue a change
    pub fn record(&mut self, name: &str, value: impl Into<PropertyValue>) {
        self.changes.add(name, value);
    }
}

/// Trait for typed server objects
///
/// # Identity
///
/// `object_id()` is whatever identifies the object inside `item_path()`:
/// the server-assigned ObjectId for most resources, the type key for
/// transfer options / greetings / menu entries, the language code for
/// stream files.
///
/// # Errors
///
/// Instance methods fail with `Error::InvalidInput`, without touching the
/// network, when the object has no server handle, no identity, or (for
/// `update`) no pending changes.
#[async_trait]
pub trait Resource: Serialize + DeserializeOwned + Send + Sync + Sized + 'static {
    /// JSON list element name and XML request root
    const ELEMENT: &'static str;

    /// Page size when neither caller nor config chooses one
    const DEFAULT_ROWS_PER_PAGE: u32 = DEFAULT_ROWS_PER_PAGE;

    /// Whether the server allows deleting this kind of object
    const DELETABLE: bool = true;

    /// Identifier of this object within its collection
    fn object_id(&self) -> &str;

    /// Path of this object relative to the API base URL
    fn item_path(&self) -> String;

    fn state(&self) -> &EntityState;

    fn state_mut(&mut self) -> &mut EntityState;

    /// The server handle, or a caller error if the object has none
    fn server(&self) -> Result<&ConnectionServer> {
        self.state().server.as_ref().ok_or_else(|| {
            Error::invalid_input(format!("{} is not bound to a server", Self::ELEMENT))
        })
    }

    fn pending_changes(&self) -> &PropertyList {
        &self.state().changes
    }

    fn has_pending_changes(&self) -> bool {
        !self.state().changes.is_empty()
    }

    fn clear_pending_changes(&mut self) {
        self.state_mut().changes.clear();
    }

    /// One `name = value` line per field, each starting with `prefix`
    fn dump_all_props(&self, prefix: &str) -> String {
        wire::dump_props(self, prefix)
    }

    /// Fail unless the object has an identity to put in its path
    fn require_identity(&self) -> Result<()> {
        if self.object_id().trim().is_empty() {
            return Err(Error::invalid_input(format!(
                "{} has no object id",
                Self::ELEMENT
            )));
        }
        Ok(())
    }

    /// Send pending changes; clears them on success
    async fn update(&mut self) -> Result<WebCallResult> {
        self.require_identity()?;
        let server = self.server()?.clone();
        let result = server
            .update_object(&self.item_path(), Self::ELEMENT, self.pending_changes())
            .await?;
        self.clear_pending_changes();
        Ok(result)
    }

    /// Delete the object on the server; local state is left as is
    async fn delete(&self) -> Result<WebCallResult> {
        if !Self::DELETABLE {
            return Err(Error::invalid_input(format!(
                "{} objects cannot be deleted",
                Self::ELEMENT
            )));
        }
        self.require_identity()?;
        self.server()?.delete_object(&self.item_path()).await
    }

    /// Reload every field from the server. Pending changes and cached
    /// child collections are discarded.
    async fn refetch(&mut self) -> Result<()> {
        self.require_identity()?;
        let server = self.server()?.clone();
        let fresh: Self = server.get_object(&self.item_path()).await?;
        *self = fresh;
        Ok(())
    }
}
