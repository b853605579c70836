//! Additional extensions that reach a user
//!
//! Each user has up to twenty alternate extension slots, identified by
//! `IdIndex`. Slots 1-10 are administrator managed, 11-20 belong to the user.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::changes::PropertyList;
use crate::error::{Error, Result};
use crate::query::ListQuery;
use crate::result::WebCallResult;
use crate::server::{ConnectionServer, require};
use crate::traits::{EntityState, Resource};
use crate::wire::{self, tracked_setters};

/// Highest alternate extension slot
pub const MAX_ID_INDEX: i32 = 20;

fn collection(user_object_id: &str) -> String {
    format!("users/{}/alternateextensions", user_object_id)
}

fn item_path(user_object_id: &str, object_id: &str) -> String {
    format!("{}/{}", collection(user_object_id), object_id)
}

/// An alternate extension of one user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct AlternateExtension {
    pub object_id: String,
    pub subscriber_object_id: String,
    pub dtmf_access_id: String,
    #[serde(deserialize_with = "wire::flexible_i32")]
    pub id_index: i32,
    pub location_object_id: String,
    pub partition_object_id: String,

    #[serde(skip)]
    state: EntityState,
}

tracked_setters!(AlternateExtension {
    set_dtmf_access_id => dtmf_access_id: String = "DtmfAccessId",
    set_partition_object_id => partition_object_id: String = "PartitionObjectId",
});

impl Resource for AlternateExtension {
    const ELEMENT: &'static str = "AlternateExtension";

    fn object_id(&self) -> &str {
        &self.object_id
    }

    fn item_path(&self) -> String {
        item_path(&self.subscriber_object_id, &self.object_id)
    }

    fn state(&self) -> &EntityState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EntityState {
        &mut self.state
    }
}

impl AlternateExtension {
    /// Fetch by id, or an empty extension of `user_object_id` bound to `server`
    pub async fn new(
        server: &ConnectionServer,
        user_object_id: &str,
        object_id: Option<&str>,
    ) -> Result<Self> {
        require(user_object_id, "user object id")?;
        match object_id.filter(|id| !id.trim().is_empty()) {
            Some(id) => Self::get(server, user_object_id, id).await,
            None => Ok(Self {
                subscriber_object_id: user_object_id.to_string(),
                state: EntityState::bound(server),
                ..Default::default()
            }),
        }
    }

    pub async fn get(
        server: &ConnectionServer,
        user_object_id: &str,
        object_id: &str,
    ) -> Result<Self> {
        require(user_object_id, "user object id")?;
        require(object_id, "object id")?;
        server
            .get_object(&item_path(user_object_id, object_id))
            .await
    }

    pub async fn list(
        server: &ConnectionServer,
        user_object_id: &str,
        query: &ListQuery,
    ) -> Result<Vec<Self>> {
        require(user_object_id, "user object id")?;
        server
            .get_objects(&collection(user_object_id), query)
            .await
    }

    pub async fn add(
        server: &ConnectionServer,
        user_object_id: &str,
        id_index: i32,
        extension: &str,
        properties: Option<&PropertyList>,
    ) -> Result<WebCallResult> {
        require(user_object_id, "user object id")?;
        require(extension, "extension")?;
        if !(1..=MAX_ID_INDEX).contains(&id_index) {
            return Err(Error::invalid_input(format!(
                "Alternate extension index must be 1-{}, got {}",
                MAX_ID_INDEX, id_index
            )));
        }
        let mut body = PropertyList::new()
            .with("IdIndex", id_index)
            .with("DtmfAccessId", extension);
        if let Some(extra) = properties {
            body.merge(extra);
        }
        server
            .create_object(&collection(user_object_id), &[], Self::ELEMENT, &body)
            .await
    }

    pub async fn add_and_fetch(
        server: &ConnectionServer,
        user_object_id: &str,
        id_index: i32,
        extension: &str,
        properties: Option<&PropertyList>,
    ) -> Result<Self> {
        let result = Self::add(server, user_object_id, id_index, extension, properties).await?;
        Self::get(server, user_object_id, &result.returned_object_id).await
    }

    pub async fn update_by_id(
        server: &ConnectionServer,
        user_object_id: &str,
        object_id: &str,
        properties: &PropertyList,
    ) -> Result<WebCallResult> {
        require(user_object_id, "user object id")?;
        require(object_id, "object id")?;
        server
            .update_object(&item_path(user_object_id, object_id), Self::ELEMENT, properties)
            .await
    }

    pub async fn delete_by_id(
        server: &ConnectionServer,
        user_object_id: &str,
        object_id: &str,
    ) -> Result<WebCallResult> {
        require(user_object_id, "user object id")?;
        require(object_id, "object id")?;
        server
            .delete_object(&item_path(user_object_id, object_id))
            .await
    }
}

impl fmt::Display for AlternateExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Extension {} (slot {})", self.dtmf_access_id, self.id_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_path_uses_owner() {
        let ext: AlternateExtension = serde_json::from_str(
            r#"{"ObjectId":"ae1","SubscriberObjectId":"u1","DtmfAccessId":"5551212","IdIndex":"3"}"#,
        )
        .unwrap();
        assert_eq!(ext.item_path(), "users/u1/alternateextensions/ae1");
        assert_eq!(ext.to_string(), "Extension 5551212 (slot 3)");
    }
}
