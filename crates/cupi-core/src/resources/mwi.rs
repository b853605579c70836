//! Message waiting indicator devices of a user

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::changes::PropertyList;
use crate::error::Result;
use crate::query::ListQuery;
use crate::result::WebCallResult;
use crate::server::{ConnectionServer, require};
use crate::traits::{EntityState, Resource};
use crate::wire::{self, tracked_setters};

fn collection(user_object_id: &str) -> String {
    format!("users/{}/mwis", user_object_id)
}

fn item_path(user_object_id: &str, object_id: &str) -> String {
    format!("{}/{}", collection(user_object_id), object_id)
}

/// One MWI device (a lamp on a phone) of a user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Mwi {
    pub object_id: String,
    pub subscriber_object_id: String,
    pub display_name: String,
    pub media_switch_object_id: String,
    pub mwi_extension: String,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub active: bool,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub mwi_on: bool,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub include_fax_calls: bool,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub include_voice_calls: bool,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub use_primary_extension: bool,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub use_branch_extension: bool,

    #[serde(skip)]
    state: EntityState,
}

tracked_setters!(Mwi {
    set_display_name => display_name: String = "DisplayName",
    set_media_switch_object_id => media_switch_object_id: String = "MediaSwitchObjectId",
    set_mwi_extension => mwi_extension: String = "MwiExtension",
    set_active => active: bool = "Active",
    set_include_fax_calls => include_fax_calls: bool = "IncludeFaxCalls",
    set_include_voice_calls => include_voice_calls: bool = "IncludeVoiceCalls",
    set_use_primary_extension => use_primary_extension: bool = "UsePrimaryExtension",
    set_use_branch_extension => use_branch_extension: bool = "UseBranchExtension",
});

impl Resource for Mwi {
    const ELEMENT: &'static str = "Mwi";

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

impl Mwi {
    /// Fetch by id, or an empty device of `user_object_id` bound to `server`
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
        display_name: &str,
        media_switch_object_id: &str,
        mwi_extension: &str,
        properties: Option<&PropertyList>,
    ) -> Result<WebCallResult> {
        require(user_object_id, "user object id")?;
        require(display_name, "display name")?;
        require(media_switch_object_id, "media switch object id")?;
        require(mwi_extension, "MWI extension")?;
        let mut body = PropertyList::new()
            .with("DisplayName", display_name)
            .with("MediaSwitchObjectId", media_switch_object_id)
            .with("MwiExtension", mwi_extension)
            .with("UsePrimaryExtension", false);
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
        display_name: &str,
        media_switch_object_id: &str,
        mwi_extension: &str,
        properties: Option<&PropertyList>,
    ) -> Result<Self> {
        let result = Self::add(
            server,
            user_object_id,
            display_name,
            media_switch_object_id,
            mwi_extension,
            properties,
        )
        .await?;
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

impl fmt::Display for Mwi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let extension = if self.use_primary_extension {
            "primary extension"
        } else {
            self.mwi_extension.as_str()
        };
        write!(f, "{} on {}", self.display_name, extension)
    }
}
