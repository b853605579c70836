//! Phone system integrations (media switches)

use serde::{Deserialize, Serialize};
use std::fmt;

use super::common::non_blank;
use crate::changes::PropertyList;
use crate::error::Result;
use crate::query::ListQuery;
use crate::result::WebCallResult;
use crate::server::{ConnectionServer, require};
use crate::traits::{EntityState, Resource};
use crate::wire::{self, tracked_setters};

const COLLECTION: &str = "phonesystems";

fn item_path(object_id: &str) -> String {
    format!("{}/{}", COLLECTION, object_id)
}

/// A phone system integration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct PhoneSystem {
    pub object_id: String,
    pub display_name: String,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub default_trap_switch: bool,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub mwi_always_update: bool,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub mwi_port_memory: bool,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub mwi_force_off: bool,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub restrict_dial_unconditional: bool,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub restrict_dial_scheduled: bool,
    #[serde(deserialize_with = "wire::flexible_i32")]
    pub restrict_dial_start_time: i32,
    #[serde(deserialize_with = "wire::flexible_i32")]
    pub restrict_dial_end_time: i32,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub call_loop_supervised_transfer_detect: bool,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub call_loop_forward_notification_detect: bool,
    #[serde(deserialize_with = "wire::flexible_i32")]
    pub call_loop_guard_time_ms: i32,
    #[serde(deserialize_with = "wire::flexible_i32")]
    pub port_count: i32,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub enable_phone_applications: bool,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub use_https_for_phone_applications: bool,
    pub tenant_object_id: String,

    #[serde(skip)]
    state: EntityState,
}

tracked_setters!(PhoneSystem {
    set_display_name => display_name: String = "DisplayName",
    set_default_trap_switch => default_trap_switch: bool = "DefaultTrapSwitch",
    set_mwi_always_update => mwi_always_update: bool = "MwiAlwaysUpdate",
    set_mwi_port_memory => mwi_port_memory: bool = "MwiPortMemory",
    set_mwi_force_off => mwi_force_off: bool = "MwiForceOff",
    set_restrict_dial_unconditional => restrict_dial_unconditional: bool = "RestrictDialUnconditional",
    set_restrict_dial_scheduled => restrict_dial_scheduled: bool = "RestrictDialScheduled",
    set_restrict_dial_start_time => restrict_dial_start_time: i32 = "RestrictDialStartTime",
    set_restrict_dial_end_time => restrict_dial_end_time: i32 = "RestrictDialEndTime",
    set_call_loop_supervised_transfer_detect => call_loop_supervised_transfer_detect: bool = "CallLoopSupervisedTransferDetect",
    set_call_loop_forward_notification_detect => call_loop_forward_notification_detect: bool = "CallLoopForwardNotificationDetect",
    set_call_loop_guard_time_ms => call_loop_guard_time_ms: i32 = "CallLoopGuardTimeMs",
    set_enable_phone_applications => enable_phone_applications: bool = "EnablePhoneApplications",
    set_use_https_for_phone_applications => use_https_for_phone_applications: bool = "UseHttpsForPhoneApplications",
});

impl Resource for PhoneSystem {
    const ELEMENT: &'static str = "PhoneSystem";

    fn object_id(&self) -> &str {
        &self.object_id
    }

    fn item_path(&self) -> String {
        item_path(&self.object_id)
    }

    fn state(&self) -> &EntityState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EntityState {
        &mut self.state
    }
}

impl PhoneSystem {
    pub async fn new(
        server: &ConnectionServer,
        object_id: Option<&str>,
        display_name: Option<&str>,
    ) -> Result<Self> {
        match (non_blank(object_id), non_blank(display_name)) {
            (Some(id), _) => Self::get(server, id).await,
            (None, Some(name)) => Self::get_by_name(server, name).await,
            (None, None) => Ok(Self {
                state: EntityState::bound(server),
                ..Default::default()
            }),
        }
    }

    pub async fn get(server: &ConnectionServer, object_id: &str) -> Result<Self> {
        require(object_id, "object id")?;
        server.get_object(&item_path(object_id)).await
    }

    pub async fn get_by_name(server: &ConnectionServer, display_name: &str) -> Result<Self> {
        server
            .find_object(COLLECTION, "DisplayName", display_name)
            .await
    }

    pub async fn list(server: &ConnectionServer, query: &ListQuery) -> Result<Vec<Self>> {
        server.get_objects(COLLECTION, query).await
    }

    pub async fn add(
        server: &ConnectionServer,
        display_name: &str,
        properties: Option<&PropertyList>,
    ) -> Result<WebCallResult> {
        require(display_name, "display name")?;
        let mut body = PropertyList::new().with("DisplayName", display_name);
        if let Some(extra) = properties {
            body.merge(extra);
        }
        server
            .create_object(COLLECTION, &[], Self::ELEMENT, &body)
            .await
    }

    pub async fn add_and_fetch(
        server: &ConnectionServer,
        display_name: &str,
        properties: Option<&PropertyList>,
    ) -> Result<Self> {
        let result = Self::add(server, display_name, properties).await?;
        Self::get(server, &result.returned_object_id).await
    }

    pub async fn update_by_id(
        server: &ConnectionServer,
        object_id: &str,
        properties: &PropertyList,
    ) -> Result<WebCallResult> {
        require(object_id, "object id")?;
        server
            .update_object(&item_path(object_id), Self::ELEMENT, properties)
            .await
    }

    /// Fails on the server while port groups still reference the phone system
    pub async fn delete_by_id(server: &ConnectionServer, object_id: &str) -> Result<WebCallResult> {
        require(object_id, "object id")?;
        server.delete_object(&item_path(object_id)).await
    }
}

impl fmt::Display for PhoneSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} ports)", self.display_name, self.port_count)
    }
}
