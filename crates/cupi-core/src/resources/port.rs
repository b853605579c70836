//! Voice messaging ports of a port group

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::changes::PropertyList;
use crate::error::{Error, Result};
use crate::query::ListQuery;
use crate::result::WebCallResult;
use crate::server::{ConnectionServer, require};
use crate::traits::{EntityState, Resource};
use crate::wire::{self, tracked_setters};

const COLLECTION: &str = "ports";

fn item_path(object_id: &str) -> String {
    format!("{}/{}", COLLECTION, object_id)
}

/// One voice messaging port
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Port {
    pub object_id: String,
    pub display_name: String,
    pub media_port_group_object_id: String,
    pub media_switch_object_id: String,
    pub vms_server_object_id: String,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub is_enabled: bool,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub answer_calls: bool,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub perform_message_notification: bool,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub send_mwi: bool,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub allow_tlw: bool,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub allow_dial_out: bool,
    #[serde(deserialize_with = "wire::flexible_i32")]
    pub port_number: i32,
    #[serde(deserialize_with = "wire::flexible_i32")]
    pub capability_answer: i32,
    pub sip_user_name: String,

    #[serde(skip)]
    state: EntityState,
}

tracked_setters!(Port {
    set_display_name => display_name: String = "DisplayName",
    set_is_enabled => is_enabled: bool = "IsEnabled",
    set_answer_calls => answer_calls: bool = "AnswerCalls",
    set_perform_message_notification => perform_message_notification: bool = "PerformMessageNotification",
    set_send_mwi => send_mwi: bool = "SendMwi",
    set_allow_tlw => allow_tlw: bool = "AllowTlw",
    set_allow_dial_out => allow_dial_out: bool = "AllowDialOut",
    set_vms_server_object_id => vms_server_object_id: String = "VmsServerObjectId",
});

impl Resource for Port {
    const ELEMENT: &'static str = "Port";

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

impl Port {
    /// Fetch by id, or an empty port bound to `server`
    pub async fn new(server: &ConnectionServer, object_id: Option<&str>) -> Result<Self> {
        match object_id.filter(|id| !id.trim().is_empty()) {
            Some(id) => Self::get(server, id).await,
            None => Ok(Self {
                state: EntityState::bound(server),
                ..Default::default()
            }),
        }
    }

    pub async fn get(server: &ConnectionServer, object_id: &str) -> Result<Self> {
        require(object_id, "object id")?;
        server.get_object(&item_path(object_id)).await
    }

    pub async fn list(server: &ConnectionServer, query: &ListQuery) -> Result<Vec<Self>> {
        server.get_objects(COLLECTION, query).await
    }

    /// Ports of one port group
    pub async fn list_for_port_group(
        server: &ConnectionServer,
        port_group_object_id: &str,
    ) -> Result<Vec<Self>> {
        require(port_group_object_id, "port group object id")?;
        let query = ListQuery::new().where_is("MediaPortGroupObjectId", port_group_object_id);
        server.get_objects(COLLECTION, &query).await
    }

    /// Add `number_of_ports` ports to a port group in one request
    pub async fn add(
        server: &ConnectionServer,
        port_group_object_id: &str,
        number_of_ports: i32,
        properties: Option<&PropertyList>,
    ) -> Result<WebCallResult> {
        require(port_group_object_id, "port group object id")?;
        if number_of_ports < 1 {
            return Err(Error::invalid_input(format!(
                "Number of ports must be at least 1, got {}",
                number_of_ports
            )));
        }
        let mut body = PropertyList::new()
            .with("MediaPortGroupObjectId", port_group_object_id)
            .with("NumberOfPorts", number_of_ports);
        if let Some(extra) = properties {
            body.merge(extra);
        }
        server
            .create_object(COLLECTION, &[], Self::ELEMENT, &body)
            .await
    }

    /// Add ports and fetch the first one created
    pub async fn add_and_fetch(
        server: &ConnectionServer,
        port_group_object_id: &str,
        number_of_ports: i32,
        properties: Option<&PropertyList>,
    ) -> Result<Self> {
        let result = Self::add(server, port_group_object_id, number_of_ports, properties).await?;
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

    pub async fn delete_by_id(server: &ConnectionServer, object_id: &str) -> Result<WebCallResult> {
        require(object_id, "object id")?;
        server.delete_object(&item_path(object_id)).await
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({})",
            self.display_name,
            if self.is_enabled { "enabled" } else { "disabled" }
        )
    }
}
