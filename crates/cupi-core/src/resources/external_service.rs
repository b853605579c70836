//! External services (Exchange / calendar integrations)

use serde::{Deserialize, Serialize};
use std::fmt;

use super::common::non_blank;
use crate::changes::PropertyList;
use crate::error::Result;
use crate::query::ListQuery;
use crate::result::WebCallResult;
use crate::server::{ConnectionServer, require};
use crate::traits::{EntityState, Resource};
use crate::wire::{self, tracked_setters, wire_enum};

const COLLECTION: &str = "externalservices";

fn item_path(object_id: &str) -> String {
    format!("{}/{}", COLLECTION, object_id)
}

wire_enum! {
    /// Kind of server an external service talks to
    pub enum ServerType {
        Exchange2003 = 0,
        MeetingPlace = 1,
        Exchange2007 = 2,
        Office365 = 5,
    }
}

wire_enum! {
    /// How the service authenticates
    pub enum AuthenticationMode {
        Basic = 0,
        Ntlm = 1,
    }
}

/// An external service definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ExternalService {
    pub object_id: String,
    pub display_name: String,
    pub server: String,
    pub server_type: ServerType,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub is_enabled: bool,
    pub authentication_mode: AuthenticationMode,
    pub security_transport_type: String,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub validate_server_certificate: bool,
    pub service_alias: String,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub support_calendar_integration: bool,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub support_tts_of_email: bool,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub use_service_credentials: bool,

    #[serde(skip)]
    state: EntityState,
}

tracked_setters!(ExternalService {
    set_display_name => display_name: String = "DisplayName",
    set_server => server: String = "Server",
    set_is_enabled => is_enabled: bool = "IsEnabled",
    set_authentication_mode => authentication_mode: AuthenticationMode = "AuthenticationMode",
    set_security_transport_type => security_transport_type: String = "SecurityTransportType",
    set_validate_server_certificate => validate_server_certificate: bool = "ValidateServerCertificate",
    set_service_alias => service_alias: String = "ServiceAlias",
    set_support_calendar_integration => support_calendar_integration: bool = "SupportCalendarIntegration",
    set_support_tts_of_email => support_tts_of_email: bool = "SupportTtsOfEmail",
    set_use_service_credentials => use_service_credentials: bool = "UseServiceCredentials",
});

impl ExternalService {
    /// The service account password; write-only on the server
    pub fn set_service_password(&mut self, password: &str) {
        self.state.record("ServicePassword", password);
    }
}

impl Resource for ExternalService {
    const ELEMENT: &'static str = "ExternalService";

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

impl ExternalService {
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
        server_name: &str,
        server_type: ServerType,
        properties: Option<&PropertyList>,
    ) -> Result<WebCallResult> {
        require(display_name, "display name")?;
        require(server_name, "server")?;
        let mut body = PropertyList::new()
            .with("DisplayName", display_name)
            .with("Server", server_name)
            .with("ServerType", server_type);
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
        server_name: &str,
        server_type: ServerType,
        properties: Option<&PropertyList>,
    ) -> Result<Self> {
        let result = Self::add(server, display_name, server_name, server_type, properties).await?;
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

impl fmt::Display for ExternalService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name, self.server)
    }
}
