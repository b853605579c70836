//! Call-control servers a port group registers with

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::changes::PropertyList;
use crate::error::{Error, Result};
use crate::query::ListQuery;
use crate::result::WebCallResult;
use crate::server::{ConnectionServer, require};
use crate::traits::{EntityState, Resource};
use crate::wire::{self, tracked_setters, wire_enum};

fn collection(port_group_object_id: &str) -> String {
    format!("portgroups/{}/portgroupservers", port_group_object_id)
}

fn item_path(port_group_object_id: &str, object_id: &str) -> String {
    format!("{}/{}", collection(port_group_object_id), object_id)
}

wire_enum! {
    /// Protocol of the remote call-control server
    pub enum MediaRemoteServiceType {
        Sccp = 0,
        Sip = 1,
        TftpServer = 2,
    }
}

/// One server entry of a port group
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct PortGroupServer {
    pub object_id: String,
    pub media_port_group_object_id: String,
    pub media_remote_service_enum: MediaRemoteServiceType,
    #[serde(rename = "HostOrIPAddress")]
    pub host_or_ip_address: String,
    #[serde(rename = "HostOrIPAddressV6")]
    pub host_or_ip_address_v6: String,
    #[serde(deserialize_with = "wire::flexible_i32")]
    pub port: i32,
    #[serde(deserialize_with = "wire::flexible_i32")]
    pub precedence: i32,
    #[serde(deserialize_with = "wire::flexible_i32")]
    pub tls_port: i32,
    pub display_name: String,

    #[serde(skip)]
    state: EntityState,
}

tracked_setters!(PortGroupServer {
    set_host_or_ip_address => host_or_ip_address: String = "HostOrIPAddress",
    set_host_or_ip_address_v6 => host_or_ip_address_v6: String = "HostOrIPAddressV6",
    set_port => port: i32 = "Port",
    set_precedence => precedence: i32 = "Precedence",
    set_tls_port => tls_port: i32 = "TlsPort",
});

impl Resource for PortGroupServer {
    const ELEMENT: &'static str = "PortGroupServer";

    fn object_id(&self) -> &str {
        &self.object_id
    }

    fn item_path(&self) -> String {
        item_path(&self.media_port_group_object_id, &self.object_id)
    }

    fn state(&self) -> &EntityState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EntityState {
        &mut self.state
    }
}

impl PortGroupServer {
    /// Fetch by id, or an empty entry of `port_group_object_id` bound to `server`
    pub async fn new(
        server: &ConnectionServer,
        port_group_object_id: &str,
        object_id: Option<&str>,
    ) -> Result<Self> {
        require(port_group_object_id, "port group object id")?;
        match object_id.filter(|id| !id.trim().is_empty()) {
            Some(id) => Self::get(server, port_group_object_id, id).await,
            None => Ok(Self {
                media_port_group_object_id: port_group_object_id.to_string(),
                state: EntityState::bound(server),
                ..Default::default()
            }),
        }
    }

    pub async fn get(
        server: &ConnectionServer,
        port_group_object_id: &str,
        object_id: &str,
    ) -> Result<Self> {
        require(port_group_object_id, "port group object id")?;
        require(object_id, "object id")?;
        server
            .get_object(&item_path(port_group_object_id, object_id))
            .await
    }

    pub async fn list(
        server: &ConnectionServer,
        port_group_object_id: &str,
        query: &ListQuery,
    ) -> Result<Vec<Self>> {
        require(port_group_object_id, "port group object id")?;
        server
            .get_objects(&collection(port_group_object_id), query)
            .await
    }

    pub async fn add(
        server: &ConnectionServer,
        port_group_object_id: &str,
        service_type: MediaRemoteServiceType,
        host_or_ip_address: &str,
        port: i32,
        precedence: i32,
    ) -> Result<WebCallResult> {
        require(port_group_object_id, "port group object id")?;
        require(host_or_ip_address, "host or IP address")?;
        if !(1..=65535).contains(&port) {
            return Err(Error::invalid_input(format!("Invalid port: {}", port)));
        }
        if precedence < 1 {
            return Err(Error::invalid_input(format!(
                "Precedence must be at least 1, got {}",
                precedence
            )));
        }
        let body = PropertyList::new()
            .with("MediaPortGroupObjectId", port_group_object_id)
            .with("MediaRemoteServiceEnum", service_type)
            .with("HostOrIPAddress", host_or_ip_address)
            .with("Port", port)
            .with("Precedence", precedence);
        server
            .create_object(&collection(port_group_object_id), &[], Self::ELEMENT, &body)
            .await
    }

    pub async fn add_and_fetch(
        server: &ConnectionServer,
        port_group_object_id: &str,
        service_type: MediaRemoteServiceType,
        host_or_ip_address: &str,
        port: i32,
        precedence: i32,
    ) -> Result<Self> {
        let result = Self::add(
            server,
            port_group_object_id,
            service_type,
            host_or_ip_address,
            port,
            precedence,
        )
        .await?;
        Self::get(server, port_group_object_id, &result.returned_object_id).await
    }

    pub async fn update_by_id(
        server: &ConnectionServer,
        port_group_object_id: &str,
        object_id: &str,
        properties: &PropertyList,
    ) -> Result<WebCallResult> {
        require(port_group_object_id, "port group object id")?;
        require(object_id, "object id")?;
        server
            .update_object(
                &item_path(port_group_object_id, object_id),
                Self::ELEMENT,
                properties,
            )
            .await
    }

    pub async fn delete_by_id(
        server: &ConnectionServer,
        port_group_object_id: &str,
        object_id: &str,
    ) -> Result<WebCallResult> {
        require(port_group_object_id, "port group object id")?;
        require(object_id, "object id")?;
        server
            .delete_object(&item_path(port_group_object_id, object_id))
            .await
    }
}

impl fmt::Display for PortGroupServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} (precedence {})",
            self.host_or_ip_address, self.port, self.precedence
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_v6_field() {
        let entry: PortGroupServer = serde_json::from_str(
            r#"{"ObjectId":"s1","MediaPortGroupObjectId":"pg1","MediaRemoteServiceEnum":"1",
                "HostOrIPAddress":"10.0.0.5","HostOrIPAddressV6":"fe80::1","Port":"5060",
                "Precedence":"1"}"#,
        )
        .unwrap();
        assert_eq!(entry.media_remote_service_enum, MediaRemoteServiceType::Sip);
        assert_eq!(entry.host_or_ip_address_v6, "fe80::1");
        assert_eq!(entry.item_path(), "portgroups/pg1/portgroupservers/s1");
        assert_eq!(entry.to_string(), "10.0.0.5:5060 (precedence 1)");
    }
}
