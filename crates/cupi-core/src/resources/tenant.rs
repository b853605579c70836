//! Tenants of a multi-tenant server

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::changes::PropertyList;
use crate::error::{Error, Result};
use crate::query::ListQuery;
use crate::result::WebCallResult;
use crate::server::{ConnectionServer, require};
use crate::traits::{EntityState, Resource};
use crate::wire::tracked_setters;

const COLLECTION: &str = "tenants";

fn item_path(object_id: &str) -> String {
    format!("{}/{}", COLLECTION, object_id)
}

/// A tenant. Creating one also creates its partition, search space,
/// templates and phone system on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Tenant {
    pub object_id: String,
    pub alias: String,
    pub description: String,
    pub smtp_domain: String,
    pub mailbox_store_object_id: String,
    pub partition_object_id: String,
    pub pilot_number: String,
    pub time_zone: String,
    pub language: String,
    pub media_switch_object_id: String,

    #[serde(skip)]
    state: EntityState,
}

tracked_setters!(Tenant {
    set_description => description: String = "Description",
    set_pilot_number => pilot_number: String = "PilotNumber",
});

impl Resource for Tenant {
    const ELEMENT: &'static str = "Tenant";

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

/// Aliases become part of object names on the server, so keep them plain
fn is_valid_alias(alias: &str) -> bool {
    !alias.is_empty()
        && alias
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl Tenant {
    /// Fetch by id, else by alias, else an empty tenant bound to `server`
    pub async fn new(
        server: &ConnectionServer,
        object_id: Option<&str>,
        alias: Option<&str>,
    ) -> Result<Self> {
        match (
            object_id.filter(|v| !v.trim().is_empty()),
            alias.filter(|v| !v.trim().is_empty()),
        ) {
            (Some(id), _) => Self::get(server, id).await,
            (None, Some(alias)) => Self::get_by_alias(server, alias).await,
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

    pub async fn get_by_alias(server: &ConnectionServer, alias: &str) -> Result<Self> {
        server.find_object(COLLECTION, "Alias", alias).await
    }

    pub async fn list(server: &ConnectionServer, query: &ListQuery) -> Result<Vec<Self>> {
        server.get_objects(COLLECTION, query).await
    }

    pub async fn add(
        server: &ConnectionServer,
        alias: &str,
        smtp_domain: &str,
        description: &str,
        properties: Option<&PropertyList>,
    ) -> Result<WebCallResult> {
        if !is_valid_alias(alias) {
            return Err(Error::invalid_input(format!(
                "Tenant alias must be letters, digits, '_' or '-': {:?}",
                alias
            )));
        }
        require(smtp_domain, "SMTP domain")?;
        require(description, "description")?;
        let mut body = PropertyList::new()
            .with("Alias", alias)
            .with("SmtpDomain", smtp_domain)
            .with("Description", description);
        if let Some(extra) = properties {
            body.merge(extra);
        }
        server
            .create_object(COLLECTION, &[], Self::ELEMENT, &body)
            .await
    }

    pub async fn add_and_fetch(
        server: &ConnectionServer,
        alias: &str,
        smtp_domain: &str,
        description: &str,
        properties: Option<&PropertyList>,
    ) -> Result<Self> {
        let result = Self::add(server, alias, smtp_domain, description, properties).await?;
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

    /// Removes the tenant and every object it owns
    pub async fn delete_by_id(server: &ConnectionServer, object_id: &str) -> Result<WebCallResult> {
        require(object_id, "object id")?;
        server.delete_object(&item_path(object_id)).await
    }
}

impl fmt::Display for Tenant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.alias, self.smtp_domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_validation() {
        assert!(is_valid_alias("acme_01"));
        assert!(is_valid_alias("north-east"));
        assert!(!is_valid_alias(""));
        assert!(!is_valid_alias("acme corp"));
        assert!(!is_valid_alias("acme.com"));
    }
}
