//! Caller input keys (0-9, *, #) of a call handler

use serde::{Deserialize, Serialize};
use std::fmt;

use super::common::{ActionType, segment};
use super::transfer_option::TransferType;
use crate::changes::PropertyList;
use crate::error::{Error, Result};
use crate::query::ListQuery;
use crate::result::WebCallResult;
use crate::server::{ConnectionServer, require};
use crate::traits::{EntityState, Resource};
use crate::wire::{self, tracked_setters};

/// Keys a call handler has menu entries for
pub const TOUCHTONE_KEYS: [&str; 12] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9", "*", "#"];

fn collection(call_handler_object_id: &str) -> String {
    format!("handlers/callhandlers/{}/menuentries", call_handler_object_id)
}

fn item_path(call_handler_object_id: &str, key: &str) -> String {
    format!("{}/{}", collection(call_handler_object_id), segment(key))
}

fn require_key(key: &str) -> Result<()> {
    if TOUCHTONE_KEYS.contains(&key) {
        Ok(())
    } else {
        Err(Error::invalid_input(format!("Invalid touchtone key: {:?}", key)))
    }
}

/// What happens when a caller presses one key during the greeting
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct MenuEntry {
    pub call_handler_object_id: String,
    pub touchtone_key: String,
    pub action: ActionType,
    pub target_conversation: String,
    pub target_handler_object_id: String,
    pub transfer_number: String,
    pub transfer_type: TransferType,
    #[serde(deserialize_with = "wire::flexible_i32")]
    pub transfer_rings: i32,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub locked: bool,

    #[serde(skip)]
    state: EntityState,
}

tracked_setters!(MenuEntry {
    set_action => action: ActionType = "Action",
    set_target_conversation => target_conversation: String = "TargetConversation",
    set_target_handler_object_id => target_handler_object_id: String = "TargetHandlerObjectId",
    set_transfer_number => transfer_number: String = "TransferNumber",
    set_transfer_type => transfer_type: TransferType = "TransferType",
    set_transfer_rings => transfer_rings: i32 = "TransferRings",
    set_locked => locked: bool = "Locked",
});

impl Resource for MenuEntry {
    const ELEMENT: &'static str = "MenuEntry";
    const DELETABLE: bool = false;

    fn object_id(&self) -> &str {
        &self.touchtone_key
    }

    fn item_path(&self) -> String {
        item_path(&self.call_handler_object_id, &self.touchtone_key)
    }

    fn state(&self) -> &EntityState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EntityState {
        &mut self.state
    }
}

impl MenuEntry {
    pub async fn get(
        server: &ConnectionServer,
        call_handler_object_id: &str,
        key: &str,
    ) -> Result<Self> {
        require(call_handler_object_id, "call handler object id")?;
        require_key(key)?;
        server
            .get_object(&item_path(call_handler_object_id, key))
            .await
    }

    pub async fn list(server: &ConnectionServer, call_handler_object_id: &str) -> Result<Vec<Self>> {
        require(call_handler_object_id, "call handler object id")?;
        server
            .get_objects(&collection(call_handler_object_id), &ListQuery::new())
            .await
    }

    pub async fn update_by_key(
        server: &ConnectionServer,
        call_handler_object_id: &str,
        key: &str,
        properties: &PropertyList,
    ) -> Result<WebCallResult> {
        require(call_handler_object_id, "call handler object id")?;
        require_key(key)?;
        server
            .update_object(&item_path(call_handler_object_id, key), Self::ELEMENT, properties)
            .await
    }

    /// Send the caller to another call handler
    pub fn go_to_handler(&mut self, target_handler_object_id: &str) {
        self.set_action(ActionType::GoTo);
        self.set_target_conversation("PHTransfer");
        self.set_target_handler_object_id(target_handler_object_id);
    }
}

impl fmt::Display for MenuEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "key {} -> {:?}", self.touchtone_key, self.action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_key_is_encoded() {
        let entry = MenuEntry {
            call_handler_object_id: "ch1".to_string(),
            touchtone_key: "#".to_string(),
            ..Default::default()
        };
        assert_eq!(entry.item_path(), "handlers/callhandlers/ch1/menuentries/%23");
    }

    #[test]
    fn test_invalid_key_rejected() {
        assert!(require_key("10").unwrap_err().is_caller_error());
        assert!(require_key("*").is_ok());
    }

    #[test]
    fn test_go_to_handler_queues_three_fields() {
        let mut entry = MenuEntry::default();
        entry.go_to_handler("target-id");
        assert_eq!(
            entry.pending_changes().to_xml_body("MenuEntry"),
            "<MenuEntry><Action>2</Action><TargetConversation>PHTransfer</TargetConversation>\
             <TargetHandlerObjectId>target-id</TargetHandlerObjectId></MenuEntry>"
        );
    }
}
