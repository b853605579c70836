//! Transfer rules of a call handler (standard, off hours, alternate)
//!
//! Transfer options always exist; they are fetched and updated through their
//! owning call handler and cannot be created or deleted.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::common::{disabled_expiry, is_active, segment};
use crate::changes::PropertyList;
use crate::error::{Error, Result};
use crate::query::ListQuery;
use crate::result::WebCallResult;
use crate::server::{ConnectionServer, require};
use crate::traits::{EntityState, Resource};
use crate::wire::{self, tracked_setters, wire_enum};

/// The three transfer rules every call handler has
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TransferOptionType {
    #[default]
    Standard,
    #[serde(rename = "Off Hours")]
    OffHours,
    Alternate,
}

impl TransferOptionType {
    pub fn as_str(self) -> &'static str {
        match self {
            TransferOptionType::Standard => "Standard",
            TransferOptionType::OffHours => "Off Hours",
            TransferOptionType::Alternate => "Alternate",
        }
    }
}

impl fmt::Display for TransferOptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

wire_enum! {
    /// Where the call goes when the rule is active
    pub enum TransferAction {
        Greeting = 0,
        Extension = 1,
    }
}

wire_enum! {
    /// Release the call or stay on it
    pub enum TransferType {
        Release = 0,
        Supervised = 1,
    }
}

wire_enum! {
    /// What a supervised transfer does when the extension is busy
    pub enum TransferHoldingMode {
        No = 0,
        Yes = 1,
        Ask = 2,
    }
}

fn collection(call_handler_object_id: &str) -> String {
    format!("handlers/callhandlers/{}/transferoptions", call_handler_object_id)
}

fn item_path(call_handler_object_id: &str, kind: TransferOptionType) -> String {
    format!(
        "{}/{}",
        collection(call_handler_object_id),
        segment(kind.as_str())
    )
}

/// One transfer rule of a call handler
///
/// Setters queue the change for the next `update()`; assigning fields
/// directly does not.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct TransferOption {
    pub call_handler_object_id: String,
    pub transfer_option_type: TransferOptionType,
    pub action: TransferAction,
    pub extension: String,
    #[serde(deserialize_with = "wire::optional_datetime")]
    pub time_expires: Option<NaiveDateTime>,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub transfer_announce: bool,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub transfer_confirm: bool,
    pub transfer_holding_mode: TransferHoldingMode,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub transfer_introduce: bool,
    #[serde(deserialize_with = "wire::flexible_i32")]
    pub transfer_rings: i32,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub transfer_screening: bool,
    pub transfer_type: TransferType,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub use_primary_extension: bool,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub play_transfer_prompt: bool,
    pub media_switch_object_id: String,

    #[serde(skip)]
    state: EntityState,
}

tracked_setters!(TransferOption {
    set_action => action: TransferAction = "Action",
    set_extension => extension: String = "Extension",
    set_time_expires => time_expires: Option<NaiveDateTime> = "TimeExpires",
    set_transfer_announce => transfer_announce: bool = "TransferAnnounce",
    set_transfer_confirm => transfer_confirm: bool = "TransferConfirm",
    set_transfer_holding_mode => transfer_holding_mode: TransferHoldingMode = "TransferHoldingMode",
    set_transfer_introduce => transfer_introduce: bool = "TransferIntroduce",
    set_transfer_rings => transfer_rings: i32 = "TransferRings",
    set_transfer_screening => transfer_screening: bool = "TransferScreening",
    set_transfer_type => transfer_type: TransferType = "TransferType",
    set_use_primary_extension => use_primary_extension: bool = "UsePrimaryExtension",
    set_play_transfer_prompt => play_transfer_prompt: bool = "PlayTransferPrompt",
});

impl Resource for TransferOption {
    const ELEMENT: &'static str = "TransferOption";
    const DELETABLE: bool = false;

    fn object_id(&self) -> &str {
        self.transfer_option_type.as_str()
    }

    fn item_path(&self) -> String {
        item_path(&self.call_handler_object_id, self.transfer_option_type)
    }

    fn state(&self) -> &EntityState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EntityState {
        &mut self.state
    }
}

impl TransferOption {
    /// Fetch one rule of a call handler
    pub async fn get(
        server: &ConnectionServer,
        call_handler_object_id: &str,
        kind: TransferOptionType,
    ) -> Result<Self> {
        require(call_handler_object_id, "call handler object id")?;
        server
            .get_object(&item_path(call_handler_object_id, kind))
            .await
    }

    /// Fetch all rules of a call handler
    pub async fn list(server: &ConnectionServer, call_handler_object_id: &str) -> Result<Vec<Self>> {
        require(call_handler_object_id, "call handler object id")?;
        server
            .get_objects(&collection(call_handler_object_id), &ListQuery::new())
            .await
    }

    pub async fn update_by_key(
        server: &ConnectionServer,
        call_handler_object_id: &str,
        kind: TransferOptionType,
        properties: &PropertyList,
    ) -> Result<WebCallResult> {
        require(call_handler_object_id, "call handler object id")?;
        server
            .update_object(&item_path(call_handler_object_id, kind), Self::ELEMENT, properties)
            .await
    }

    /// Active now: the standard rule always is, the others until they expire
    pub fn is_enabled(&self) -> bool {
        self.transfer_option_type == TransferOptionType::Standard
            || is_active(self.time_expires, Local::now().naive_local())
    }

    /// Turn the rule on until `until`, or indefinitely for `None`
    pub fn enable_until(&mut self, until: Option<NaiveDateTime>) {
        self.set_time_expires(until);
    }

    /// Turn the rule off; the standard rule cannot be disabled
    pub fn disable(&mut self) -> Result<()> {
        if self.transfer_option_type == TransferOptionType::Standard {
            return Err(Error::invalid_input(
                "The standard transfer rule cannot be disabled",
            ));
        }
        self.set_time_expires(disabled_expiry());
        Ok(())
    }
}

impl fmt::Display for TransferOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.action {
            TransferAction::Extension => write!(
                f,
                "{} transfer to {}",
                self.transfer_option_type, self.extension
            ),
            _ => write!(f, "{} transfer to greeting", self.transfer_option_type),
        }
    }
}
