// # Call Handlers
//
// Audio-text applications: a greeting plays, the caller presses a key or
// waits, and the handler transfers, takes a message, or routes elsewhere.
//
// A call handler owns three keyed child sets (transfer options, greetings,
// menu entries) and references one schedule set. All four are loaded on
// first access and cached on the handler; `force_refetch` or `refetch()`
// drops the cache.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use super::common::{ActionType, non_blank};
use super::greeting::{Greeting, GreetingType};
use super::menu_entry::MenuEntry;
use super::schedule_set::ScheduleSet;
use super::transfer_option::{TransferOption, TransferOptionType};
use crate::changes::PropertyList;
use crate::error::{Error, Result};
use crate::lazy::{Lazy, LazyList};
use crate::query::{ListQuery, QueryClause};
use crate::result::WebCallResult;
use crate::server::{ConnectionServer, require};
use crate::traits::{EntityState, Resource};
use crate::wire::{self, tracked_setters, wire_enum};

const COLLECTION: &str = "handlers/callhandlers";

fn item_path(object_id: &str) -> String {
    format!("{}/{}", COLLECTION, object_id)
}

wire_enum! {
    /// Whether callers may mark a message urgent
    pub enum UrgentMessageMode {
        Normal = 0,
        Urgent = 1,
        Ask = 2,
    }
}

/// A call handler
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct CallHandler {
    pub object_id: String,
    pub display_name: String,
    pub dtmf_access_id: String,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub is_primary: bool,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub undeletable: bool,
    #[serde(deserialize_with = "wire::flexible_i32")]
    pub language: i32,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub inherit_language: bool,
    pub location_object_id: String,
    pub media_switch_object_id: String,
    pub schedule_set_object_id: String,
    pub recipient_distribution_list_object_id: String,
    pub recipient_subscriber_object_id: String,
    pub partition_object_id: String,
    pub time_zone: String,
    pub voice_name: String,
    #[serde(deserialize_with = "wire::flexible_i32")]
    pub max_msg_len: i32,
    pub after_message_action: ActionType,
    pub after_message_target_conversation: String,
    pub after_message_target_handler_object_id: String,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub edit_msg: bool,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub one_key_delay_enabled: bool,
    #[serde(deserialize_with = "wire::flexible_i32")]
    pub one_key_delay: i32,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub play_after_message: bool,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub play_post_greeting_recording: bool,
    pub post_greeting_recording_object_id: String,
    pub send_urgent_msg: UrgentMessageMode,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub send_secure_msg: bool,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub use_default_language: bool,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub use_default_time_zone: bool,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub use_call_language: bool,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub dispatch_delivery: bool,
    pub tenant_object_id: String,

    #[serde(skip)]
    state: EntityState,
    #[serde(skip)]
    transfer_options: LazyList<TransferOption>,
    #[serde(skip)]
    greetings: LazyList<Greeting>,
    #[serde(skip)]
    menu_entries: LazyList<MenuEntry>,
    #[serde(skip)]
    schedule_set: Lazy<ScheduleSet>,
}

tracked_setters!(CallHandler {
    set_display_name => display_name: String = "DisplayName",
    set_dtmf_access_id => dtmf_access_id: String = "DtmfAccessId",
    set_language => language: i32 = "Language",
    set_inherit_language => inherit_language: bool = "InheritLanguage",
    set_media_switch_object_id => media_switch_object_id: String = "MediaSwitchObjectId",
    set_schedule_set_object_id => schedule_set_object_id: String = "ScheduleSetObjectId",
    set_recipient_distribution_list_object_id => recipient_distribution_list_object_id: String = "RecipientDistributionListObjectId",
    set_recipient_subscriber_object_id => recipient_subscriber_object_id: String = "RecipientSubscriberObjectId",
    set_partition_object_id => partition_object_id: String = "PartitionObjectId",
    set_time_zone => time_zone: String = "TimeZone",
    set_max_msg_len => max_msg_len: i32 = "MaxMsgLen",
    set_after_message_action => after_message_action: ActionType = "AfterMessageAction",
    set_after_message_target_conversation => after_message_target_conversation: String = "AfterMessageTargetConversation",
    set_after_message_target_handler_object_id => after_message_target_handler_object_id: String = "AfterMessageTargetHandlerObjectId",
    set_edit_msg => edit_msg: bool = "EditMsg",
    set_one_key_delay_enabled => one_key_delay_enabled: bool = "OneKeyDelayEnabled",
    set_one_key_delay => one_key_delay: i32 = "OneKeyDelay",
    set_play_after_message => play_after_message: bool = "PlayAfterMessage",
    set_play_post_greeting_recording => play_post_greeting_recording: bool = "PlayPostGreetingRecording",
    set_post_greeting_recording_object_id => post_greeting_recording_object_id: String = "PostGreetingRecordingObjectId",
    set_send_urgent_msg => send_urgent_msg: UrgentMessageMode = "SendUrgentMsg",
    set_send_secure_msg => send_secure_msg: bool = "SendSecureMsg",
    set_use_default_language => use_default_language: bool = "UseDefaultLanguage",
    set_use_default_time_zone => use_default_time_zone: bool = "UseDefaultTimeZone",
    set_use_call_language => use_call_language: bool = "UseCallLanguage",
    set_dispatch_delivery => dispatch_delivery: bool = "DispatchDelivery",
});

impl Resource for CallHandler {
    const ELEMENT: &'static str = "Callhandler";
    const DEFAULT_ROWS_PER_PAGE: u32 = 20;

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

impl CallHandler {
    /// Fetch by id, else by display name, else an empty handler bound to `server`
    pub async fn new(
        server: &ConnectionServer,
        object_id: Option<&str>,
        display_name: Option<&str>,
    ) -> Result<Self> {
        match (non_blank(object_id), non_blank(display_name)) {
            (Some(id), _) => Self::get(server, id).await,
            (None, Some(name)) => Self::get_by_name(server, name).await,
            (None, None) => Ok(Self::empty(server)),
        }
    }

    /// An empty handler bound to `server`, with no identity
    pub fn empty(server: &ConnectionServer) -> Self {
        Self {
            state: EntityState::bound(server),
            ..Default::default()
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

    pub async fn get_by_extension(server: &ConnectionServer, extension: &str) -> Result<Self> {
        server
            .find_object(COLLECTION, "DtmfAccessId", extension)
            .await
    }

    pub async fn list(server: &ConnectionServer, query: &ListQuery) -> Result<Vec<Self>> {
        server.get_objects(COLLECTION, query).await
    }

    /// Create a handler from a template. The template id travels as a
    /// query parameter; everything else goes in the body.
    pub async fn add(
        server: &ConnectionServer,
        template_object_id: &str,
        display_name: &str,
        extension: &str,
        properties: Option<&PropertyList>,
    ) -> Result<WebCallResult> {
        require(template_object_id, "template object id")?;
        require(display_name, "display name")?;
        let mut body = PropertyList::new().with("DisplayName", display_name);
        // Handlers without an extension are allowed
        if !extension.trim().is_empty() {
            body.add("DtmfAccessId", extension);
        }
        if let Some(extra) = properties {
            body.merge(extra);
        }
        let params = [QueryClause::raw(format!(
            "templateObjectId={}",
            template_object_id
        ))];
        server
            .create_object(COLLECTION, &params, Self::ELEMENT, &body)
            .await
    }

    pub async fn add_and_fetch(
        server: &ConnectionServer,
        template_object_id: &str,
        display_name: &str,
        extension: &str,
        properties: Option<&PropertyList>,
    ) -> Result<Self> {
        let result = Self::add(server, template_object_id, display_name, extension, properties)
            .await?;
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

    /// The three transfer rules, fetched on first access
    pub async fn transfer_options(
        &mut self,
        force_refetch: bool,
    ) -> Result<&mut Vec<TransferOption>> {
        self.require_identity()?;
        let server = self.server()?.clone();
        let id = self.object_id.clone();
        self.transfer_options
            .load(force_refetch, || async move {
                TransferOption::list(&server, &id).await
            })
            .await
    }

    /// One transfer rule from the cached set
    pub async fn transfer_option(
        &mut self,
        kind: TransferOptionType,
    ) -> Result<&mut TransferOption> {
        let element = TransferOption::ELEMENT;
        self.transfer_options(false)
            .await?
            .iter_mut()
            .find(|option| option.transfer_option_type == kind)
            .ok_or_else(|| Error::not_found(format!("{} {}", element, kind)))
    }

    /// All greetings, fetched on first access
    pub async fn greetings(&mut self, force_refetch: bool) -> Result<&mut Vec<Greeting>> {
        self.require_identity()?;
        let server = self.server()?.clone();
        let id = self.object_id.clone();
        self.greetings
            .load(force_refetch, || async move { Greeting::list(&server, &id).await })
            .await
    }

    /// One greeting from the cached set
    pub async fn greeting(&mut self, kind: GreetingType) -> Result<&mut Greeting> {
        self.greetings(false)
            .await?
            .iter_mut()
            .find(|greeting| greeting.greeting_type == kind)
            .ok_or_else(|| Error::not_found(format!("Greeting {}", kind)))
    }

    /// All twelve menu entries, fetched on first access
    pub async fn menu_entries(&mut self, force_refetch: bool) -> Result<&mut Vec<MenuEntry>> {
        self.require_identity()?;
        let server = self.server()?.clone();
        let id = self.object_id.clone();
        self.menu_entries
            .load(force_refetch, || async move { MenuEntry::list(&server, &id).await })
            .await
    }

    /// One menu entry from the cached set
    pub async fn menu_entry(&mut self, key: &str) -> Result<&mut MenuEntry> {
        self.menu_entries(false)
            .await?
            .iter_mut()
            .find(|entry| entry.touchtone_key == key)
            .ok_or_else(|| Error::not_found(format!("MenuEntry {}", key)))
    }

    /// The referenced schedule set. Reloaded when `schedule_set_object_id`
    /// no longer matches the cached set.
    pub async fn schedule_set(&mut self, force_refetch: bool) -> Result<&mut ScheduleSet> {
        require(&self.schedule_set_object_id, "schedule set object id")?;
        let stale = self
            .schedule_set
            .cached()
            .is_some_and(|set| set.object_id != self.schedule_set_object_id);
        let server = self.server()?.clone();
        let id = self.schedule_set_object_id.clone();
        self.schedule_set
            .load(force_refetch || stale, || async move {
                ScheduleSet::get(&server, &id).await
            })
            .await
    }

    /// Upload a WAV file as the handler's recorded name
    pub async fn upload_voice_name(&self, wav: &Path) -> Result<WebCallResult> {
        self.require_identity()?;
        self.server()?
            .upload_wav(&format!("{}/voicename", self.item_path()), wav)
            .await
    }

    /// Use a stream already recorded on the server as the recorded name
    pub async fn set_voice_name_from_stream(&self, stream_id: &str) -> Result<WebCallResult> {
        self.require_identity()?;
        self.server()?
            .set_audio_from_stream(&format!("{}/voicename", self.item_path()), stream_id)
            .await
    }
}

impl fmt::Display for CallHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x{}", self.display_name, self.dtmf_access_id)
    }
}
