//! Greetings of a call handler
//!
//! Every call handler has a fixed set of greetings keyed by type. They are
//! fetched and updated through the owning handler, cannot be created or
//! deleted, and carry per-language recordings under `greetingstreamfiles`.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use super::common::{ActionType, disabled_expiry, is_active, segment};
use crate::changes::PropertyList;
use crate::error::{Error, Result};
use crate::query::ListQuery;
use crate::result::WebCallResult;
use crate::server::{ConnectionServer, require};
use crate::traits::{EntityState, Resource};
use crate::wire::{self, tracked_setters, wire_enum};

/// Greeting slots of a call handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GreetingType {
    #[default]
    Standard,
    #[serde(rename = "Off Hours")]
    OffHours,
    Alternate,
    Busy,
    Error,
    Internal,
    Holiday,
}

impl GreetingType {
    pub fn as_str(self) -> &'static str {
        match self {
            GreetingType::Standard => "Standard",
            GreetingType::OffHours => "Off Hours",
            GreetingType::Alternate => "Alternate",
            GreetingType::Busy => "Busy",
            GreetingType::Error => "Error",
            GreetingType::Internal => "Internal",
            GreetingType::Holiday => "Holiday",
        }
    }
}

impl fmt::Display for GreetingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

wire_enum! {
    /// Source of the audio played for a greeting
    pub enum PlayWhat {
        SystemDefault = 0,
        Recording = 1,
        Nothing = 2,
    }
}

fn collection(call_handler_object_id: &str) -> String {
    format!("handlers/callhandlers/{}/greetings", call_handler_object_id)
}

fn item_path(call_handler_object_id: &str, kind: GreetingType) -> String {
    format!(
        "{}/{}",
        collection(call_handler_object_id),
        segment(kind.as_str())
    )
}

/// One greeting of a call handler
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Greeting {
    pub call_handler_object_id: String,
    pub greeting_type: GreetingType,
    pub after_greeting_action: ActionType,
    pub after_greeting_target_conversation: String,
    pub after_greeting_target_handler_object_id: String,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub enable_transfer: bool,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub ignore_digits: bool,
    pub play_what: PlayWhat,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub play_record_message_prompt: bool,
    #[serde(deserialize_with = "wire::flexible_i32")]
    pub reprompt_delay: i32,
    #[serde(deserialize_with = "wire::flexible_i32")]
    pub reprompts: i32,
    #[serde(deserialize_with = "wire::optional_datetime")]
    pub time_expires: Option<NaiveDateTime>,

    #[serde(skip)]
    state: EntityState,
}

tracked_setters!(Greeting {
    set_after_greeting_action => after_greeting_action: ActionType = "AfterGreetingAction",
    set_after_greeting_target_conversation => after_greeting_target_conversation: String = "AfterGreetingTargetConversation",
    set_after_greeting_target_handler_object_id => after_greeting_target_handler_object_id: String = "AfterGreetingTargetHandlerObjectId",
    set_enable_transfer => enable_transfer: bool = "EnableTransfer",
    set_ignore_digits => ignore_digits: bool = "IgnoreDigits",
    set_play_what => play_what: PlayWhat = "PlayWhat",
    set_play_record_message_prompt => play_record_message_prompt: bool = "PlayRecordMessagePrompt",
    set_reprompt_delay => reprompt_delay: i32 = "RepromptDelay",
    set_reprompts => reprompts: i32 = "Reprompts",
    set_time_expires => time_expires: Option<NaiveDateTime> = "TimeExpires",
});

impl Resource for Greeting {
    const ELEMENT: &'static str = "Greeting";
    const DELETABLE: bool = false;

    fn object_id(&self) -> &str {
        self.greeting_type.as_str()
    }

    fn item_path(&self) -> String {
        item_path(&self.call_handler_object_id, self.greeting_type)
    }

    fn state(&self) -> &EntityState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EntityState {
        &mut self.state
    }
}

impl Greeting {
    pub async fn get(
        server: &ConnectionServer,
        call_handler_object_id: &str,
        kind: GreetingType,
    ) -> Result<Self> {
        require(call_handler_object_id, "call handler object id")?;
        server
            .get_object(&item_path(call_handler_object_id, kind))
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
        kind: GreetingType,
        properties: &PropertyList,
    ) -> Result<WebCallResult> {
        require(call_handler_object_id, "call handler object id")?;
        server
            .update_object(&item_path(call_handler_object_id, kind), Self::ELEMENT, properties)
            .await
    }

    /// The standard greeting is always enabled
    pub fn is_enabled(&self) -> bool {
        self.greeting_type == GreetingType::Standard
            || is_active(self.time_expires, Local::now().naive_local())
    }

    pub fn enable_until(&mut self, until: Option<NaiveDateTime>) {
        self.set_time_expires(until);
    }

    pub fn disable(&mut self) -> Result<()> {
        if self.greeting_type == GreetingType::Standard {
            return Err(Error::invalid_input(
                "The standard greeting cannot be disabled",
            ));
        }
        self.set_time_expires(disabled_expiry());
        Ok(())
    }

    fn audio_path(&self, language_code: i32) -> String {
        format!(
            "{}/greetingstreamfiles/{}/audio",
            self.item_path(),
            language_code
        )
    }

    /// Upload a WAV recording for one language
    pub async fn upload_wav(&self, language_code: i32, wav: &Path) -> Result<WebCallResult> {
        require(&self.call_handler_object_id, "call handler object id")?;
        self.server()?
            .upload_wav(&self.audio_path(language_code), wav)
            .await
    }

    /// Use a stream already recorded on the server for one language
    pub async fn set_recording_from_stream(
        &self,
        language_code: i32,
        stream_id: &str,
    ) -> Result<WebCallResult> {
        require(&self.call_handler_object_id, "call handler object id")?;
        self.server()?
            .set_audio_from_stream(&self.audio_path(language_code), stream_id)
            .await
    }
}

impl fmt::Display for Greeting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} greeting ({})",
            self.greeting_type,
            if self.is_enabled() { "enabled" } else { "disabled" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_greeting() {
        let greeting: Greeting = serde_json::from_str(
            r#"{"CallHandlerObjectId":"ch1","GreetingType":"Busy","PlayWhat":"1",
                "AfterGreetingAction":"4","Reprompts":"0","IgnoreDigits":"false"}"#,
        )
        .unwrap();
        assert_eq!(greeting.greeting_type, GreetingType::Busy);
        assert_eq!(greeting.play_what, PlayWhat::Recording);
        assert_eq!(greeting.after_greeting_action, ActionType::TakeMessage);
        assert!(greeting.is_enabled());
        assert_eq!(greeting.item_path(), "handlers/callhandlers/ch1/greetings/Busy");
        assert_eq!(
            greeting.audio_path(1033),
            "handlers/callhandlers/ch1/greetings/Busy/greetingstreamfiles/1033/audio"
        );
    }

    #[test]
    fn test_greeting_not_deletable_locally() {
        let greeting = Greeting::default();
        let err = tokio_test::block_on(greeting.delete()).unwrap_err();
        assert!(err.is_caller_error());
    }
}
