// # Directory Handlers
//
// Name-lookup applications: callers spell or say a name and are transferred
// to the matching user. Each handler has per-language greeting stream files
// under `directoryhandlerstreamfiles/{language}`, loaded on first access.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use super::common::{ActionType, non_blank};
use crate::changes::PropertyList;
use crate::error::Result;
use crate::lazy::LazyList;
use crate::query::ListQuery;
use crate::result::WebCallResult;
use crate::server::{ConnectionServer, require};
use crate::traits::{EntityState, Resource};
use crate::wire::{self, tracked_setters, wire_enum};

const COLLECTION: &str = "handlers/directoryhandlers";

fn item_path(object_id: &str) -> String {
    format!("{}/{}", COLLECTION, object_id)
}

fn stream_files_collection(directory_handler_object_id: &str) -> String {
    format!(
        "{}/directoryhandlerstreamfiles",
        item_path(directory_handler_object_id)
    )
}

wire_enum! {
    /// How callers search the directory
    pub enum SearchByType {
        LastNameFirst = 1,
        FirstNameFirst = 2,
    }
}

/// A directory handler
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct DirectoryHandler {
    pub object_id: String,
    pub display_name: String,
    pub dtmf_access_id: String,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub voice_enabled: bool,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub auto_route: bool,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub say_extension: bool,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub say_city: bool,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub say_department: bool,
    pub search_by_first_name: SearchByType,
    #[serde(deserialize_with = "wire::flexible_i32")]
    pub tries: i32,
    #[serde(deserialize_with = "wire::flexible_i32")]
    pub menu_style: i32,
    #[serde(deserialize_with = "wire::flexible_i32")]
    pub language: i32,
    pub exit_action: ActionType,
    pub exit_target_conversation: String,
    pub exit_target_handler_object_id: String,
    pub no_input_action: ActionType,
    pub no_input_target_conversation: String,
    pub no_input_target_handler_object_id: String,
    pub zero_action: ActionType,
    pub zero_target_conversation: String,
    pub zero_target_handler_object_id: String,
    pub partition_object_id: String,
    pub search_scope_object_id: String,
    pub location_object_id: String,
    pub voice_name: String,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub undeletable: bool,
    pub tenant_object_id: String,

    #[serde(skip)]
    state: EntityState,
    #[serde(skip)]
    stream_files: LazyList<DirectoryHandlerStreamFile>,
}

tracked_setters!(DirectoryHandler {
    set_display_name => display_name: String = "DisplayName",
    set_dtmf_access_id => dtmf_access_id: String = "DtmfAccessId",
    set_auto_route => auto_route: bool = "AutoRoute",
    set_say_extension => say_extension: bool = "SayExtension",
    set_say_city => say_city: bool = "SayCity",
    set_say_department => say_department: bool = "SayDepartment",
    set_search_by_first_name => search_by_first_name: SearchByType = "SearchByFirstName",
    set_tries => tries: i32 = "Tries",
    set_menu_style => menu_style: i32 = "MenuStyle",
    set_language => language: i32 = "Language",
    set_exit_action => exit_action: ActionType = "ExitAction",
    set_exit_target_conversation => exit_target_conversation: String = "ExitTargetConversation",
    set_exit_target_handler_object_id => exit_target_handler_object_id: String = "ExitTargetHandlerObjectId",
    set_no_input_action => no_input_action: ActionType = "NoInputAction",
    set_no_input_target_conversation => no_input_target_conversation: String = "NoInputTargetConversation",
    set_no_input_target_handler_object_id => no_input_target_handler_object_id: String = "NoInputTargetHandlerObjectId",
    set_zero_action => zero_action: ActionType = "ZeroAction",
    set_zero_target_conversation => zero_target_conversation: String = "ZeroTargetConversation",
    set_zero_target_handler_object_id => zero_target_handler_object_id: String = "ZeroTargetHandlerObjectId",
    set_partition_object_id => partition_object_id: String = "PartitionObjectId",
    set_search_scope_object_id => search_scope_object_id: String = "SearchScopeObjectId",
});

impl Resource for DirectoryHandler {
    const ELEMENT: &'static str = "DirectoryHandler";
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

impl DirectoryHandler {
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

    /// Create a handler; `voice_enabled` cannot be changed afterwards
    pub async fn add(
        server: &ConnectionServer,
        display_name: &str,
        voice_enabled: bool,
        properties: Option<&PropertyList>,
    ) -> Result<WebCallResult> {
        require(display_name, "display name")?;
        let mut body = PropertyList::new()
            .with("DisplayName", display_name)
            .with("VoiceEnabled", voice_enabled);
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
        voice_enabled: bool,
        properties: Option<&PropertyList>,
    ) -> Result<Self> {
        let result = Self::add(server, display_name, voice_enabled, properties).await?;
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

    /// Greeting stream files, one per language, fetched on first access
    pub async fn stream_files(
        &mut self,
        force_refetch: bool,
    ) -> Result<&mut Vec<DirectoryHandlerStreamFile>> {
        self.require_identity()?;
        let server = self.server()?.clone();
        let id = self.object_id.clone();
        self.stream_files
            .load(force_refetch, || async move {
                DirectoryHandlerStreamFile::list(&server, &id).await
            })
            .await
    }

    /// Upload a greeting recording for one language. Invalidates the cached
    /// stream files.
    pub async fn upload_greeting(&mut self, language_code: i32, wav: &Path) -> Result<WebCallResult> {
        self.require_identity()?;
        let path = format!(
            "{}/{}/audio",
            stream_files_collection(&self.object_id),
            language_code
        );
        let result = self.server()?.upload_wav(&path, wav).await?;
        self.stream_files.invalidate();
        Ok(result)
    }

    pub async fn upload_voice_name(&self, wav: &Path) -> Result<WebCallResult> {
        self.require_identity()?;
        self.server()?
            .upload_wav(&format!("{}/voicename", self.item_path()), wav)
            .await
    }

    pub async fn set_voice_name_from_stream(&self, stream_id: &str) -> Result<WebCallResult> {
        self.require_identity()?;
        self.server()?
            .set_audio_from_stream(&format!("{}/voicename", self.item_path()), stream_id)
            .await
    }
}

impl fmt::Display for DirectoryHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x{}", self.display_name, self.dtmf_access_id)
    }
}

/// Greeting recording of a directory handler in one language
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct DirectoryHandlerStreamFile {
    pub directory_handler_object_id: String,
    #[serde(deserialize_with = "wire::flexible_i32")]
    pub language_code: i32,
    pub stream_file: String,

    #[serde(skip)]
    state: EntityState,
}

impl Resource for DirectoryHandlerStreamFile {
    const ELEMENT: &'static str = "DirectoryHandlerStreamFile";
    const DELETABLE: bool = false;

    fn object_id(&self) -> &str {
        &self.stream_file
    }

    fn item_path(&self) -> String {
        format!(
            "{}/{}",
            stream_files_collection(&self.directory_handler_object_id),
            self.language_code
        )
    }

    fn state(&self) -> &EntityState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EntityState {
        &mut self.state
    }
}

impl DirectoryHandlerStreamFile {
    pub async fn get(
        server: &ConnectionServer,
        directory_handler_object_id: &str,
        language_code: i32,
    ) -> Result<Self> {
        require(directory_handler_object_id, "directory handler object id")?;
        server
            .get_object(&format!(
                "{}/{}",
                stream_files_collection(directory_handler_object_id),
                language_code
            ))
            .await
    }

    pub async fn list(
        server: &ConnectionServer,
        directory_handler_object_id: &str,
    ) -> Result<Vec<Self>> {
        require(directory_handler_object_id, "directory handler object id")?;
        server
            .get_objects(
                &stream_files_collection(directory_handler_object_id),
                &ListQuery::new(),
            )
            .await
    }

    /// Replace this language's recording with a local WAV file
    pub async fn upload_wav(&self, wav: &Path) -> Result<WebCallResult> {
        require(&self.directory_handler_object_id, "directory handler object id")?;
        self.server()?
            .upload_wav(&format!("{}/audio", self.item_path()), wav)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_file_paths() {
        let file: DirectoryHandlerStreamFile = serde_json::from_str(
            r#"{"DirectoryHandlerObjectId":"dh1","LanguageCode":"1033","StreamFile":"abc.wav"}"#,
        )
        .unwrap();
        assert_eq!(
            file.item_path(),
            "handlers/directoryhandlers/dh1/directoryhandlerstreamfiles/1033"
        );
        assert_eq!(file.object_id(), "abc.wav");
    }

    #[test]
    fn test_deserialize_handler() {
        let handler: DirectoryHandler = serde_json::from_str(
            r#"{"ObjectId":"dh1","DisplayName":"Company Directory","DtmfAccessId":"411",
                "VoiceEnabled":"false","SearchByFirstName":"1","Tries":"3"}"#,
        )
        .unwrap();
        assert_eq!(handler.search_by_first_name, SearchByType::LastNameFirst);
        assert_eq!(handler.tries, 3);
        assert_eq!(handler.to_string(), "Company Directory x411");
        assert!(!handler.has_pending_changes());
    }
}
