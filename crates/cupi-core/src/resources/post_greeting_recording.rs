// # Post Greeting Recordings
//
// Recordings played after a handler's greeting (legal notices, "this call
// may be recorded"). Audio lives in per-language stream files under
// `postgreetingrecordingstreamfiles/{language}`; the list of stream files
// is loaded on first access and cached.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use super::common::non_blank;
use crate::changes::PropertyList;
use crate::error::Result;
use crate::lazy::LazyList;
use crate::query::ListQuery;
use crate::result::WebCallResult;
use crate::server::{ConnectionServer, require};
use crate::traits::{EntityState, Resource};
use crate::wire::{self, tracked_setters};

const COLLECTION: &str = "postgreetingrecordings";

fn item_path(object_id: &str) -> String {
    format!("{}/{}", COLLECTION, object_id)
}

fn stream_files_collection(recording_object_id: &str) -> String {
    format!(
        "{}/postgreetingrecordingstreamfiles",
        item_path(recording_object_id)
    )
}

fn stream_file_path(recording_object_id: &str, language_code: i32) -> String {
    format!(
        "{}/{}",
        stream_files_collection(recording_object_id),
        language_code
    )
}

/// A post greeting recording
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct PostGreetingRecording {
    pub object_id: String,
    pub display_name: String,
    pub tenant_object_id: String,

    #[serde(skip)]
    state: EntityState,
    #[serde(skip)]
    stream_files: LazyList<PostGreetingRecordingStreamFile>,
}

tracked_setters!(PostGreetingRecording {
    set_display_name => display_name: String = "DisplayName",
});

impl Resource for PostGreetingRecording {
    const ELEMENT: &'static str = "PostGreetingRecording";

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

impl PostGreetingRecording {
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

    pub async fn delete_by_id(server: &ConnectionServer, object_id: &str) -> Result<WebCallResult> {
        require(object_id, "object id")?;
        server.delete_object(&item_path(object_id)).await
    }

    /// Stream files, one per recorded language, fetched on first access
    pub async fn stream_files(
        &mut self,
        force_refetch: bool,
    ) -> Result<&mut Vec<PostGreetingRecordingStreamFile>> {
        self.require_identity()?;
        let server = self.server()?.clone();
        let id = self.object_id.clone();
        self.stream_files
            .load(force_refetch, || async move {
                PostGreetingRecordingStreamFile::list(&server, &id).await
            })
            .await
    }

    /// Upload a recording for one language. Invalidates the cached stream
    /// files.
    pub async fn upload_recording(&mut self, language_code: i32, wav: &Path) -> Result<WebCallResult> {
        self.require_identity()?;
        let path = format!("{}/audio", stream_file_path(&self.object_id, language_code));
        let result = self.server()?.upload_wav(&path, wav).await?;
        self.stream_files.invalidate();
        Ok(result)
    }

    /// Use a stream already recorded on the server for one language
    pub async fn set_recording_from_stream(
        &mut self,
        language_code: i32,
        stream_id: &str,
    ) -> Result<WebCallResult> {
        self.require_identity()?;
        let path = format!("{}/audio", stream_file_path(&self.object_id, language_code));
        let result = self.server()?.set_audio_from_stream(&path, stream_id).await?;
        self.stream_files.invalidate();
        Ok(result)
    }
}

impl fmt::Display for PostGreetingRecording {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.display_name, self.object_id)
    }
}

/// Audio of a post greeting recording in one language
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct PostGreetingRecordingStreamFile {
    pub post_greeting_recording_object_id: String,
    #[serde(deserialize_with = "wire::flexible_i32")]
    pub language_code: i32,
    pub stream_file: String,

    #[serde(skip)]
    state: EntityState,
}

impl Resource for PostGreetingRecordingStreamFile {
    const ELEMENT: &'static str = "PostGreetingRecordingStreamFile";

    fn object_id(&self) -> &str {
        &self.stream_file
    }

    fn item_path(&self) -> String {
        stream_file_path(&self.post_greeting_recording_object_id, self.language_code)
    }

    fn state(&self) -> &EntityState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EntityState {
        &mut self.state
    }
}

impl PostGreetingRecordingStreamFile {
    pub async fn get(
        server: &ConnectionServer,
        recording_object_id: &str,
        language_code: i32,
    ) -> Result<Self> {
        require(recording_object_id, "post greeting recording object id")?;
        server
            .get_object(&stream_file_path(recording_object_id, language_code))
            .await
    }

    pub async fn list(server: &ConnectionServer, recording_object_id: &str) -> Result<Vec<Self>> {
        require(recording_object_id, "post greeting recording object id")?;
        server
            .get_objects(&stream_files_collection(recording_object_id), &ListQuery::new())
            .await
    }

    /// Remove this language's recording
    pub async fn delete_by_language(
        server: &ConnectionServer,
        recording_object_id: &str,
        language_code: i32,
    ) -> Result<WebCallResult> {
        require(recording_object_id, "post greeting recording object id")?;
        server
            .delete_object(&stream_file_path(recording_object_id, language_code))
            .await
    }

    /// Replace this language's recording with a local WAV file
    pub async fn upload_wav(&self, wav: &Path) -> Result<WebCallResult> {
        require(
            &self.post_greeting_recording_object_id,
            "post greeting recording object id",
        )?;
        self.server()?
            .upload_wav(&format!("{}/audio", self.item_path()), wav)
            .await
    }
}
