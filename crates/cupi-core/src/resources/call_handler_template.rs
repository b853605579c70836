//! Templates new call handlers are created from

use serde::{Deserialize, Serialize};
use std::fmt;

use super::common::{ActionType, non_blank};
use crate::changes::PropertyList;
use crate::error::{Error, Result};
use crate::query::ListQuery;
use crate::result::WebCallResult;
use crate::server::{ConnectionServer, require};
use crate::traits::{EntityState, Resource};
use crate::wire::{self, tracked_setters};

const COLLECTION: &str = "callhandlertemplates";

fn item_path(object_id: &str) -> String {
    format!("{}/{}", COLLECTION, object_id)
}

/// Who receives messages left in handlers created from a template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateRecipient<'a> {
    DistributionList(&'a str),
    User(&'a str),
}

impl TemplateRecipient<'_> {
    fn field(&self) -> (&'static str, &str) {
        match self {
            TemplateRecipient::DistributionList(id) => ("RecipientDistributionListObjectId", id),
            TemplateRecipient::User(id) => ("RecipientSubscriberObjectId", id),
        }
    }
}

/// A call handler template
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct CallHandlerTemplate {
    pub object_id: String,
    pub display_name: String,
    pub media_switch_object_id: String,
    pub recipient_distribution_list_object_id: String,
    pub recipient_subscriber_object_id: String,
    pub location_object_id: String,
    pub schedule_set_object_id: String,
    pub partition_object_id: String,
    #[serde(deserialize_with = "wire::flexible_i32")]
    pub language: i32,
    #[serde(deserialize_with = "wire::flexible_i32")]
    pub max_msg_len: i32,
    pub after_message_action: ActionType,
    pub after_message_target_conversation: String,
    pub after_message_target_handler_object_id: String,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub edit_msg: bool,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub is_default_template: bool,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub undeletable: bool,
    pub tenant_object_id: String,

    #[serde(skip)]
    state: EntityState,
}

tracked_setters!(CallHandlerTemplate {
    set_display_name => display_name: String = "DisplayName",
    set_media_switch_object_id => media_switch_object_id: String = "MediaSwitchObjectId",
    set_recipient_distribution_list_object_id => recipient_distribution_list_object_id: String = "RecipientDistributionListObjectId",
    set_recipient_subscriber_object_id => recipient_subscriber_object_id: String = "RecipientSubscriberObjectId",
    set_schedule_set_object_id => schedule_set_object_id: String = "ScheduleSetObjectId",
    set_partition_object_id => partition_object_id: String = "PartitionObjectId",
    set_language => language: i32 = "Language",
    set_max_msg_len => max_msg_len: i32 = "MaxMsgLen",
    set_after_message_action => after_message_action: ActionType = "AfterMessageAction",
    set_after_message_target_conversation => after_message_target_conversation: String = "AfterMessageTargetConversation",
    set_after_message_target_handler_object_id => after_message_target_handler_object_id: String = "AfterMessageTargetHandlerObjectId",
    set_edit_msg => edit_msg: bool = "EditMsg",
});

impl Resource for CallHandlerTemplate {
    const ELEMENT: &'static str = "CallhandlerTemplate";

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

impl CallHandlerTemplate {
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
        media_switch_object_id: &str,
        recipient: TemplateRecipient<'_>,
        properties: Option<&PropertyList>,
    ) -> Result<WebCallResult> {
        require(display_name, "display name")?;
        require(media_switch_object_id, "media switch object id")?;
        let (recipient_field, recipient_id) = recipient.field();
        if recipient_id.trim().is_empty() {
            return Err(Error::invalid_input("recipient object id is required"));
        }
        let mut body = PropertyList::new()
            .with("DisplayName", display_name)
            .with("MediaSwitchObjectId", media_switch_object_id)
            .with(recipient_field, recipient_id);
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
        media_switch_object_id: &str,
        recipient: TemplateRecipient<'_>,
        properties: Option<&PropertyList>,
    ) -> Result<Self> {
        let result =
            Self::add(server, display_name, media_switch_object_id, recipient, properties).await?;
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

impl fmt::Display for CallHandlerTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.display_name, self.object_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipient_field() {
        assert_eq!(
            TemplateRecipient::User("u1").field(),
            ("RecipientSubscriberObjectId", "u1")
        );
        assert_eq!(
            TemplateRecipient::DistributionList("dl1").field(),
            ("RecipientDistributionListObjectId", "dl1")
        );
    }

    #[test]
    fn test_deserialize_template() {
        let template: CallHandlerTemplate = serde_json::from_str(
            r#"{"ObjectId":"t1","DisplayName":"System Call Handler Template",
                "IsDefaultTemplate":"true","MaxMsgLen":"300"}"#,
        )
        .unwrap();
        assert!(template.is_default_template);
        assert_eq!(template.max_msg_len, 300);
        assert_eq!(template.item_path(), "callhandlertemplates/t1");
    }
}
