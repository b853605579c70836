//! Schedule sets and their members
//!
//! A schedule set groups schedules; call handlers reference one to decide
//! between standard and off-hours behaviour. Members link a set to a
//! schedule, optionally as an exclusion (holidays).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::common::non_blank;
use crate::changes::PropertyList;
use crate::error::{Error, Result};
use crate::lazy::LazyList;
use crate::query::ListQuery;
use crate::result::WebCallResult;
use crate::server::{ConnectionServer, require};
use crate::traits::{EntityState, Resource};
use crate::wire::{self, tracked_setters};

const COLLECTION: &str = "schedulesets";

fn item_path(object_id: &str) -> String {
    format!("{}/{}", COLLECTION, object_id)
}

fn members_collection(schedule_set_object_id: &str) -> String {
    format!("{}/schedulesetmembers", item_path(schedule_set_object_id))
}

/// A named group of schedules
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ScheduleSet {
    pub object_id: String,
    pub display_name: String,
    pub owner_location_object_id: String,
    pub owner_subscriber_object_id: String,
    pub tenant_object_id: String,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub undeletable: bool,

    #[serde(skip)]
    state: EntityState,
    #[serde(skip)]
    members: LazyList<ScheduleSetMember>,
}

tracked_setters!(ScheduleSet {
    set_display_name => display_name: String = "DisplayName",
});

impl Resource for ScheduleSet {
    const ELEMENT: &'static str = "ScheduleSet";

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

impl ScheduleSet {
    /// Fetch by id, else by name, else return an empty unbound-to-row instance
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

    /// Create a schedule set owned by a location or by a user (exactly one)
    pub async fn add(
        server: &ConnectionServer,
        display_name: &str,
        owner_location_object_id: Option<&str>,
        owner_subscriber_object_id: Option<&str>,
        properties: Option<&PropertyList>,
    ) -> Result<WebCallResult> {
        require(display_name, "display name")?;
        let mut body = PropertyList::new().with("DisplayName", display_name);
        match (
            non_blank(owner_location_object_id),
            non_blank(owner_subscriber_object_id),
        ) {
            (Some(location), None) => body.add("OwnerLocationObjectId", location),
            (None, Some(subscriber)) => body.add("OwnerSubscriberObjectId", subscriber),
            _ => {
                return Err(Error::invalid_input(
                    "Exactly one of owner location or owner user is required",
                ));
            }
        }
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
        owner_location_object_id: Option<&str>,
        owner_subscriber_object_id: Option<&str>,
        properties: Option<&PropertyList>,
    ) -> Result<Self> {
        let result = Self::add(
            server,
            display_name,
            owner_location_object_id,
            owner_subscriber_object_id,
            properties,
        )
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

    /// Members of this set, fetched on first access
    pub async fn members(&mut self, force_refetch: bool) -> Result<&mut Vec<ScheduleSetMember>> {
        self.require_identity()?;
        let server = self.server()?.clone();
        let id = self.object_id.clone();
        self.members
            .load(force_refetch, || async move {
                ScheduleSetMember::list(&server, &id).await
            })
            .await
    }

    /// Link a schedule to this set. Invalidates the cached member list.
    pub async fn add_member(&mut self, schedule_object_id: &str, exclude: bool) -> Result<WebCallResult> {
        self.require_identity()?;
        let result =
            ScheduleSetMember::add(self.server()?, &self.object_id, schedule_object_id, exclude)
                .await?;
        self.members.invalidate();
        Ok(result)
    }
}

impl fmt::Display for ScheduleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.display_name, self.object_id)
    }
}

/// Link between a schedule set and one schedule
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ScheduleSetMember {
    pub schedule_set_object_id: String,
    pub schedule_object_id: String,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub exclude: bool,

    #[serde(skip)]
    state: EntityState,
}

tracked_setters!(ScheduleSetMember {
    set_exclude => exclude: bool = "Exclude",
});

impl Resource for ScheduleSetMember {
    const ELEMENT: &'static str = "ScheduleSetMember";

    fn object_id(&self) -> &str {
        &self.schedule_object_id
    }

    fn item_path(&self) -> String {
        format!(
            "{}/{}",
            members_collection(&self.schedule_set_object_id),
            self.schedule_object_id
        )
    }

    fn state(&self) -> &EntityState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EntityState {
        &mut self.state
    }
}

impl ScheduleSetMember {
    pub async fn list(server: &ConnectionServer, schedule_set_object_id: &str) -> Result<Vec<Self>> {
        require(schedule_set_object_id, "schedule set object id")?;
        server
            .get_objects(&members_collection(schedule_set_object_id), &ListQuery::new())
            .await
    }

    pub async fn add(
        server: &ConnectionServer,
        schedule_set_object_id: &str,
        schedule_object_id: &str,
        exclude: bool,
    ) -> Result<WebCallResult> {
        require(schedule_set_object_id, "schedule set object id")?;
        require(schedule_object_id, "schedule object id")?;
        let body = PropertyList::new()
            .with("ScheduleSetObjectId", schedule_set_object_id)
            .with("ScheduleObjectId", schedule_object_id)
            .with("Exclude", exclude);
        server
            .create_object(
                &members_collection(schedule_set_object_id),
                &[],
                Self::ELEMENT,
                &body,
            )
            .await
    }

    pub async fn delete_by_id(
        server: &ConnectionServer,
        schedule_set_object_id: &str,
        schedule_object_id: &str,
    ) -> Result<WebCallResult> {
        require(schedule_set_object_id, "schedule set object id")?;
        require(schedule_object_id, "schedule object id")?;
        server
            .delete_object(&format!(
                "{}/{}",
                members_collection(schedule_set_object_id),
                schedule_object_id
            ))
            .await
    }
}
