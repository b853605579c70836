// # Restriction Tables
//
// Ordered dial-string patterns deciding which numbers users and handlers
// may transfer or deliver messages to. A table's patterns are evaluated in
// `SequenceNumber` order; the first match wins. Patterns are loaded on
// first access and cached on the table.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::common::non_blank;
use crate::changes::PropertyList;
use crate::error::{Error, Result};
use crate::lazy::LazyList;
use crate::query::{ListQuery, SortOrder};
use crate::result::WebCallResult;
use crate::server::{ConnectionServer, require};
use crate::traits::{EntityState, Resource};
use crate::wire::{self, tracked_setters};

const COLLECTION: &str = "restrictiontables";

fn item_path(object_id: &str) -> String {
    format!("{}/{}", COLLECTION, object_id)
}

fn patterns_collection(table_object_id: &str) -> String {
    format!("{}/restrictionpatterns", item_path(table_object_id))
}

/// Characters a restriction pattern may contain
fn is_valid_pattern(pattern: &str) -> bool {
    !pattern.is_empty()
        && pattern
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '*' | '?' | '#'))
}

/// A restriction table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct RestrictionTable {
    pub object_id: String,
    pub display_name: String,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub default_blocked: bool,
    #[serde(deserialize_with = "wire::flexible_i32")]
    pub max_digits: i32,
    #[serde(deserialize_with = "wire::flexible_i32")]
    pub min_digits: i32,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub undeletable: bool,
    pub location_object_id: String,
    pub tenant_object_id: String,

    #[serde(skip)]
    state: EntityState,
    #[serde(skip)]
    patterns: LazyList<RestrictionPattern>,
}

tracked_setters!(RestrictionTable {
    set_display_name => display_name: String = "DisplayName",
    set_default_blocked => default_blocked: bool = "DefaultBlocked",
    set_max_digits => max_digits: i32 = "MaxDigits",
    set_min_digits => min_digits: i32 = "MinDigits",
});

impl Resource for RestrictionTable {
    const ELEMENT: &'static str = "RestrictionTable";

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

impl RestrictionTable {
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

    /// Patterns in evaluation order, fetched on first access
    pub async fn patterns(&mut self, force_refetch: bool) -> Result<&mut Vec<RestrictionPattern>> {
        self.require_identity()?;
        let server = self.server()?.clone();
        let id = self.object_id.clone();
        self.patterns
            .load(force_refetch, || async move {
                RestrictionPattern::list(&server, &id).await
            })
            .await
    }

    /// Append a pattern. Invalidates the cached pattern list.
    pub async fn add_pattern(&mut self, pattern: &str, blocked: bool) -> Result<WebCallResult> {
        self.require_identity()?;
        let result =
            RestrictionPattern::add(self.server()?, &self.object_id, pattern, blocked).await?;
        self.patterns.invalidate();
        Ok(result)
    }
}

impl fmt::Display for RestrictionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.display_name, self.object_id)
    }
}

/// One dial-string pattern of a restriction table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct RestrictionPattern {
    pub object_id: String,
    pub restriction_table_object_id: String,
    pub numeric_pattern: String,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub blocked: bool,
    #[serde(deserialize_with = "wire::flexible_i32")]
    pub sequence_number: i32,

    #[serde(skip)]
    state: EntityState,
}

tracked_setters!(RestrictionPattern {
    set_numeric_pattern => numeric_pattern: String = "NumericPattern",
    set_blocked => blocked: bool = "Blocked",
    set_sequence_number => sequence_number: i32 = "SequenceNumber",
});

impl Resource for RestrictionPattern {
    const ELEMENT: &'static str = "RestrictionPattern";

    fn object_id(&self) -> &str {
        &self.object_id
    }

    fn item_path(&self) -> String {
        format!(
            "{}/{}",
            patterns_collection(&self.restriction_table_object_id),
            self.object_id
        )
    }

    fn state(&self) -> &EntityState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EntityState {
        &mut self.state
    }
}

impl RestrictionPattern {
    pub async fn get(
        server: &ConnectionServer,
        table_object_id: &str,
        object_id: &str,
    ) -> Result<Self> {
        require(table_object_id, "restriction table object id")?;
        require(object_id, "object id")?;
        server
            .get_object(&format!("{}/{}", patterns_collection(table_object_id), object_id))
            .await
    }

    /// All patterns of a table, lowest sequence number first
    pub async fn list(server: &ConnectionServer, table_object_id: &str) -> Result<Vec<Self>> {
        require(table_object_id, "restriction table object id")?;
        let query = ListQuery::new().sort("SequenceNumber", SortOrder::Asc);
        server
            .get_objects(&patterns_collection(table_object_id), &query)
            .await
    }

    pub async fn add(
        server: &ConnectionServer,
        table_object_id: &str,
        pattern: &str,
        blocked: bool,
    ) -> Result<WebCallResult> {
        require(table_object_id, "restriction table object id")?;
        if !is_valid_pattern(pattern) {
            return Err(Error::invalid_input(format!(
                "Invalid restriction pattern: {:?}",
                pattern
            )));
        }
        let body = PropertyList::new()
            .with("NumericPattern", pattern)
            .with("Blocked", blocked);
        server
            .create_object(&patterns_collection(table_object_id), &[], Self::ELEMENT, &body)
            .await
    }

    pub async fn update_by_id(
        server: &ConnectionServer,
        table_object_id: &str,
        object_id: &str,
        properties: &PropertyList,
    ) -> Result<WebCallResult> {
        require(table_object_id, "restriction table object id")?;
        require(object_id, "object id")?;
        server
            .update_object(
                &format!("{}/{}", patterns_collection(table_object_id), object_id),
                Self::ELEMENT,
                properties,
            )
            .await
    }

    pub async fn delete_by_id(
        server: &ConnectionServer,
        table_object_id: &str,
        object_id: &str,
    ) -> Result<WebCallResult> {
        require(table_object_id, "restriction table object id")?;
        require(object_id, "object id")?;
        server
            .delete_object(&format!("{}/{}", patterns_collection(table_object_id), object_id))
            .await
    }
}

impl fmt::Display for RestrictionPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {}",
            self.sequence_number,
            self.numeric_pattern,
            if self.blocked { "blocked" } else { "allowed" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_validation() {
        assert!(is_valid_pattern("9011*"));
        assert!(is_valid_pattern("91??????????"));
        assert!(is_valid_pattern("#"));
        assert!(!is_valid_pattern(""));
        assert!(!is_valid_pattern("9 011"));
        assert!(!is_valid_pattern("91-555"));
    }

    #[test]
    fn test_pattern_display() {
        let pattern: RestrictionPattern = serde_json::from_str(
            r#"{"ObjectId":"p1","RestrictionTableObjectId":"t1","NumericPattern":"9011*",
                "Blocked":"true","SequenceNumber":"0"}"#,
        )
        .unwrap();
        assert_eq!(pattern.to_string(), "0: 9011* blocked");
        assert_eq!(pattern.item_path(), "restrictiontables/t1/restrictionpatterns/p1");
    }
}
