// # Routing Rules
//
// Rules deciding where an incoming call is sent first. Direct rules apply
// to calls dialed straight to the server, forwarded rules to calls that
// arrive forwarded from a phone. Each rule matches on a set of conditions,
// loaded on first access and cached on the rule.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::common::{ActionType, non_blank};
use crate::changes::PropertyList;
use crate::error::Result;
use crate::lazy::LazyList;
use crate::query::ListQuery;
use crate::result::WebCallResult;
use crate::server::{ConnectionServer, require};
use crate::traits::{EntityState, Resource};
use crate::wire::{self, tracked_setters, wire_enum};

const COLLECTION: &str = "routingrules";

fn item_path(object_id: &str) -> String {
    format!("{}/{}", COLLECTION, object_id)
}

fn conditions_collection(rule_object_id: &str) -> String {
    format!("{}/routingruleconditions", item_path(rule_object_id))
}

wire_enum! {
    /// Which calls a rule applies to
    pub enum RoutingRuleType {
        Direct = 1,
        Forwarded = 2,
        Both = 3,
    }
}

wire_enum! {
    /// Active, inactive or failed rule
    pub enum RoutingRuleState {
        Active = 0,
        Inactive = 1,
        Invalid = 2,
    }
}

wire_enum! {
    /// Call attribute a condition tests
    pub enum RoutingRuleParameter {
        CallingNumber = 1,
        DialedNumber = 2,
        ForwardingStation = 3,
        PortId = 4,
        Origin = 5,
        PhoneSystem = 6,
        Reason = 7,
        Schedule = 8,
    }
}

wire_enum! {
    /// Comparison a condition applies
    pub enum RoutingRuleOperator {
        Equals = 1,
        GreaterThan = 2,
        LessThan = 3,
        LessThanOrEqual = 4,
        GreaterThanOrEqual = 5,
        In = 6,
    }
}

/// A call routing rule
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct RoutingRule {
    pub object_id: String,
    pub display_name: String,
    #[serde(rename = "Type")]
    pub rule_type: RoutingRuleType,
    pub state: RoutingRuleState,
    #[serde(deserialize_with = "wire::flexible_i32")]
    pub rule_index: i32,
    pub route_target_conversation: String,
    pub route_target_handler_object_id: String,
    pub route_action: ActionType,
    #[serde(deserialize_with = "wire::flexible_i32")]
    pub language_code: i32,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub use_default_language: bool,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub use_call_language: bool,
    #[serde(deserialize_with = "wire::flexible_bool")]
    pub undeletable: bool,
    pub search_space_object_id: String,
    pub tenant_object_id: String,

    #[serde(skip)]
    entity: EntityState,
    #[serde(skip)]
    conditions: LazyList<RoutingRuleCondition>,
}

// `State` is a server field, so the change state lives in `entity`
impl RoutingRule {
    pub fn set_display_name(&mut self, value: impl Into<String>) {
        let value = value.into();
        self.entity.record("DisplayName", value.clone());
        self.display_name = value;
    }

    pub fn set_state(&mut self, value: RoutingRuleState) {
        self.entity.record("State", value);
        self.state = value;
    }

    pub fn set_route_target_conversation(&mut self, value: impl Into<String>) {
        let value = value.into();
        self.entity.record("RouteTargetConversation", value.clone());
        self.route_target_conversation = value;
    }

    pub fn set_route_target_handler_object_id(&mut self, value: impl Into<String>) {
        let value = value.into();
        self.entity.record("RouteTargetHandlerObjectId", value.clone());
        self.route_target_handler_object_id = value;
    }

    pub fn set_route_action(&mut self, value: ActionType) {
        self.entity.record("RouteAction", value);
        self.route_action = value;
    }

    pub fn set_language_code(&mut self, value: i32) {
        self.entity.record("LanguageCode", value);
        self.language_code = value;
    }

    pub fn set_use_default_language(&mut self, value: bool) {
        self.entity.record("UseDefaultLanguage", value);
        self.use_default_language = value;
    }

    pub fn set_use_call_language(&mut self, value: bool) {
        self.entity.record("UseCallLanguage", value);
        self.use_call_language = value;
    }

    pub fn set_search_space_object_id(&mut self, value: impl Into<String>) {
        let value = value.into();
        self.entity.record("SearchSpaceObjectId", value.clone());
        self.search_space_object_id = value;
    }
}

impl Resource for RoutingRule {
    const ELEMENT: &'static str = "RoutingRule";

    fn object_id(&self) -> &str {
        &self.object_id
    }

    fn item_path(&self) -> String {
        item_path(&self.object_id)
    }

    fn state(&self) -> &EntityState {
        &self.entity
    }

    fn state_mut(&mut self) -> &mut EntityState {
        &mut self.entity
    }
}

impl RoutingRule {
    pub async fn new(
        server: &ConnectionServer,
        object_id: Option<&str>,
        display_name: Option<&str>,
    ) -> Result<Self> {
        match (non_blank(object_id), non_blank(display_name)) {
            (Some(id), _) => Self::get(server, id).await,
            (None, Some(name)) => Self::get_by_name(server, name).await,
            (None, None) => Ok(Self {
                entity: EntityState::bound(server),
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
        rule_type: RoutingRuleType,
        properties: Option<&PropertyList>,
    ) -> Result<WebCallResult> {
        require(display_name, "display name")?;
        let mut body = PropertyList::new()
            .with("DisplayName", display_name)
            .with("Type", rule_type);
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
        rule_type: RoutingRuleType,
        properties: Option<&PropertyList>,
    ) -> Result<Self> {
        let result = Self::add(server, display_name, rule_type, properties).await?;
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

    /// Conditions of this rule, fetched on first access
    pub async fn conditions(
        &mut self,
        force_refetch: bool,
    ) -> Result<&mut Vec<RoutingRuleCondition>> {
        self.require_identity()?;
        let server = self.server()?.clone();
        let id = self.object_id.clone();
        self.conditions
            .load(force_refetch, || async move {
                RoutingRuleCondition::list(&server, &id).await
            })
            .await
    }

    /// Add a condition. Invalidates the cached condition list.
    pub async fn add_condition(
        &mut self,
        parameter: RoutingRuleParameter,
        operator: RoutingRuleOperator,
        operand: &str,
    ) -> Result<WebCallResult> {
        self.require_identity()?;
        let result = RoutingRuleCondition::add(
            self.server()?,
            &self.object_id,
            parameter,
            operator,
            operand,
        )
        .await?;
        self.conditions.invalidate();
        Ok(result)
    }
}

impl fmt::Display for RoutingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{}, {:?})", self.display_name, self.rule_index, self.rule_type)
    }
}

/// One condition of a routing rule
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct RoutingRuleCondition {
    pub object_id: String,
    pub routing_rule_object_id: String,
    pub parameter: RoutingRuleParameter,
    pub operator: RoutingRuleOperator,
    pub operand_value: String,

    #[serde(skip)]
    state: EntityState,
}

tracked_setters!(RoutingRuleCondition {
    set_parameter => parameter: RoutingRuleParameter = "Parameter",
    set_operator => operator: RoutingRuleOperator = "Operator",
    set_operand_value => operand_value: String = "OperandValue",
});

impl Resource for RoutingRuleCondition {
    const ELEMENT: &'static str = "RoutingRuleCondition";

    fn object_id(&self) -> &str {
        &self.object_id
    }

    fn item_path(&self) -> String {
        format!(
            "{}/{}",
            conditions_collection(&self.routing_rule_object_id),
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

impl RoutingRuleCondition {
    pub async fn get(
        server: &ConnectionServer,
        rule_object_id: &str,
        object_id: &str,
    ) -> Result<Self> {
        require(rule_object_id, "routing rule object id")?;
        require(object_id, "object id")?;
        server
            .get_object(&format!("{}/{}", conditions_collection(rule_object_id), object_id))
            .await
    }

    pub async fn list(server: &ConnectionServer, rule_object_id: &str) -> Result<Vec<Self>> {
        require(rule_object_id, "routing rule object id")?;
        server
            .get_objects(&conditions_collection(rule_object_id), &ListQuery::new())
            .await
    }

    pub async fn add(
        server: &ConnectionServer,
        rule_object_id: &str,
        parameter: RoutingRuleParameter,
        operator: RoutingRuleOperator,
        operand: &str,
    ) -> Result<WebCallResult> {
        require(rule_object_id, "routing rule object id")?;
        require(operand, "operand")?;
        let body = PropertyList::new()
            .with("Parameter", parameter)
            .with("Operator", operator)
            .with("OperandValue", operand);
        server
            .create_object(&conditions_collection(rule_object_id), &[], Self::ELEMENT, &body)
            .await
    }

    pub async fn delete_by_id(
        server: &ConnectionServer,
        rule_object_id: &str,
        object_id: &str,
    ) -> Result<WebCallResult> {
        require(rule_object_id, "routing rule object id")?;
        require(object_id, "object id")?;
        server
            .delete_object(&format!("{}/{}", conditions_collection(rule_object_id), object_id))
            .await
    }
}
