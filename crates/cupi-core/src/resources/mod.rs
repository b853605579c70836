//! Typed server objects
//!
//! One module per resource family. Every type implements
//! [`Resource`](crate::traits::Resource) and offers `get` / `list` and,
//! where the server allows it, `add` / `update_by_id` / `delete_by_id`.

pub mod alternate_extension;
pub mod call_handler;
pub mod call_handler_template;
pub mod common;
pub mod directory_handler;
pub mod external_service;
pub mod greeting;
pub mod menu_entry;
pub mod mwi;
pub mod phone_system;
pub mod port;
pub mod port_group_server;
pub mod post_greeting_recording;
pub mod restriction_table;
pub mod routing_rule;
pub mod schedule_set;
pub mod tenant;
pub mod transfer_option;

pub use alternate_extension::AlternateExtension;
pub use call_handler::{CallHandler, UrgentMessageMode};
pub use call_handler_template::{CallHandlerTemplate, TemplateRecipient};
pub use common::ActionType;
pub use directory_handler::{DirectoryHandler, DirectoryHandlerStreamFile, SearchByType};
pub use external_service::{AuthenticationMode, ExternalService, ServerType};
pub use greeting::{Greeting, GreetingType, PlayWhat};
pub use menu_entry::{MenuEntry, TOUCHTONE_KEYS};
pub use mwi::Mwi;
pub use phone_system::PhoneSystem;
pub use port::Port;
pub use port_group_server::{MediaRemoteServiceType, PortGroupServer};
pub use post_greeting_recording::{PostGreetingRecording, PostGreetingRecordingStreamFile};
pub use restriction_table::{RestrictionPattern, RestrictionTable};
pub use routing_rule::{
    RoutingRule, RoutingRuleCondition, RoutingRuleOperator, RoutingRuleParameter,
    RoutingRuleState, RoutingRuleType,
};
pub use schedule_set::{ScheduleSet, ScheduleSetMember};
pub use tenant::Tenant;
pub use transfer_option::{
    TransferAction, TransferHoldingMode, TransferOption, TransferOptionType, TransferType,
};
