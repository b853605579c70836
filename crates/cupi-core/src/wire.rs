// # Wire Decoding
//
// The server's JSON is loosely typed:
//
// - booleans and integers arrive as strings (`"true"`, `"1"`, `""`)
// - a list response is `{"@total":"N","<Element>":[...]}`, where the
//   element is a bare object when exactly one row matched and is missing
//   when none did
// - enumerations are integer codes
//
// Everything here turns that into plain Rust values.

use chrono::NaiveDateTime;
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
];

/// Accepts `true`, `"true"`, `"1"`, `1`; empty and null are `false`
pub fn flexible_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Bool(value) => Ok(value),
        Value::Null => Ok(false),
        Value::Number(number) => Ok(number.as_f64().unwrap_or(0.0) != 0.0),
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" | "" => Ok(false),
            other => Err(de::Error::custom(format!("invalid boolean: {}", other))),
        },
        other => Err(de::Error::custom(format!("invalid boolean: {}", other))),
    }
}

/// Accepts `5`, `"5"`; empty and null are `0`
pub fn flexible_i64<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(0),
        Value::Bool(value) => Ok(i64::from(value)),
        Value::Number(number) => number
            .as_i64()
            .ok_or_else(|| de::Error::custom(format!("invalid integer: {}", number))),
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(0);
            }
            text.parse()
                .map_err(|_| de::Error::custom(format!("invalid integer: {}", text)))
        }
        other => Err(de::Error::custom(format!("invalid integer: {}", other))),
    }
}

/// [`flexible_i64`] narrowed to `i32`
pub fn flexible_i32<'de, D>(deserializer: D) -> std::result::Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = flexible_i64(deserializer)?;
    i32::try_from(value).map_err(|_| de::Error::custom(format!("integer out of range: {}", value)))
}

/// `"2030-01-02 03:04:05.000"`; empty, null or missing is `None`
pub fn optional_datetime<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(text) if text.trim().is_empty() => Ok(None),
        Some(text) => parse_datetime(text.trim())
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid date/time: {}", text))),
    }
}

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}

/// Decode a single-object response
pub fn parse_object<T: DeserializeOwned>(body: &str) -> Result<T> {
    let body = body.trim();
    if body.is_empty() {
        return Err(Error::parse("empty response body"));
    }
    Ok(serde_json::from_str(body)?)
}

/// Decode a list response into its rows and the server's `@total`.
///
/// An empty body, `{}`, or a missing element all mean zero rows.
pub fn parse_list<T: DeserializeOwned>(body: &str, element: &str) -> Result<(Vec<T>, usize)> {
    let body = body.trim();
    if body.is_empty() {
        return Ok((Vec::new(), 0));
    }

    let root: Value = serde_json::from_str(body)?;
    let Value::Object(mut root) = root else {
        return Err(Error::parse(format!(
            "expected a JSON object for {} list",
            element
        )));
    };

    let total = root.get("@total").and_then(value_as_usize);

    // Element names are matched without regard to case ("Callhandler" vs "CallHandler")
    let key = root
        .keys()
        .find(|key| key.eq_ignore_ascii_case(element))
        .cloned();
    let rows = match key.and_then(|key| root.remove(&key)) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(rows)) => rows
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<T>, _>>()?,
        Some(row @ Value::Object(_)) => vec![serde_json::from_value(row)?],
        Some(other) => {
            return Err(Error::parse(format!(
                "unexpected {} payload: {}",
                element, other
            )));
        }
    };

    let total = total.unwrap_or(rows.len());
    Ok((rows, total))
}

fn value_as_usize(value: &Value) -> Option<usize> {
    match value {
        Value::Number(number) => number.as_u64().and_then(|n| usize::try_from(n).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Render every serialized field as a `prefix` + `name = value` line
pub fn dump_props<T: Serialize + ?Sized>(value: &T, prefix: &str) -> String {
    let rendered = match serde_json::to_value(value) {
        Ok(Value::Object(fields)) => fields
            .iter()
            .map(|(name, value)| format!("{}{} = {}", prefix, name, display_value(value)))
            .collect::<Vec<_>>(),
        Ok(other) => vec![format!("{}{}", prefix, display_value(&other))],
        Err(e) => vec![format!("{}<unable to render: {}>", prefix, e)],
    };
    rendered.join("\n")
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Declare an integer-coded server enumeration.
///
/// Generates the enum plus an `Other(i64)` variant for codes this client
/// does not know, `code()`/`from_code()`, serde impls that read the code
/// from a number or a numeric string, and a conversion into a change-list
/// value.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// A code this client does not know
            Other(i64),
        }

        impl $name {
            /// Integer code sent on the wire
            pub const fn code(self) -> i64 {
                match self {
                    $( Self::$variant => $value, )+
                    Self::Other(code) => code,
                }
            }

            /// Map a wire code back to a variant
            pub const fn from_code(code: i64) -> Self {
                match code {
                    $( $value => Self::$variant, )+
                    other => Self::Other(other),
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::from_code(0)
            }
        }

        impl From<$name> for $crate::changes::PropertyValue {
            fn from(value: $name) -> Self {
                $crate::changes::PropertyValue::Int(value.code())
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_i64(self.code())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                $crate::wire::flexible_i64(deserializer).map(Self::from_code)
            }
        }
    };
}

/// Generate setters that store the value and queue it in the change list.
///
/// ```rust,ignore
/// tracked_setters!(Tenant {
///     set_description => description: String = "Description",
/// });
/// ```
macro_rules! tracked_setters {
    (
        $ty:ty {
            $( $setter:ident => $field:ident : $fty:ty = $wire:literal ),* $(,)?
        }
    ) => {
        impl $ty {
            $(
                #[doc = concat!("Set `", $wire, "` and queue it for the next update.")]
                pub fn $setter(&mut self, value: impl Into<$fty>) {
                    let value: $fty = value.into();
                    self.state.record($wire, value.clone());
                    self.$field = value;
                }
            )*
        }
    };
}

pub(crate) use tracked_setters;
pub(crate) use wire_enum;
