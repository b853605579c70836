// # Change List
//
// Pending field modifications of one entity, in the order they were made.
//
// Setters on the resource types push into this list; `update()` sends only
// what is here and clears it on success. Deserialization never touches it,
// so an object fresh from the server is always clean.

use chrono::NaiveDateTime;
use std::fmt;

/// Date format the server expects in request bodies
pub const WIRE_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A value in a form the server accepts in a request body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Text(String),
    Int(i64),
    Bool(bool),
    /// Renders as an empty element, clearing the field server side
    Empty,
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Text(text) => f.write_str(text),
            PropertyValue::Int(value) => write!(f, "{}", value),
            PropertyValue::Bool(value) => f.write_str(if *value { "true" } else { "false" }),
            PropertyValue::Empty => Ok(()),
        }
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Int(i64::from(value))
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<u32> for PropertyValue {
    fn from(value: u32) -> Self {
        PropertyValue::Int(i64::from(value))
    }
}

impl From<NaiveDateTime> for PropertyValue {
    fn from(value: NaiveDateTime) -> Self {
        PropertyValue::Text(value.format(WIRE_DATETIME_FORMAT).to_string())
    }
}

impl From<Option<NaiveDateTime>> for PropertyValue {
    fn from(value: Option<NaiveDateTime>) -> Self {
        match value {
            Some(when) => when.into(),
            None => PropertyValue::Empty,
        }
    }
}

/// One pending `(name, value)` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyChange {
    pub name: String,
    pub value: PropertyValue,
}

/// Ordered list of pending changes, keyed by wire field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyList {
    items: Vec<PropertyChange>,
}

impl PropertyList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a change. A second change to the same field replaces the
    /// value but keeps the original position.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) {
        let name = name.into();
        let value = value.into();
        match self.items.iter_mut().find(|item| item.name == name) {
            Some(existing) => existing.value = value,
            None => self.items.push(PropertyChange { name, value }),
        }
    }

    /// Builder form of [`add`](Self::add)
    pub fn with(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.add(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.items
            .iter()
            .find(|item| item.name == name)
            .map(|item| &item.value)
    }

    pub fn remove(&mut self, name: &str) -> Option<PropertyValue> {
        let index = self.items.iter().position(|item| item.name == name)?;
        Some(self.items.remove(index).value)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PropertyChange> {
        self.items.iter()
    }

    /// Append every pair of `other`, replacing values already present
    pub fn merge(&mut self, other: &PropertyList) {
        for item in other {
            self.add(item.name.clone(), item.value.clone());
        }
    }

    /// Render the request body: `<Root><Name>value</Name>...</Root>`
    pub fn to_xml_body(&self, root: &str) -> String {
        let mut body = format!("<{}>", root);
        for item in &self.items {
            body.push_str(&xml_element(&item.name, &item.value.to_string()));
        }
        body.push_str(&format!("</{}>", root));
        body
    }
}

impl<'a> IntoIterator for &'a PropertyList {
    type Item = &'a PropertyChange;
    type IntoIter = std::slice::Iter<'a, PropertyChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// `<name>escaped value</name>`
pub fn xml_element(name: &str, value: &str) -> String {
    format!("<{0}>{1}</{0}>", name, escape_xml(value))
}

/// Escape the five XML special characters
pub fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_add_replaces_in_place() {
        let mut list = PropertyList::new();
        list.add("DisplayName", "Sales");
        list.add("DtmfAccessId", "100");
        list.add("DisplayName", "Support");

        assert_eq!(list.len(), 2);
        let names: Vec<&str> = list.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["DisplayName", "DtmfAccessId"]);
        assert_eq!(
            list.get("DisplayName"),
            Some(&PropertyValue::Text("Support".to_string()))
        );
    }

    #[test]
    fn test_clear_and_remove() {
        let mut list = PropertyList::new().with("A", 1).with("B", true);
        assert_eq!(list.remove("A"), Some(PropertyValue::Int(1)));
        assert_eq!(list.remove("A"), None);
        assert!(!list.is_empty());

        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn test_xml_body_coerces_and_escapes() {
        let list = PropertyList::new()
            .with("DisplayName", "R&D <east>")
            .with("Undeletable", false)
            .with("MaxDigits", 30)
            .with("TimeExpires", None::<NaiveDateTime>);

        assert_eq!(
            list.to_xml_body("RestrictionTable"),
            "<RestrictionTable><DisplayName>R&amp;D &lt;east&gt;</DisplayName>\
             <Undeletable>false</Undeletable><MaxDigits>30</MaxDigits>\
             <TimeExpires></TimeExpires></RestrictionTable>"
        );
    }

    #[test]
    fn test_datetime_value_format() {
        let when = NaiveDate::from_ymd_opt(2030, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        assert_eq!(PropertyValue::from(when).to_string(), "2030-01-02 03:04:05");
    }

    #[test]
    fn test_merge_keeps_order() {
        let mut base = PropertyList::new().with("A", "1").with("B", "2");
        let extra = PropertyList::new().with("B", "3").with("C", "4");
        base.merge(&extra);

        let rendered: Vec<String> = base
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect();
        assert_eq!(rendered, vec!["A=1", "B=3", "C=4"]);
    }
}
