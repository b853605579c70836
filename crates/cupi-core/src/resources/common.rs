//! Pieces shared by several resource types

use chrono::{NaiveDate, NaiveDateTime};

use crate::wire::wire_enum;

wire_enum! {
    /// What the server does after a greeting, a key press, or a message
    pub enum ActionType {
        Ignore = 0,
        Hangup = 1,
        GoTo = 2,
        Error = 3,
        TakeMessage = 4,
        SkipGreeting = 5,
        RestartGreeting = 6,
        TransferAltContact = 7,
        RouteFromNextRule = 8,
    }
}

/// Expiry the server uses to mark a greeting or transfer rule disabled
pub fn disabled_expiry() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1972, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Enabled when there is no expiry, or it lies after `now`
pub fn is_active(time_expires: Option<NaiveDateTime>, now: NaiveDateTime) -> bool {
    time_expires.is_none_or(|expires| expires > now)
}

/// `Some(value)` only when the value is present and not blank
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Percent-encode one path segment ("Off Hours", "#")
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_active() {
        let now = NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert!(is_active(None, now));
        assert!(!is_active(Some(disabled_expiry()), now));
        assert!(is_active(
            Some(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()),
            now
        ));
    }

    #[test]
    fn test_segment_encoding() {
        assert_eq!(segment("Off Hours"), "Off%20Hours");
        assert_eq!(segment("#"), "%23");
        assert_eq!(segment("3"), "3");
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("abc")), Some("abc"));
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(None), None);
    }
}
