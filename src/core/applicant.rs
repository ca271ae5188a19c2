use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::matching::normalize::clean_handle;

/// A verified applicant record as exported from the applicant datastore.
///
/// Every field is optional. Values that are not JSON strings are coerced to
/// text on load (numbers, booleans, nested values) so a sloppy export never
/// fails to deserialize.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantRecord {
    #[serde(default, alias = "full_name", deserialize_with = "lenient_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,

    /// Discord tag, possibly with a legacy `#1234` discriminator
    #[serde(default, deserialize_with = "lenient_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discord: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram: Option<String>,

    /// Twitter handle, `@handle`, or full profile URL
    #[serde(default, deserialize_with = "lenient_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,

    /// Same as `twitter`, for exports that use the newer field name
    #[serde(default, deserialize_with = "lenient_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitch: Option<String>,

    #[serde(default, alias = "wallet_address", deserialize_with = "lenient_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl ApplicantRecord {
    /// The bare social handle this record exposes, if any.
    ///
    /// Uses the cleaned `twitter` field, falling back to the cleaned `x`
    /// field. Returns `None` when neither yields a non-empty handle, which
    /// makes the record ineligible for matching.
    #[must_use]
    pub fn handle(&self) -> Option<String> {
        [&self.twitter, &self.x]
            .into_iter()
            .flatten()
            .map(|raw| clean_handle(raw))
            .find(|h| !h.is_empty())
    }

    /// Best available human-readable name (`fullName`, then `name`)
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.full_name
            .as_deref()
            .or(self.name.as_deref())
            .filter(|s| !s.trim().is_empty())
    }

    /// Whether the record's status equals `status`, ignoring case and padding
    #[must_use]
    pub fn has_status(&self, status: &str) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.trim().eq_ignore_ascii_case(status.trim()))
    }
}

/// Case-insensitive key used to claim and look up handles
#[must_use]
pub fn handle_key(handle: &str) -> String {
    handle.to_ascii_lowercase()
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(stringify))
}

/// Best-effort text form of an arbitrary JSON value. `null` means absent.
pub(crate) fn stringify(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_camel_case_fields() {
        let json = r#"{"fullName": "Juan Perez", "walletAddress": "0xabc", "twitter": "@juanperez"}"#;
        let record: ApplicantRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.full_name.as_deref(), Some("Juan Perez"));
        assert_eq!(record.wallet_address.as_deref(), Some("0xabc"));
        assert_eq!(record.handle().as_deref(), Some("juanperez"));
    }

    #[test]
    fn test_non_string_values_are_coerced() {
        let json = r#"{"name": 42, "telegram": true, "discord": null, "username": ["a", "b"]}"#;
        let record: ApplicantRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.name.as_deref(), Some("42"));
        assert_eq!(record.telegram.as_deref(), Some("true"));
        assert_eq!(record.discord, None);
        assert_eq!(record.username.as_deref(), Some(r#"["a","b"]"#));
    }

    #[test]
    fn test_handle_falls_back_to_x() {
        let record = ApplicantRecord {
            twitter: Some("  @ ".to_string()),
            x: Some("https://x.com/alice_eth/status/1".to_string()),
            ..Default::default()
        };
        assert_eq!(record.handle().as_deref(), Some("alice_eth"));

        let record = ApplicantRecord::default();
        assert_eq!(record.handle(), None);
    }

    #[test]
    fn test_has_status() {
        let record = ApplicantRecord {
            status: Some(" Approved".to_string()),
            ..Default::default()
        };
        assert!(record.has_status("approved"));
        assert!(!record.has_status("pending"));
        assert!(!ApplicantRecord::default().has_status("approved"));
    }
}
