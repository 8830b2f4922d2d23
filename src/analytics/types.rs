use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::analytics::constants::DEFAULT_SESSION_TIMEOUT_SECS;

/// Scalar value accepted as an event parameter by the native SDKs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventParamValue {
    Integer(i64),
    Double(f64),
    Text(String),
}

impl EventParamValue {
    /// Converts a JSON scalar; `None` for booleans, nulls, arrays and objects.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => Some(EventParamValue::Text(text.clone())),
            Value::Number(number) => number
                .as_i64()
                .map(EventParamValue::Integer)
                .or_else(|| number.as_f64().map(EventParamValue::Double)),
            _ => None,
        }
    }
}

impl fmt::Display for EventParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventParamValue::Integer(value) => write!(f, "{value}"),
            EventParamValue::Double(value) => write!(f, "{value}"),
            EventParamValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for EventParamValue {
    fn from(value: &str) -> Self {
        EventParamValue::Text(value.to_string())
    }
}

impl From<String> for EventParamValue {
    fn from(value: String) -> Self {
        EventParamValue::Text(value)
    }
}

impl From<i64> for EventParamValue {
    fn from(value: i64) -> Self {
        EventParamValue::Integer(value)
    }
}

impl From<i32> for EventParamValue {
    fn from(value: i32) -> Self {
        EventParamValue::Integer(value.into())
    }
}

impl From<f64> for EventParamValue {
    fn from(value: f64) -> Self {
        EventParamValue::Double(value)
    }
}

pub type EventParams = BTreeMap<String, EventParamValue>;

/// An event as handed to the analytics SDK.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalyticsEvent {
    pub name: String,
    pub params: EventParams,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetUserIdOptions {
    pub user_id: Option<String>,
}

impl SetUserIdOptions {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetUserPropertyOptions {
    pub name: Option<String>,
    pub value: Option<String>,
}

impl SetUserPropertyOptions {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            value: Some(value.into()),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetScreenNameOptions {
    pub screen_name: Option<String>,
    /// Overrides the screen class; `None` clears it.
    pub name_override: Option<String>,
}

impl SetScreenNameOptions {
    pub fn new(screen_name: impl Into<String>) -> Self {
        Self {
            screen_name: Some(screen_name.into()),
            name_override: None,
        }
    }

    pub fn with_name_override(mut self, name_override: impl Into<String>) -> Self {
        self.name_override = Some(name_override.into());
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawLogEventOptions")]
pub struct LogEventOptions {
    pub name: Option<String>,
    pub params: EventParams,
}

impl LogEventOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            params: EventParams::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<EventParamValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_params(mut self, params: EventParams) -> Self {
        self.params = params;
        self
    }
}

#[derive(Deserialize)]
struct RawLogEventOptions {
    name: Option<String>,
    #[serde(default)]
    params: Option<Map<String, Value>>,
}

impl TryFrom<RawLogEventOptions> for LogEventOptions {
    type Error = String;

    fn try_from(raw: RawLogEventOptions) -> Result<Self, Self::Error> {
        let mut params = EventParams::new();
        for (key, value) in raw.params.unwrap_or_default() {
            match EventParamValue::from_json(&value) {
                Some(converted) => {
                    params.insert(key, converted);
                }
                None => return Err(format!("value for {key} is missing")),
            }
        }
        Ok(Self {
            name: raw.name,
            params,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetCollectionEnabledOptions {
    #[serde(default)]
    pub enabled: bool,
}

impl SetCollectionEnabledOptions {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetSessionTimeoutDurationOptions {
    /// Inactivity in seconds after which the current session ends.
    #[serde(default = "default_session_timeout_secs")]
    pub duration: u64,
}

impl SetSessionTimeoutDurationOptions {
    /// Keeps whole seconds only; any sub-second part of `duration` is truncated.
    pub fn new(duration: Duration) -> Self {
        Self {
            duration: duration.as_secs(),
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration)
    }
}

impl Default for SetSessionTimeoutDurationOptions {
    fn default() -> Self {
        Self {
            duration: DEFAULT_SESSION_TIMEOUT_SECS,
        }
    }
}

fn default_session_timeout_secs() -> u64 {
    DEFAULT_SESSION_TIMEOUT_SECS
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInstanceId {
    pub instance_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn log_event_options_keep_scalar_params() {
        let options: LogEventOptions = serde_json::from_value(json!({
            "name": "purchase",
            "params": { "amount": 10, "price": 9.5, "currency": "EUR" }
        }))
        .unwrap();

        assert_eq!(options.name.as_deref(), Some("purchase"));
        assert_eq!(options.params.get("amount"), Some(&EventParamValue::Integer(10)));
        assert_eq!(options.params.get("price"), Some(&EventParamValue::Double(9.5)));
        assert_eq!(
            options.params.get("currency"),
            Some(&EventParamValue::Text("EUR".into()))
        );
    }

    #[test]
    fn log_event_options_reject_non_scalar_params() {
        let err = serde_json::from_value::<LogEventOptions>(json!({
            "name": "purchase",
            "params": { "flag": true }
        }))
        .unwrap_err();
        assert_eq!(err.to_string(), "value for flag is missing");
    }

    #[test]
    fn collection_enabled_defaults_to_false() {
        let options: SetCollectionEnabledOptions = serde_json::from_value(json!({})).unwrap();
        assert!(!options.enabled);
    }

    #[test]
    fn session_timeout_defaults_to_thirty_minutes() {
        let options: SetSessionTimeoutDurationOptions = serde_json::from_value(json!({})).unwrap();
        assert_eq!(options.duration(), Duration::from_secs(1800));
        assert_eq!(SetSessionTimeoutDurationOptions::default(), options);
    }

    #[test]
    fn session_timeout_keeps_whole_seconds() {
        let options = SetSessionTimeoutDurationOptions::new(Duration::from_millis(90_999));
        assert_eq!(options.duration, 90);
        assert_eq!(options.duration(), Duration::from_secs(90));
    }

    #[test]
    fn app_instance_id_serializes_camel_case() {
        let value = serde_json::to_value(AppInstanceId {
            instance_id: "abc".into(),
        })
        .unwrap();
        assert_eq!(value, json!({ "instanceId": "abc" }));
    }
}
