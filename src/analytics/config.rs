use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::analytics::constants::DEFAULT_LOAD_TIMEOUT;
use crate::platform::environment::default_app_config_json;

/// Web app configuration handed to `firebase.initializeApp` on the web target.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirebaseOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_domain: Option<String>,
    #[serde(rename = "databaseURL", skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_bucket: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messaging_sender_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurement_id: Option<String>,
}

impl FirebaseOptions {
    /// Returns `true` when no option has been provided at all.
    pub fn is_empty(&self) -> bool {
        self == &FirebaseOptions::default()
    }

    /// Resolves options from `__FIREBASE_DEFAULTS__`, `FIREBASE_CONFIG` or
    /// `FIREBASE_WEBAPP_CONFIG`. Returns `None` when nothing usable is configured.
    pub fn from_environment() -> Option<Self> {
        let config = default_app_config_json()?;
        let options: FirebaseOptions =
            serde_json::from_value(serde_json::Value::Object(config)).ok()?;
        if options.is_empty() {
            None
        } else {
            Some(options)
        }
    }
}

/// Bounds the wait for the vendor SDK to become available.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadPolicy {
    load_timeout: Duration,
}

impl LoadPolicy {
    pub fn new(load_timeout: Duration) -> Self {
        Self { load_timeout }
    }

    pub fn with_load_timeout(mut self, load_timeout: Duration) -> Self {
        self.load_timeout = load_timeout;
        self
    }

    pub fn load_timeout(&self) -> Duration {
        self.load_timeout
    }
}

impl Default for LoadPolicy {
    fn default() -> Self {
        Self {
            load_timeout: DEFAULT_LOAD_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn options_deserialize_from_web_config() {
        let options: FirebaseOptions = serde_json::from_value(json!({
            "apiKey": "key",
            "projectId": "demo",
            "databaseURL": "https://demo.firebaseio.com",
            "measurementId": "G-TEST"
        }))
        .unwrap();

        assert_eq!(options.api_key.as_deref(), Some("key"));
        assert_eq!(options.database_url.as_deref(), Some("https://demo.firebaseio.com"));
        assert_eq!(options.measurement_id.as_deref(), Some("G-TEST"));
        assert!(!options.is_empty());
    }

    #[test]
    fn empty_options_are_detected() {
        let options: FirebaseOptions = serde_json::from_value(json!({})).unwrap();
        assert!(options.is_empty());
    }

    /// Runs every case in one test; the variables are process wide.
    #[test]
    fn environment_defaults_take_precedence_over_config_variables() {
        let saved: Vec<_> = ["__FIREBASE_DEFAULTS__", "FIREBASE_CONFIG"]
            .into_iter()
            .map(|name| (name, std::env::var(name).ok()))
            .collect();

        std::env::set_var("FIREBASE_CONFIG", "projectId=from-config-var");
        std::env::set_var(
            "__FIREBASE_DEFAULTS__",
            r#"{"config":{"projectId":"from-defaults","measurementId":"G-DEFAULTS"}}"#,
        );
        let options = FirebaseOptions::from_environment().unwrap();
        assert_eq!(options.project_id.as_deref(), Some("from-defaults"));
        assert_eq!(options.measurement_id.as_deref(), Some("G-DEFAULTS"));

        std::env::set_var("__FIREBASE_DEFAULTS__", r#"{"config":{}}"#);
        assert!(FirebaseOptions::from_environment().is_none());

        std::env::remove_var("__FIREBASE_DEFAULTS__");
        let options = FirebaseOptions::from_environment().unwrap();
        assert_eq!(options.project_id.as_deref(), Some("from-config-var"));

        for (name, value) in saved {
            match value {
                Some(value) => std::env::set_var(name, value),
                None => std::env::remove_var(name),
            }
        }
    }

    #[test]
    fn default_policy_waits_five_seconds() {
        assert_eq!(LoadPolicy::default().load_timeout(), Duration::from_secs(5));
        let policy = LoadPolicy::default().with_load_timeout(Duration::from_millis(10));
        assert_eq!(policy.load_timeout(), Duration::from_millis(10));
    }
}
