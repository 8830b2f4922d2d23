//! Marshalling of untyped plugin calls coming from the hybrid shell.
//!
//! The shell hands over a method name and a JSON payload. [`dispatch`] decodes the payload into
//! the typed options of the matching [`FirebaseAnalyticsPlugin`] operation and encodes the result
//! back to JSON (`null` for operations without a return value).

use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analytics::api::FirebaseAnalyticsPlugin;
use crate::analytics::config::FirebaseOptions;
use crate::analytics::error::{internal_error, invalid_argument, unimplemented, AnalyticsResult};
use crate::analytics::types::{
    LogEventOptions, SetCollectionEnabledOptions, SetScreenNameOptions,
    SetSessionTimeoutDurationOptions, SetUserIdOptions, SetUserPropertyOptions,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PluginMethod {
    InitializeFirebase,
    SetUserId,
    SetUserProperty,
    GetAppInstanceId,
    SetScreenName,
    Reset,
    LogEvent,
    SetCollectionEnabled,
    SetSessionTimeoutDuration,
    Enable,
    Disable,
}

impl PluginMethod {
    pub const ALL: [PluginMethod; 11] = [
        PluginMethod::InitializeFirebase,
        PluginMethod::SetUserId,
        PluginMethod::SetUserProperty,
        PluginMethod::GetAppInstanceId,
        PluginMethod::SetScreenName,
        PluginMethod::Reset,
        PluginMethod::LogEvent,
        PluginMethod::SetCollectionEnabled,
        PluginMethod::SetSessionTimeoutDuration,
        PluginMethod::Enable,
        PluginMethod::Disable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PluginMethod::InitializeFirebase => "initializeFirebase",
            PluginMethod::SetUserId => "setUserId",
            PluginMethod::SetUserProperty => "setUserProperty",
            PluginMethod::GetAppInstanceId => "getAppInstanceId",
            PluginMethod::SetScreenName => "setScreenName",
            PluginMethod::Reset => "reset",
            PluginMethod::LogEvent => "logEvent",
            PluginMethod::SetCollectionEnabled => "setCollectionEnabled",
            PluginMethod::SetSessionTimeoutDuration => "setSessionTimeoutDuration",
            PluginMethod::Enable => "enable",
            PluginMethod::Disable => "disable",
        }
    }
}

impl FromStr for PluginMethod {
    type Err = crate::analytics::error::AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PluginMethod::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| unimplemented(s))
    }
}

/// A call as received from the shell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PluginCall {
    pub method: String,
    #[serde(default)]
    pub data: Value,
}

impl PluginCall {
    pub fn new(method: impl Into<String>, data: Value) -> Self {
        Self {
            method: method.into(),
            data,
        }
    }
}

/// Routes `call` to `plugin` and returns the JSON-encoded result.
pub async fn dispatch<P>(plugin: &P, call: &PluginCall) -> AnalyticsResult<Value>
where
    P: FirebaseAnalyticsPlugin + ?Sized,
{
    let method = PluginMethod::from_str(&call.method)?;
    match method {
        PluginMethod::InitializeFirebase => {
            let options: FirebaseOptions = decode(method, &call.data)?;
            plugin.initialize_firebase(options).await?;
        }
        PluginMethod::SetUserId => {
            let options: SetUserIdOptions = decode(method, &call.data)?;
            plugin.set_user_id(options).await?;
        }
        PluginMethod::SetUserProperty => {
            let options: SetUserPropertyOptions = decode(method, &call.data)?;
            plugin.set_user_property(options).await?;
        }
        PluginMethod::GetAppInstanceId => {
            let instance = plugin.get_app_instance_id().await?;
            return serde_json::to_value(instance)
                .map_err(|err| internal_error(format!("failed to encode instance id: {err}")));
        }
        PluginMethod::SetScreenName => {
            let options: SetScreenNameOptions = decode(method, &call.data)?;
            plugin.set_screen_name(options).await?;
        }
        PluginMethod::Reset => plugin.reset().await?,
        PluginMethod::LogEvent => {
            let options: LogEventOptions = decode(method, &call.data)?;
            plugin.log_event(options).await?;
        }
        PluginMethod::SetCollectionEnabled => {
            let options: SetCollectionEnabledOptions = decode(method, &call.data)?;
            plugin.set_collection_enabled(options).await?;
        }
        PluginMethod::SetSessionTimeoutDuration => {
            let options: SetSessionTimeoutDurationOptions = decode(method, &call.data)?;
            plugin.set_session_timeout_duration(options).await?;
        }
        #[allow(deprecated)]
        PluginMethod::Enable => plugin.enable().await?,
        #[allow(deprecated)]
        PluginMethod::Disable => plugin.disable().await?,
    }
    Ok(Value::Null)
}

fn decode<T>(method: PluginMethod, data: &Value) -> AnalyticsResult<T>
where
    T: DeserializeOwned + Default,
{
    if data.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(data.clone()).map_err(|err| {
        invalid_argument(format!("invalid {} options: {err}", method.as_str()))
    })
}
