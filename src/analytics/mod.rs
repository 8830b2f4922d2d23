mod api;
pub mod bridge;
mod config;
mod constants;
pub mod error;
mod gate;
mod loader;
pub(crate) mod logger;
mod sdk;
mod types;

pub use api::{FirebaseAnalytics, FirebaseAnalyticsPlugin, Platform};
pub use bridge::{dispatch, PluginCall, PluginMethod};
pub use config::{FirebaseOptions, LoadPolicy};
pub use constants::{DEFAULT_LOAD_TIMEOUT, DEFAULT_SESSION_TIMEOUT_SECS, FIREBASE_VERSION, PLUGIN_NAME};
pub use error::{AnalyticsError, AnalyticsErrorCode, AnalyticsResult};
pub use gate::{GateState, ReadinessGate};
pub use loader::{ScriptResource, SdkLoader};
pub use sdk::{AnalyticsSdk, InMemoryAnalyticsSdk, SdkCall, SdkHandle};
pub use types::{
    AnalyticsEvent, AppInstanceId, EventParamValue, EventParams, LogEventOptions,
    SetCollectionEnabledOptions, SetScreenNameOptions, SetSessionTimeoutDurationOptions,
    SetUserIdOptions, SetUserPropertyOptions,
};
