use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::analytics::constants::{
    DEFAULT_SESSION_TIMEOUT_SECS, SCREEN_CLASS_PARAM, SCREEN_NAME_PARAM, SCREEN_VIEW_EVENT,
};
use crate::analytics::error::AnalyticsResult;
use crate::analytics::types::{AnalyticsEvent, EventParamValue, EventParams};

/// Synchronous surface of the underlying Firebase Analytics SDK.
///
/// Implementations wrap a platform SDK (the JS `firebase.analytics()` object on the web, the
/// native singletons elsewhere). Calls are forwarded verbatim; validation happens before the call
/// reaches the SDK.
pub trait AnalyticsSdk: Send + Sync {
    fn set_user_id(&self, user_id: &str) -> AnalyticsResult<()>;

    fn set_user_property(&self, name: &str, value: &str) -> AnalyticsResult<()>;

    fn log_event(&self, name: &str, params: &EventParams) -> AnalyticsResult<()>;

    fn set_analytics_collection_enabled(&self, enabled: bool) -> AnalyticsResult<()>;

    /// Returns the app instance id if the SDK can provide one.
    fn app_instance_id(&self) -> AnalyticsResult<Option<String>>;

    /// Records the current screen. SDKs without a dedicated API report a `screen_view` event.
    fn set_current_screen(
        &self,
        screen_name: &str,
        name_override: Option<&str>,
    ) -> AnalyticsResult<()> {
        let mut params = EventParams::new();
        params.insert(SCREEN_NAME_PARAM.to_string(), screen_name.into());
        if let Some(class) = name_override {
            params.insert(SCREEN_CLASS_PARAM.to_string(), class.into());
        }
        self.log_event(SCREEN_VIEW_EVENT, &params)
    }

    fn reset_analytics_data(&self) -> AnalyticsResult<()>;

    fn set_session_timeout_duration(&self, duration: Duration) -> AnalyticsResult<()>;
}

/// The single-assignment reference to the attached SDK.
pub type SdkHandle = Arc<dyn AnalyticsSdk>;

/// A call as received by an [`InMemoryAnalyticsSdk`].
#[derive(Clone, Debug, PartialEq)]
pub enum SdkCall {
    SetUserId(String),
    SetUserProperty { name: String, value: String },
    LogEvent(AnalyticsEvent),
    SetAnalyticsCollectionEnabled(bool),
    AppInstanceId,
    SetCurrentScreen {
        screen_name: String,
        name_override: Option<String>,
    },
    ResetAnalyticsData,
    SetSessionTimeoutDuration(Duration),
}

#[derive(Debug)]
struct InMemoryState {
    calls: Vec<SdkCall>,
    user_id: Option<String>,
    user_properties: BTreeMap<String, String>,
    events: Vec<AnalyticsEvent>,
    collection_enabled: bool,
    current_screen: Option<(String, Option<String>)>,
    session_timeout: Duration,
    app_instance_id: String,
}

impl InMemoryState {
    fn new() -> Self {
        Self {
            calls: Vec::new(),
            user_id: None,
            user_properties: BTreeMap::new(),
            events: Vec::new(),
            collection_enabled: true,
            current_screen: None,
            session_timeout: Duration::from_secs(DEFAULT_SESSION_TIMEOUT_SECS),
            app_instance_id: generate_instance_id(),
        }
    }
}

/// Analytics SDK that keeps everything in memory.
///
/// Useful on hosts without a native SDK and as a recording double in tests: every forwarded call
/// is appended to [`InMemoryAnalyticsSdk::calls`]. Events are recorded even while collection is
/// disabled; [`InMemoryAnalyticsSdk::collected_events`] only returns the ones logged while enabled.
#[derive(Debug)]
pub struct InMemoryAnalyticsSdk {
    state: Mutex<InMemoryState>,
    collected: Mutex<Vec<AnalyticsEvent>>,
}

impl InMemoryAnalyticsSdk {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(InMemoryState::new()),
            collected: Mutex::new(Vec::new()),
        }
    }

    /// Overrides the generated app instance id.
    pub fn with_app_instance_id(mut self, instance_id: impl Into<String>) -> Self {
        self.state
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .app_instance_id = instance_id.into();
        self
    }

    pub fn calls(&self) -> Vec<SdkCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn user_id(&self) -> Option<String> {
        self.state.lock().unwrap().user_id.clone()
    }

    pub fn user_properties(&self) -> BTreeMap<String, String> {
        self.state.lock().unwrap().user_properties.clone()
    }

    pub fn recorded_events(&self) -> Vec<AnalyticsEvent> {
        self.state.lock().unwrap().events.clone()
    }

    pub fn collected_events(&self) -> Vec<AnalyticsEvent> {
        self.collected.lock().unwrap().clone()
    }

    pub fn collection_enabled(&self) -> bool {
        self.state.lock().unwrap().collection_enabled
    }

    pub fn current_screen(&self) -> Option<(String, Option<String>)> {
        self.state.lock().unwrap().current_screen.clone()
    }

    pub fn session_timeout(&self) -> Duration {
        self.state.lock().unwrap().session_timeout
    }

    fn record(&self, call: SdkCall) {
        self.state.lock().unwrap().calls.push(call);
    }
}

impl Default for InMemoryAnalyticsSdk {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyticsSdk for InMemoryAnalyticsSdk {
    fn set_user_id(&self, user_id: &str) -> AnalyticsResult<()> {
        self.record(SdkCall::SetUserId(user_id.to_string()));
        self.state.lock().unwrap().user_id = Some(user_id.to_string());
        Ok(())
    }

    fn set_user_property(&self, name: &str, value: &str) -> AnalyticsResult<()> {
        self.record(SdkCall::SetUserProperty {
            name: name.to_string(),
            value: value.to_string(),
        });
        self.state
            .lock()
            .unwrap()
            .user_properties
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn log_event(&self, name: &str, params: &EventParams) -> AnalyticsResult<()> {
        let event = AnalyticsEvent {
            name: name.to_string(),
            params: params.clone(),
        };
        self.record(SdkCall::LogEvent(event.clone()));
        let mut state = self.state.lock().unwrap();
        state.events.push(event.clone());
        if state.collection_enabled {
            self.collected.lock().unwrap().push(event);
        }
        Ok(())
    }

    fn set_analytics_collection_enabled(&self, enabled: bool) -> AnalyticsResult<()> {
        self.record(SdkCall::SetAnalyticsCollectionEnabled(enabled));
        self.state.lock().unwrap().collection_enabled = enabled;
        Ok(())
    }

    fn app_instance_id(&self) -> AnalyticsResult<Option<String>> {
        self.record(SdkCall::AppInstanceId);
        Ok(Some(self.state.lock().unwrap().app_instance_id.clone()))
    }

    fn set_current_screen(
        &self,
        screen_name: &str,
        name_override: Option<&str>,
    ) -> AnalyticsResult<()> {
        self.record(SdkCall::SetCurrentScreen {
            screen_name: screen_name.to_string(),
            name_override: name_override.map(str::to_string),
        });
        self.state.lock().unwrap().current_screen =
            Some((screen_name.to_string(), name_override.map(str::to_string)));
        Ok(())
    }

    fn reset_analytics_data(&self) -> AnalyticsResult<()> {
        self.record(SdkCall::ResetAnalyticsData);
        let mut state = self.state.lock().unwrap();
        state.user_id = None;
        state.user_properties.clear();
        state.events.clear();
        state.current_screen = None;
        state.app_instance_id = generate_instance_id();
        self.collected.lock().unwrap().clear();
        Ok(())
    }

    fn set_session_timeout_duration(&self, duration: Duration) -> AnalyticsResult<()> {
        self.record(SdkCall::SetSessionTimeoutDuration(duration));
        self.state.lock().unwrap().session_timeout = duration;
        Ok(())
    }
}

fn generate_instance_id() -> String {
    use rand::distributions::Alphanumeric;
    use rand::Rng;

    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .map(char::from)
        .take(32)
        .collect()
}
