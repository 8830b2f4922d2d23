use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use firebase_analytics_bridge::analytics::error::AnalyticsResult;
use firebase_analytics_bridge::analytics::{
    dispatch, AnalyticsErrorCode, EventParamValue, FirebaseAnalytics, FirebaseOptions, GateState,
    InMemoryAnalyticsSdk, LoadPolicy, PluginCall, ScriptResource, SdkCall, SdkHandle, SdkLoader,
    FIREBASE_VERSION,
};
use serde_json::{json, Value};

/// Loader whose scripts load after a fixed delay.
struct DelayedLoader {
    delay: Duration,
    sdk: Arc<InMemoryAnalyticsSdk>,
    attaches: AtomicUsize,
}

impl DelayedLoader {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            sdk: Arc::new(InMemoryAnalyticsSdk::new().with_app_instance_id("web-instance")),
            attaches: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SdkLoader for DelayedLoader {
    fn resources(&self) -> Vec<ScriptResource> {
        ScriptResource::firebase_sdk(FIREBASE_VERSION).unwrap()
    }

    async fn load_resource(&self, _resource: &ScriptResource) -> AnalyticsResult<()> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }

    fn attach(&self, _options: &FirebaseOptions) -> AnalyticsResult<SdkHandle> {
        self.attaches.fetch_add(1, Ordering::SeqCst);
        Ok(self.sdk.clone())
    }
}

fn init_call() -> PluginCall {
    PluginCall::new(
        "initializeFirebase",
        json!({
            "apiKey": "key",
            "projectId": "demo",
            "appId": "1:123:web:abc",
            "measurementId": "G-TEST"
        }),
    )
}

#[tokio::test(flavor = "current_thread")]
async fn web_calls_issued_before_initialization_are_released() {
    let loader = Arc::new(DelayedLoader::new(Duration::from_millis(10)));
    let sdk = loader.sdk.clone();
    let analytics = FirebaseAnalytics::web(loader.clone(), LoadPolicy::default());

    let early_calls = [
        PluginCall::new("setUserId", json!({ "userId": "abc" })),
        PluginCall::new("setUserProperty", json!({ "name": "plan", "value": "pro" })),
        PluginCall::new(
            "logEvent",
            json!({ "name": "purchase", "params": { "amount": 10 } }),
        ),
    ];
    let mut handles = Vec::new();
    for call in early_calls {
        let analytics = analytics.clone();
        handles.push(tokio::spawn(async move { dispatch(&analytics, &call).await }));
    }
    tokio::task::yield_now().await;
    assert!(sdk.calls().is_empty());
    assert_eq!(analytics.state(), GateState::Pending);

    dispatch(&analytics, &init_call()).await.unwrap();
    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), Value::Null);
    }

    assert_eq!(loader.attaches.load(Ordering::SeqCst), 1);
    assert_eq!(sdk.user_id().as_deref(), Some("abc"));
    assert_eq!(sdk.user_properties().get("plan").map(String::as_str), Some("pro"));
    let events = sdk.recorded_events();
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0].params.get("amount"),
        Some(&EventParamValue::Integer(10))
    );

    let id = dispatch(&analytics, &PluginCall::new("getAppInstanceId", Value::Null))
        .await
        .unwrap();
    assert_eq!(id, json!({ "instanceId": "web-instance" }));
}

#[tokio::test(flavor = "current_thread")]
async fn web_load_timeout_rejects_waiting_calls() {
    let loader = Arc::new(DelayedLoader::new(Duration::from_secs(60)));
    let sdk = loader.sdk.clone();
    let analytics = FirebaseAnalytics::web(loader, LoadPolicy::new(Duration::from_millis(20)));

    let waiting = {
        let analytics = analytics.clone();
        tokio::spawn(async move {
            dispatch(&analytics, &PluginCall::new("setCollectionEnabled", json!({ "enabled": true }))).await
        })
    };
    tokio::task::yield_now().await;

    let err = dispatch(&analytics, &init_call()).await.unwrap_err();
    assert_eq!(err.code, AnalyticsErrorCode::LoadTimeout);

    let err = waiting.await.unwrap().unwrap_err();
    assert_eq!(err.code, AnalyticsErrorCode::LoadTimeout);
    assert!(sdk.calls().is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn native_calls_cover_the_full_surface() {
    let sdk = Arc::new(InMemoryAnalyticsSdk::new());
    let analytics = FirebaseAnalytics::native(sdk.clone());

    let calls = [
        PluginCall::new("initializeFirebase", Value::Null),
        PluginCall::new("setScreenName", json!({ "screenName": "home" })),
        PluginCall::new("setSessionTimeoutDuration", json!({})),
        PluginCall::new("setCollectionEnabled", json!({})),
        PluginCall::new("enable", Value::Null),
        PluginCall::new("reset", Value::Null),
    ];
    for call in &calls {
        dispatch(&analytics, call).await.unwrap();
    }

    assert_eq!(
        sdk.calls(),
        vec![
            SdkCall::SetCurrentScreen {
                screen_name: "home".into(),
                name_override: None,
            },
            SdkCall::SetSessionTimeoutDuration(Duration::from_secs(1800)),
            SdkCall::SetAnalyticsCollectionEnabled(false),
            SdkCall::SetAnalyticsCollectionEnabled(true),
            SdkCall::ResetAnalyticsData,
        ]
    );
}

#[tokio::test(flavor = "current_thread")]
async fn unknown_methods_are_unimplemented() {
    let analytics = FirebaseAnalytics::native(Arc::new(InMemoryAnalyticsSdk::new()));
    let err = dispatch(&analytics, &PluginCall::new("setConsent", json!({})))
        .await
        .unwrap_err();
    assert_eq!(err.code, AnalyticsErrorCode::Unimplemented);
}
