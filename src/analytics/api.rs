use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::analytics::config::{FirebaseOptions, LoadPolicy};
use crate::analytics::error::{
    internal_error, missing_property, not_initialized, options_missing, AnalyticsResult,
};
use crate::analytics::gate::{GateState, ReadinessGate};
use crate::analytics::loader::{load_sdk, SdkLoader};
use crate::analytics::logger::LOGGER;
use crate::analytics::sdk::{AnalyticsSdk, SdkHandle};
use crate::analytics::types::{
    AppInstanceId, LogEventOptions, SetCollectionEnabledOptions, SetScreenNameOptions,
    SetSessionTimeoutDurationOptions, SetUserIdOptions, SetUserPropertyOptions,
};

/// Target the plugin instance runs on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    /// Android and iOS: the SDK is available as soon as the plugin loads.
    Native,
    /// Browser: the SDK is fetched and attached by `initialize_firebase`.
    Web,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Native => "native",
            Platform::Web => "web",
        }
    }
}

/// Uniform asynchronous interface exposed to the hybrid shell on every platform.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait FirebaseAnalyticsPlugin: Send + Sync {
    async fn initialize_firebase(&self, options: FirebaseOptions) -> AnalyticsResult<()>;

    async fn set_user_id(&self, options: SetUserIdOptions) -> AnalyticsResult<()>;

    async fn set_user_property(&self, options: SetUserPropertyOptions) -> AnalyticsResult<()>;

    async fn get_app_instance_id(&self) -> AnalyticsResult<AppInstanceId>;

    async fn set_screen_name(&self, options: SetScreenNameOptions) -> AnalyticsResult<()>;

    async fn reset(&self) -> AnalyticsResult<()>;

    async fn log_event(&self, options: LogEventOptions) -> AnalyticsResult<()>;

    async fn set_collection_enabled(
        &self,
        options: SetCollectionEnabledOptions,
    ) -> AnalyticsResult<()>;

    async fn set_session_timeout_duration(
        &self,
        options: SetSessionTimeoutDurationOptions,
    ) -> AnalyticsResult<()>;

    #[deprecated(note = "use set_collection_enabled instead")]
    async fn enable(&self) -> AnalyticsResult<()>;

    #[deprecated(note = "use set_collection_enabled instead")]
    async fn disable(&self) -> AnalyticsResult<()>;
}

/// Firebase Analytics plugin instance.
///
/// Every operation first waits for the SDK to be attached, then validates its options and
/// forwards to the SDK. On the native platforms the SDK is attached at construction; on the web
/// it is attached by [`FirebaseAnalytics::initialize_firebase`]. Callers issued before that
/// point stay suspended and are released together, or all observe the load failure.
#[derive(Clone)]
pub struct FirebaseAnalytics {
    inner: Arc<FirebaseAnalyticsInner>,
}

struct FirebaseAnalyticsInner {
    platform: Platform,
    gate: ReadinessGate<SdkHandle>,
    loader: Option<Arc<dyn SdkLoader>>,
    policy: LoadPolicy,
    initializing: AtomicBool,
}

impl fmt::Debug for FirebaseAnalytics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirebaseAnalytics")
            .field("platform", &self.inner.platform)
            .field("state", &self.inner.gate.state())
            .finish()
    }
}

impl FirebaseAnalytics {
    /// Creates an instance bound to an SDK that is already loaded.
    pub fn native(sdk: SdkHandle) -> Self {
        Self {
            inner: Arc::new(FirebaseAnalyticsInner {
                platform: Platform::Native,
                gate: ReadinessGate::resolved(sdk),
                loader: None,
                policy: LoadPolicy::default(),
                initializing: AtomicBool::new(true),
            }),
        }
    }

    /// Creates an instance whose SDK is fetched through `loader` on initialization.
    pub fn web(loader: Arc<dyn SdkLoader>, policy: LoadPolicy) -> Self {
        Self {
            inner: Arc::new(FirebaseAnalyticsInner {
                platform: Platform::Web,
                gate: ReadinessGate::new(),
                loader: Some(loader),
                policy,
                initializing: AtomicBool::new(false),
            }),
        }
    }

    pub fn platform(&self) -> Platform {
        self.inner.platform
    }

    pub fn state(&self) -> GateState {
        self.inner.gate.state()
    }

    /// Returns the attached SDK without waiting.
    pub fn sdk(&self) -> AnalyticsResult<SdkHandle> {
        if let Some(sdk) = self.inner.gate.get() {
            return Ok(sdk.clone());
        }
        match self.inner.gate.error() {
            Some(err) => Err(err.clone()),
            None => Err(not_initialized()),
        }
    }

    /// Loads and attaches the SDK on the web. The routine runs once per instance; later calls
    /// wait for and report its outcome. Native instances dismiss the call.
    pub async fn initialize_firebase(&self, options: FirebaseOptions) -> AnalyticsResult<()> {
        let Some(loader) = self.inner.loader.as_ref() else {
            return Ok(());
        };
        if options.is_empty() {
            return Err(options_missing());
        }

        if self
            .inner
            .initializing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return self.ready().await.map(|_| ());
        }

        let _guard = InitializationGuard {
            gate: &self.inner.gate,
        };
        LOGGER.debug("initializing Firebase analytics for the web target");
        match load_sdk(loader.as_ref(), &options, &self.inner.policy).await {
            Ok(sdk) => {
                self.inner.gate.resolve(sdk).await?;
                LOGGER.debug("Firebase analytics attached");
                Ok(())
            }
            Err(err) => {
                LOGGER.warn(format!("Firebase analytics failed to initialize: {err}"));
                self.inner.gate.fail(err.clone()).await?;
                Err(err)
            }
        }
    }

    pub async fn set_user_id(&self, options: SetUserIdOptions) -> AnalyticsResult<()> {
        let sdk = self.ready().await?;
        let user_id = required(options.user_id.as_deref(), "userId")?;
        sdk.set_user_id(user_id)
    }

    pub async fn set_user_property(&self, options: SetUserPropertyOptions) -> AnalyticsResult<()> {
        let sdk = self.ready().await?;
        let name = required(options.name.as_deref(), "name")?;
        let value = required(options.value.as_deref(), "value")?;
        sdk.set_user_property(name, value)
    }

    pub async fn get_app_instance_id(&self) -> AnalyticsResult<AppInstanceId> {
        let sdk = self.ready().await?;
        match sdk.app_instance_id()? {
            Some(instance_id) if !instance_id.is_empty() => Ok(AppInstanceId { instance_id }),
            _ => Err(internal_error("failed to obtain app instance id")),
        }
    }

    pub async fn set_screen_name(&self, options: SetScreenNameOptions) -> AnalyticsResult<()> {
        let sdk = self.ready().await?;
        let screen_name = required(options.screen_name.as_deref(), "screenName")?;
        sdk.set_current_screen(screen_name, options.name_override.as_deref())
    }

    pub async fn reset(&self) -> AnalyticsResult<()> {
        let sdk = self.ready().await?;
        sdk.reset_analytics_data()
    }

    /// Forwards the event name and parameters unchanged.
    pub async fn log_event(&self, options: LogEventOptions) -> AnalyticsResult<()> {
        let sdk = self.ready().await?;
        let name = required(options.name.as_deref(), "name")?;
        sdk.log_event(name, &options.params)
    }

    pub async fn set_collection_enabled(
        &self,
        options: SetCollectionEnabledOptions,
    ) -> AnalyticsResult<()> {
        let sdk = self.ready().await?;
        sdk.set_analytics_collection_enabled(options.enabled)
    }

    pub async fn set_session_timeout_duration(
        &self,
        options: SetSessionTimeoutDurationOptions,
    ) -> AnalyticsResult<()> {
        let sdk = self.ready().await?;
        sdk.set_session_timeout_duration(options.duration())
    }

    #[deprecated(note = "use set_collection_enabled instead")]
    pub async fn enable(&self) -> AnalyticsResult<()> {
        LOGGER.warn("enable() is deprecated, use setCollectionEnabled() instead");
        self.set_collection_enabled(SetCollectionEnabledOptions::new(true))
            .await
    }

    #[deprecated(note = "use set_collection_enabled instead")]
    pub async fn disable(&self) -> AnalyticsResult<()> {
        LOGGER.warn("disable() is deprecated, use setCollectionEnabled() instead");
        self.set_collection_enabled(SetCollectionEnabledOptions::new(false))
            .await
    }

    async fn ready(&self) -> AnalyticsResult<&dyn AnalyticsSdk> {
        let sdk = self.inner.gate.wait().await?;
        Ok(sdk.as_ref())
    }
}

/// Fails the gate if the initializing future is dropped before it settles, so waiters are not
/// left pending.
struct InitializationGuard<'a> {
    gate: &'a ReadinessGate<SdkHandle>,
}

impl Drop for InitializationGuard<'_> {
    fn drop(&mut self) {
        if self.gate.state() == GateState::Pending
            && self
                .gate
                .fail_now(internal_error("Firebase analytics initialization was cancelled"))
        {
            LOGGER.warn("Firebase analytics initialization was dropped before completing");
        }
    }
}

fn required<'a>(value: Option<&'a str>, property: &str) -> AnalyticsResult<&'a str> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => {
            LOGGER.debug(format!("rejecting call: {property} property is missing"));
            Err(missing_property(property))
        }
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl FirebaseAnalyticsPlugin for FirebaseAnalytics {
    async fn initialize_firebase(&self, options: FirebaseOptions) -> AnalyticsResult<()> {
        FirebaseAnalytics::initialize_firebase(self, options).await
    }

    async fn set_user_id(&self, options: SetUserIdOptions) -> AnalyticsResult<()> {
        FirebaseAnalytics::set_user_id(self, options).await
    }

    async fn set_user_property(&self, options: SetUserPropertyOptions) -> AnalyticsResult<()> {
        FirebaseAnalytics::set_user_property(self, options).await
    }

    async fn get_app_instance_id(&self) -> AnalyticsResult<AppInstanceId> {
        FirebaseAnalytics::get_app_instance_id(self).await
    }

    async fn set_screen_name(&self, options: SetScreenNameOptions) -> AnalyticsResult<()> {
        FirebaseAnalytics::set_screen_name(self, options).await
    }

    async fn reset(&self) -> AnalyticsResult<()> {
        FirebaseAnalytics::reset(self).await
    }

    async fn log_event(&self, options: LogEventOptions) -> AnalyticsResult<()> {
        FirebaseAnalytics::log_event(self, options).await
    }

    async fn set_collection_enabled(
        &self,
        options: SetCollectionEnabledOptions,
    ) -> AnalyticsResult<()> {
        FirebaseAnalytics::set_collection_enabled(self, options).await
    }

    async fn set_session_timeout_duration(
        &self,
        options: SetSessionTimeoutDurationOptions,
    ) -> AnalyticsResult<()> {
        FirebaseAnalytics::set_session_timeout_duration(self, options).await
    }

    #[allow(deprecated)]
    async fn enable(&self) -> AnalyticsResult<()> {
        FirebaseAnalytics::enable(self).await
    }

    #[allow(deprecated)]
    async fn disable(&self) -> AnalyticsResult<()> {
        FirebaseAnalytics::disable(self).await
    }
}
