use std::fmt;

use async_trait::async_trait;
use futures::future::try_join_all;
use url::Url;

use crate::analytics::config::{FirebaseOptions, LoadPolicy};
use crate::analytics::constants::{
    FIREBASE_ANALYTICS_SCRIPT_KEY, FIREBASE_APP_SCRIPT_KEY, FIREBASE_SCRIPT_HOST,
};
use crate::analytics::error::{invalid_argument, load_timeout, AnalyticsResult};
use crate::analytics::logger::LOGGER;
use crate::analytics::sdk::SdkHandle;
use crate::platform::runtime::with_timeout;

/// An externally hosted script that must be executed before the SDK is usable.
#[derive(Clone, PartialEq, Eq)]
pub struct ScriptResource {
    key: String,
    src: Url,
}

impl ScriptResource {
    pub fn new(key: impl Into<String>, src: &str) -> AnalyticsResult<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(invalid_argument("script key must not be empty"));
        }
        let src = Url::parse(src)
            .map_err(|err| invalid_argument(format!("invalid script source `{src}`: {err}")))?;
        Ok(Self { key, src })
    }

    /// The `firebase-app` and `firebase-analytics` bundles for `version`.
    pub fn firebase_sdk(version: &str) -> AnalyticsResult<Vec<Self>> {
        Ok(vec![
            Self::new(
                FIREBASE_APP_SCRIPT_KEY,
                &format!("{FIREBASE_SCRIPT_HOST}/{version}/firebase-app.js"),
            )?,
            Self::new(
                FIREBASE_ANALYTICS_SCRIPT_KEY,
                &format!("{FIREBASE_SCRIPT_HOST}/{version}/firebase-analytics.js"),
            )?,
        ])
    }

    /// Identifier used to detect an already injected script.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn src(&self) -> &Url {
        &self.src
    }
}

impl fmt::Debug for ScriptResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptResource")
            .field("key", &self.key)
            .field("src", &self.src.as_str())
            .finish()
    }
}

/// Fetches the vendor SDK and attaches to it once its resources are available.
///
/// `load_resource` completes when the platform reports the resource as executed, replacing any
/// polling of global state.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait SdkLoader: Send + Sync {
    fn resources(&self) -> Vec<ScriptResource>;

    async fn load_resource(&self, resource: &ScriptResource) -> AnalyticsResult<()>;

    /// Reuses an already initialized vendor app or initializes one from `options`, returning the
    /// analytics handle.
    fn attach(&self, options: &FirebaseOptions) -> AnalyticsResult<SdkHandle>;
}

/// Loads every resource concurrently within the policy's bound, then attaches to the SDK.
pub(crate) async fn load_sdk(
    loader: &dyn SdkLoader,
    options: &FirebaseOptions,
    policy: &LoadPolicy,
) -> AnalyticsResult<SdkHandle> {
    let resources = loader.resources();
    LOGGER.debug(format!("loading {} analytics resource(s)", resources.len()));

    let pending = resources
        .iter()
        .map(|resource| loader.load_resource(resource));
    match with_timeout(try_join_all(pending), policy.load_timeout()).await {
        Ok(Ok(_)) => {}
        Ok(Err(err)) => return Err(err),
        Err(elapsed) => {
            LOGGER.warn(format!("analytics resources not loaded: {elapsed}"));
            return Err(load_timeout());
        }
    }

    loader.attach(options)
}
