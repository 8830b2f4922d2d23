//! Test doubles for the SDK loader, shared across unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::channel::oneshot;
use futures::future::{FutureExt, Shared};

use crate::analytics::error::{load_failed, AnalyticsResult};
use crate::analytics::{
    FirebaseOptions, InMemoryAnalyticsSdk, ScriptResource, SdkHandle, SdkLoader, FIREBASE_VERSION,
};

fn firebase_resources() -> Vec<ScriptResource> {
    ScriptResource::firebase_sdk(FIREBASE_VERSION).expect("static script sources are valid")
}

/// Loader whose resources complete only after [`ManualTrigger::release`] is called.
pub struct ManualLoader {
    release: Shared<oneshot::Receiver<()>>,
    sdk: Arc<InMemoryAnalyticsSdk>,
    loaded: Mutex<Vec<String>>,
    attaches: AtomicUsize,
}

pub struct ManualTrigger {
    sender: Mutex<Option<oneshot::Sender<()>>>,
}

impl ManualTrigger {
    pub fn release(&self) {
        if let Some(sender) = self.sender.lock().unwrap().take() {
            let _ = sender.send(());
        }
    }
}

impl ManualLoader {
    pub fn new() -> (Self, ManualTrigger) {
        let (sender, receiver) = oneshot::channel();
        let loader = Self {
            release: receiver.shared(),
            sdk: Arc::new(InMemoryAnalyticsSdk::new()),
            loaded: Mutex::new(Vec::new()),
            attaches: AtomicUsize::new(0),
        };
        let trigger = ManualTrigger {
            sender: Mutex::new(Some(sender)),
        };
        (loader, trigger)
    }

    /// The SDK handed out by `attach`.
    pub fn sdk(&self) -> Arc<InMemoryAnalyticsSdk> {
        self.sdk.clone()
    }

    pub fn loaded_keys(&self) -> Vec<String> {
        self.loaded.lock().unwrap().clone()
    }

    pub fn attach_count(&self) -> usize {
        self.attaches.load(Ordering::SeqCst)
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl SdkLoader for ManualLoader {
    fn resources(&self) -> Vec<ScriptResource> {
        firebase_resources()
    }

    async fn load_resource(&self, resource: &ScriptResource) -> AnalyticsResult<()> {
        self.release
            .clone()
            .await
            .map_err(|_| load_failed("manual trigger dropped"))?;
        self.loaded.lock().unwrap().push(resource.key().to_string());
        Ok(())
    }

    fn attach(&self, _options: &FirebaseOptions) -> AnalyticsResult<SdkHandle> {
        self.attaches.fetch_add(1, Ordering::SeqCst);
        Ok(self.sdk.clone())
    }
}

/// Loader whose resources never finish loading.
pub struct StalledLoader;

impl StalledLoader {
    pub fn new() -> Self {
        Self
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl SdkLoader for StalledLoader {
    fn resources(&self) -> Vec<ScriptResource> {
        firebase_resources()
    }

    async fn load_resource(&self, _resource: &ScriptResource) -> AnalyticsResult<()> {
        futures::future::pending::<()>().await;
        Ok(())
    }

    fn attach(&self, _options: &FirebaseOptions) -> AnalyticsResult<SdkHandle> {
        Ok(Arc::new(InMemoryAnalyticsSdk::new()))
    }
}

/// Loader that reports a load error for one resource key.
pub struct FailingLoader {
    failing_key: String,
}

impl FailingLoader {
    pub fn new(failing_key: impl Into<String>) -> Self {
        Self {
            failing_key: failing_key.into(),
        }
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl SdkLoader for FailingLoader {
    fn resources(&self) -> Vec<ScriptResource> {
        firebase_resources()
    }

    async fn load_resource(&self, resource: &ScriptResource) -> AnalyticsResult<()> {
        if resource.key() == self.failing_key {
            return Err(load_failed(format!(
                "failed to load script {}",
                resource.src()
            )));
        }
        Ok(())
    }

    fn attach(&self, _options: &FirebaseOptions) -> AnalyticsResult<SdkHandle> {
        Ok(Arc::new(InMemoryAnalyticsSdk::new()))
    }
}
