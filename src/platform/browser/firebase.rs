//! Browser binding for the Firebase JS SDK (`window.firebase`).
//!
//! Scripts are injected as `<script>` tags; each load resolves from the element's `onload` or
//! `onerror` callback. Once every script has executed, the loader reuses an already initialized
//! Firebase app or calls `firebase.initializeApp(options)`, then wraps `analytics()`.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::channel::oneshot;
use serde::Serialize;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};

use crate::analytics::error::{internal_error, load_failed, AnalyticsResult};
use crate::analytics::logger::LOGGER;
use crate::analytics::{
    AnalyticsSdk, EventParams, FirebaseOptions, ScriptResource, SdkHandle, SdkLoader,
    FIREBASE_VERSION,
};

#[derive(Clone, Debug)]
pub struct BrowserSdkLoader {
    resources: Vec<ScriptResource>,
}

impl BrowserSdkLoader {
    /// Loader for the Firebase JS SDK bundles served from gstatic.
    pub fn new() -> AnalyticsResult<Self> {
        Ok(Self {
            resources: ScriptResource::firebase_sdk(FIREBASE_VERSION)?,
        })
    }

    pub fn with_resources(resources: Vec<ScriptResource>) -> Self {
        Self { resources }
    }
}

#[async_trait(?Send)]
impl SdkLoader for BrowserSdkLoader {
    fn resources(&self) -> Vec<ScriptResource> {
        self.resources.clone()
    }

    async fn load_resource(&self, resource: &ScriptResource) -> AnalyticsResult<()> {
        inject_script(resource).await
    }

    fn attach(&self, options: &FirebaseOptions) -> AnalyticsResult<SdkHandle> {
        let global = js_sys::global();
        let firebase = property(&global, "firebase").ok_or_else(|| load_failed("Firebase fails to load"))?;
        if property(&firebase, "analytics").is_none() {
            return Err(load_failed("Firebase fails to load"));
        }

        let app = if is_app_initialized(&firebase) {
            firebase
        } else {
            let config = to_js(options)?;
            call_method(&firebase, "initializeApp", &js_sys::Array::of1(&config))?
        };
        let analytics = call_method(&app, "analytics", &js_sys::Array::new())?;
        Ok(Arc::new(JsAnalyticsSdk { analytics }))
    }
}

struct JsAnalyticsSdk {
    analytics: JsValue,
}

// wasm32 runs the SDK on a single thread; the handle never crosses threads.
unsafe impl Send for JsAnalyticsSdk {}
unsafe impl Sync for JsAnalyticsSdk {}

impl JsAnalyticsSdk {
    fn call(&self, method: &str, args: &js_sys::Array) -> AnalyticsResult<()> {
        call_method(&self.analytics, method, args).map(|_| ())
    }
}

impl AnalyticsSdk for JsAnalyticsSdk {
    fn set_user_id(&self, user_id: &str) -> AnalyticsResult<()> {
        self.call("setUserId", &js_sys::Array::of1(&JsValue::from_str(user_id)))
    }

    fn set_user_property(&self, name: &str, value: &str) -> AnalyticsResult<()> {
        let properties = js_sys::Object::new();
        js_sys::Reflect::set(&properties, &JsValue::from_str(name), &JsValue::from_str(value))
            .map_err(|err| internal_error(format!("failed to build user properties: {}", js_error_message(err))))?;
        self.call("setUserProperties", &js_sys::Array::of1(&properties))
    }

    fn log_event(&self, name: &str, params: &EventParams) -> AnalyticsResult<()> {
        let params = to_js(params)?;
        self.call("logEvent", &js_sys::Array::of2(&JsValue::from_str(name), &params))
    }

    fn set_analytics_collection_enabled(&self, enabled: bool) -> AnalyticsResult<()> {
        self.call(
            "setAnalyticsCollectionEnabled",
            &js_sys::Array::of1(&JsValue::from_bool(enabled)),
        )
    }

    fn app_instance_id(&self) -> AnalyticsResult<Option<String>> {
        Ok(None)
    }

    fn set_current_screen(&self, screen_name: &str, name_override: Option<&str>) -> AnalyticsResult<()> {
        if let Some(name_override) = name_override {
            LOGGER.debug(format!(
                "screen class override ({name_override}) is not supported by the Firebase JS SDK; ignoring"
            ));
        }
        self.call("setCurrentScreen", &js_sys::Array::of1(&JsValue::from_str(screen_name)))
    }

    fn reset_analytics_data(&self) -> AnalyticsResult<()> {
        LOGGER.debug("reset is not available in the Firebase JS SDK; ignoring");
        Ok(())
    }

    fn set_session_timeout_duration(&self, duration: Duration) -> AnalyticsResult<()> {
        LOGGER.debug(format!(
            "session timeout ({}s) is not configurable in the Firebase JS SDK; ignoring",
            duration.as_secs()
        ));
        Ok(())
    }
}

async fn inject_script(resource: &ScriptResource) -> AnalyticsResult<()> {
    let window = web_sys::window().ok_or_else(|| load_failed("Window not available"))?;
    let document = window
        .document()
        .ok_or_else(|| load_failed("Document not available"))?;

    if document.get_element_by_id(resource.key()).is_some() {
        return Ok(());
    }

    let script = document
        .create_element("script")
        .map_err(|err| load_failed(format!("Failed to create script: {}", js_error_message(err))))?
        .dyn_into::<web_sys::HtmlScriptElement>()
        .map_err(|_| load_failed("Script element has wrong type"))?;
    script.set_type("text/javascript");
    script.set_src(resource.src().as_str());
    script.set_id(resource.key());

    let (sender, receiver) = oneshot::channel::<AnalyticsResult<()>>();
    let sender = Rc::new(RefCell::new(Some(sender)));

    let success_sender = sender.clone();
    let onload = Closure::wrap(Box::new(move || {
        if let Some(tx) = success_sender.borrow_mut().take() {
            let _ = tx.send(Ok(()));
        }
    }) as Box<dyn FnMut()>);

    let error_sender = sender.clone();
    let src = resource.src().to_string();
    let onerror = Closure::wrap(Box::new(move || {
        if let Some(tx) = error_sender.borrow_mut().take() {
            let _ = tx.send(Err(load_failed(format!("Failed to load script: {src}"))));
        }
    }) as Box<dyn FnMut()>);

    script.set_onload(Some(onload.as_ref().unchecked_ref()));
    script.set_onerror(Some(onerror.as_ref().unchecked_ref()));
    onload.forget();
    onerror.forget();

    let head = document
        .head()
        .ok_or_else(|| load_failed("No <head> element found"))?;
    head.append_child(&script)
        .map_err(|err| load_failed(format!("Failed to append script to <head>: {}", js_error_message(err))))?;
    LOGGER.debug(format!("injected script {}", resource.key()));

    receiver
        .await
        .map_err(|_| load_failed("Script loading channel dropped"))?
}

fn property(target: &JsValue, name: &str) -> Option<JsValue> {
    let value = js_sys::Reflect::get(target, &JsValue::from_str(name)).ok()?;
    if value.is_null() || value.is_undefined() {
        None
    } else {
        Some(value)
    }
}

fn is_app_initialized(firebase: &JsValue) -> bool {
    property(firebase, "apps")
        .and_then(|apps| property(&apps, "length"))
        .and_then(|length| length.as_f64())
        .is_some_and(|length| length > 0.0)
}

fn call_method(target: &JsValue, name: &str, args: &js_sys::Array) -> AnalyticsResult<JsValue> {
    let function = js_sys::Reflect::get(target, &JsValue::from_str(name))
        .map_err(|err| internal_error(format!("Failed to access {name}(): {}", js_error_message(err))))?
        .dyn_into::<js_sys::Function>()
        .map_err(|_| internal_error(format!("{name}() is not a function")))?;
    function
        .apply(target, args)
        .map_err(|err| internal_error(format!("{name}() threw: {}", js_error_message(err))))
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> AnalyticsResult<JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|err| internal_error(format!("failed to convert value for the JS SDK: {err}")))
}

fn js_error_message(value: JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        format!("{}", error.message())
    } else if let Some(string) = value.as_string() {
        string
    } else {
        format!("{value:?}")
    }
}
