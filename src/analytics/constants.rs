use std::time::Duration;

/// Name the plugin is registered under in the hybrid shell.
pub const PLUGIN_NAME: &str = "FirebaseAnalytics";

/// Version of the Firebase JS SDK loaded by the web target.
pub const FIREBASE_VERSION: &str = "8.3.0";

pub(crate) const FIREBASE_SCRIPT_HOST: &str = "https://www.gstatic.com/firebasejs";

pub(crate) const FIREBASE_APP_SCRIPT_KEY: &str = "firebase-app";
pub(crate) const FIREBASE_ANALYTICS_SCRIPT_KEY: &str = "firebase-ac";

/// Upper bound on waiting for the vendor scripts; matches 100 polls at a 50 ms interval.
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_millis(100 * 50);

pub const DEFAULT_SESSION_TIMEOUT_SECS: u64 = 1800;

pub(crate) const SCREEN_VIEW_EVENT: &str = "screen_view";
pub(crate) const SCREEN_NAME_PARAM: &str = "screen_name";
pub(crate) const SCREEN_CLASS_PARAM: &str = "screen_class";
