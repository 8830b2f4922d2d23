//! Uniform asynchronous bridge over the Firebase Analytics SDK.
//!
//! A hybrid application shell talks to [`analytics::FirebaseAnalytics`] through the same set of
//! operations on every target. Native targets bind an SDK that is available immediately; the web
//! target fetches the Firebase JS SDK on `initialize_firebase` and suspends every call until it is
//! attached (or reports the load failure to all of them).
//!
//! ```
//! use std::sync::Arc;
//!
//! use firebase_analytics_bridge::analytics::{
//!     FirebaseAnalytics, InMemoryAnalyticsSdk, LogEventOptions, SetUserIdOptions,
//! };
//!
//! # futures::executor::block_on(async {
//! let sdk = Arc::new(InMemoryAnalyticsSdk::new());
//! let analytics = FirebaseAnalytics::native(sdk.clone());
//!
//! analytics.set_user_id(SetUserIdOptions::new("user-42")).await?;
//! analytics
//!     .log_event(LogEventOptions::new("purchase").with_param("amount", 10))
//!     .await?;
//!
//! assert_eq!(sdk.user_id().as_deref(), Some("user-42"));
//! # Ok::<(), firebase_analytics_bridge::analytics::AnalyticsError>(())
//! # }).unwrap();
//! ```

pub mod analytics;
pub mod logger;
pub mod platform;

#[cfg(test)]
pub mod test_support;
