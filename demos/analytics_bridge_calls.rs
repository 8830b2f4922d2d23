//! Drives the analytics plugin the way a hybrid shell does: serialized method calls are decoded
//! and forwarded to the SDK. Uses the in-memory SDK, so nothing leaves the process.
//! Set `FIREBASE_CONFIG` to see the options picked up from the environment.

use std::sync::Arc;

use firebase_analytics_bridge::analytics::{
    dispatch, FirebaseAnalytics, FirebaseOptions, InMemoryAnalyticsSdk, PluginCall,
};
use serde_json::json;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let options = FirebaseOptions::from_environment().unwrap_or_else(|| FirebaseOptions {
        project_id: Some("your-project-id".into()),
        measurement_id: Some("G-1234567890".into()),
        ..Default::default()
    });
    println!("Using Firebase options: {}", serde_json::to_string(&options)?);

    let sdk = Arc::new(InMemoryAnalyticsSdk::new());
    let analytics = FirebaseAnalytics::native(sdk.clone());

    let calls = [
        PluginCall::new("initializeFirebase", serde_json::to_value(&options)?),
        PluginCall::new("setCollectionEnabled", json!({ "enabled": true })),
        PluginCall::new("setUserId", json!({ "userId": "user-42" })),
        PluginCall::new("setUserProperty", json!({ "name": "favorite_food", "value": "pizza" })),
        PluginCall::new("setScreenName", json!({ "screenName": "checkout" })),
        PluginCall::new(
            "logEvent",
            json!({
                "name": "select_content",
                "params": { "content_type": "image", "item_id": "sku-1", "value": 3 }
            }),
        ),
        PluginCall::new("getAppInstanceId", json!(null)),
    ];

    for call in &calls {
        let result = dispatch(&analytics, call).await?;
        println!("{} -> {}", call.method, result);
    }

    for event in sdk.collected_events() {
        println!("Collected event: {} {:?}", event.name, event.params);
    }

    Ok(())
}
