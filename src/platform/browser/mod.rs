mod firebase;

pub use firebase::BrowserSdkLoader;
