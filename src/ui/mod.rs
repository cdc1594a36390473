//! Tabshell UI layer (feature `gui`).
//!
//! Uses `wry` for cross-platform WebView rendering:
//! - Windows: WebView2
//! - Linux: WebKitGTK (child webviews need X11)
//! - macOS: WKWebView
//!
//! One child webview per tab renders page content; a chrome webview on top
//! draws the address bar and the new-tab page.

pub mod webview_app;
