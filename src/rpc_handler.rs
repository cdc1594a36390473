//! RPC method handler for the Tabshell JSON-RPC protocol.
//!
//! Extracted from `rpc_server.rs` so it can be unit-tested independently.
//! `handle_method` dispatches window commands to the `Browser`;
//! `handle_store_method` serves raw `store.*` access through the async
//! `StoreBridge`.

use serde_json::{json, Value};

use crate::app::{Browser, ShellAction};
use crate::managers::bookmark_manager::{BookmarkManagerTrait, LinkCollection};
use crate::managers::tab_manager::TabManagerTrait;
use crate::services::settings_engine::SettingsEngineTrait;
use crate::storage::StoreBridge;
use crate::types::settings::ThemeMode;
use crate::view::ViewEvent;

fn str_param<'a>(params: &'a Value, name: &str) -> Result<&'a str, String> {
    params
        .get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", name))
}

fn index_param(params: &Value, name: &str) -> Result<usize, String> {
    params
        .get(name)
        .and_then(|v| v.as_u64())
        .map(|i| i as usize)
        .ok_or_else(|| format!("missing {}", name))
}

/// True when a `tab.close` result asks the front end to quit.
pub fn is_quit(result: &Value) -> bool {
    result.get("quit").and_then(Value::as_bool).unwrap_or(false)
}

/// Dispatch a JSON-RPC method call to the window.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub fn handle_method(browser: &mut Browser, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        // ─── Tabs ───
        "tab.create" => {
            let url = params.get("url").and_then(|v| v.as_str());
            let id = browser.create_tab(url);
            Ok(json!({"id": id}))
        }
        "tab.navigate" => {
            let id = str_param(params, "id")?;
            let url = str_param(params, "url")?;
            browser.navigate(id, url).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "tab.back" => {
            let id = str_param(params, "id")?;
            let moved = browser.go_back(id).map_err(|e| e.to_string())?;
            Ok(json!({"moved": moved}))
        }
        "tab.forward" => {
            let id = str_param(params, "id")?;
            let moved = browser.go_forward(id).map_err(|e| e.to_string())?;
            Ok(json!({"moved": moved}))
        }
        "tab.close" => {
            let id = str_param(params, "id")?;
            let action = browser.close_tab(id).map_err(|e| e.to_string())?;
            Ok(json!({"quit": action == ShellAction::Quit}))
        }
        "tab.switch" => {
            let id = str_param(params, "id")?;
            browser.switch_tab(id).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "tab.reload" => {
            let id = str_param(params, "id")?;
            browser.tabs.reload_tab(id).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "tab.reopen" => {
            let id = browser.tabs.reopen_closed_tab();
            Ok(json!({"id": id}))
        }
        "tab.pin" => {
            let id = str_param(params, "id")?;
            let pinned = params.get("pinned").and_then(|v| v.as_bool()).unwrap_or(true);
            browser.tabs.set_pinned(id, pinned).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "tab.move" => {
            let id = str_param(params, "id")?;
            let index = index_param(params, "index")?;
            browser.tabs.move_tab(id, index).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "tab.list" => {
            let snapshot = browser.tabs.snapshot();
            serde_json::to_value(&snapshot).map_err(|e| e.to_string())
        }
        "tab.current" => {
            let current = browser.tabs.current_tab();
            serde_json::to_value(current).map_err(|e| e.to_string())
        }

        // ─── View callbacks ───
        "view.navigated" => {
            let tab_id = str_param(params, "tabId")?.to_string();
            let url = str_param(params, "url")?.to_string();
            browser.handle_view_event(ViewEvent::Navigated { tab_id, url });
            Ok(json!({"ok": true}))
        }
        "view.titleUpdated" => {
            let tab_id = str_param(params, "tabId")?.to_string();
            let title = str_param(params, "title")?.to_string();
            browser.handle_view_event(ViewEvent::TitleUpdated { tab_id, title });
            Ok(json!({"ok": true}))
        }
        "view.newWindow" => {
            let url = str_param(params, "url")?.to_string();
            browser.handle_view_event(ViewEvent::NewWindow { url });
            Ok(json!({"ok": true}))
        }
        "view.openInNewTab" => {
            let url = str_param(params, "url")?.to_string();
            browser.handle_view_event(ViewEvent::OpenInNewTab { url });
            Ok(json!({"ok": true}))
        }
        "view.back" => Ok(json!({"sent": browser.host_back()})),
        "view.forward" => Ok(json!({"sent": browser.host_forward()})),

        // ─── History ───
        "history.list" => {
            let entries = browser.history.entries();
            let limit = params.get("limit").and_then(|v| v.as_u64()).map(|l| l as usize);
            let newest: Vec<_> = entries
                .iter()
                .rev()
                .take(limit.unwrap_or(entries.len()))
                .collect();
            serde_json::to_value(newest).map_err(|e| e.to_string())
        }
        "history.search" => {
            let query = str_param(params, "query")?;
            serde_json::to_value(browser.history.search(query)).map_err(|e| e.to_string())
        }
        "history.clear" => {
            browser.clear_history();
            Ok(json!({"ok": true}))
        }

        // ─── Bookmarks / quick links ───
        "bookmark.add" => link_add(&mut browser.bookmarks, params),
        "bookmark.list" => link_list(&browser.bookmarks),
        "bookmark.delete" => link_delete(&mut browser.bookmarks, params),
        "quicklink.add" => link_add(&mut browser.quick_links, params),
        "quicklink.list" => link_list(&browser.quick_links),
        "quicklink.delete" => link_delete(&mut browser.quick_links, params),

        // ─── Settings ───
        "settings.get" => {
            serde_json::to_value(browser.settings.get_settings()).map_err(|e| e.to_string())
        }
        "settings.set" => {
            let key = str_param(params, "key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            browser.settings.set_value(key, value).map_err(|e| e.to_string())?;
            let theme = browser.settings.get_settings().appearance.theme.clone();
            browser.theme.apply(theme);
            Ok(json!({"ok": true}))
        }
        "settings.theme" => {
            let theme = params.get("theme").cloned().ok_or("missing theme")?;
            let theme: ThemeMode = serde_json::from_value(theme).map_err(|e| format!("invalid theme: {}", e))?;
            browser.set_theme(theme);
            Ok(json!({"theme": browser.theme.effective_theme()}))
        }

        // ─── Session ───
        "session.restoreLast" => {
            let restored = browser.restore_last_session();
            Ok(json!({"restored": restored}))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}

fn link_add(links: &mut LinkCollection, params: &Value) -> Result<Value, String> {
    let url = str_param(params, "url")?;
    let label = params.get("label").and_then(|v| v.as_str());
    let index = links.add(url, label).map_err(|e| e.to_string())?;
    Ok(json!({"index": index}))
}

fn link_list(links: &LinkCollection) -> Result<Value, String> {
    serde_json::to_value(links.list()).map_err(|e| e.to_string())
}

fn link_delete(links: &mut LinkCollection, params: &Value) -> Result<Value, String> {
    let index = index_param(params, "index")?;
    let removed = links.remove(index).map_err(|e| e.to_string())?;
    Ok(json!({"removed": removed}))
}

/// Serves `store.*` methods. Returns `None` for any other method.
pub async fn handle_store_method(
    bridge: &StoreBridge,
    method: &str,
    params: &Value,
) -> Option<Result<Value, String>> {
    let result = match method {
        "store.get" => match str_param(params, "key") {
            Ok(key) => bridge
                .get(key)
                .await
                .map(|value| json!({"value": value}))
                .map_err(|e| e.to_string()),
            Err(e) => Err(e),
        },
        "store.set" => match (str_param(params, "key"), str_param(params, "value")) {
            (Ok(key), Ok(value)) => bridge
                .set(key, value)
                .await
                .map(|_| json!({"ok": true}))
                .map_err(|e| e.to_string()),
            (Err(e), _) | (_, Err(e)) => Err(e),
        },
        "store.remove" => match str_param(params, "key") {
            Ok(key) => bridge
                .remove(key)
                .await
                .map(|_| json!({"ok": true}))
                .map_err(|e| e.to_string()),
            Err(e) => Err(e),
        },
        "store.keys" => bridge
            .list_keys()
            .await
            .map(|keys| json!(keys))
            .map_err(|e| e.to_string()),
        _ => return None,
    };
    Some(result)
}
