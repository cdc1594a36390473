//! WebView-based browser window using `wry` + `tao`.
//!
//! Architecture:
//! - Every tab gets its own child webview, created hidden and shown by
//!   `ViewCommand::Show`. Page loads, title changes, and popup requests come
//!   back as `ViewEvent`s through the event loop proxy.
//! - The chrome webview holds the address bar. While the current tab is the
//!   new-tab page it covers the whole window and draws that page itself.
//! - IPC from the chrome page → Rust via `window.ipc.postMessage()`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use serde_json::{json, Value};
use tao::event::{Event, WindowEvent};
use tao::event_loop::{ControlFlow, EventLoop, EventLoopBuilder, EventLoopProxy};
use tao::window::{Window, WindowBuilder};
use wry::dpi::{LogicalPosition, LogicalSize};
use wry::{PageLoadEvent, Rect, WebView, WebViewBuilder};

use crate::app::{Browser, ShellAction, WindowKind};
use crate::config::ShellConfig;
use crate::managers::tab_manager::TabManagerTrait;
use crate::services::event_bus::EventBus;
use crate::services::settings_engine::SettingsEngineTrait;
use crate::types::tab::TabId;
use crate::view::{ViewCommand, ViewEvent, ViewHost};

const CHROME_HEIGHT: f64 = 44.0;
const TICK_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug)]
enum UserEvent {
    View(ViewEvent),
    Chrome(String),
}

const CHROME_HTML: &str = r#"<!DOCTYPE html><html><head><meta charset="UTF-8"><style>
*{margin:0;padding:0;box-sizing:border-box}
body{font-family:-apple-system,"Segoe UI",sans-serif;background:#0d1117;color:#e6edf3;height:100vh}
#bar{display:flex;gap:6px;align-items:center;height:44px;padding:6px 8px;border-bottom:1px solid #30363d}
#bar button{background:#21262d;color:#e6edf3;border:1px solid #30363d;border-radius:6px;padding:4px 10px}
#tabs{display:flex;gap:4px;overflow:hidden;max-width:45%}
.tab{padding:4px 8px;border-radius:6px;background:#161b22;white-space:nowrap;overflow:hidden;max-width:160px;cursor:default}
.tab.on{background:#1f6feb}
#url{flex:1;background:#161b22;color:#e6edf3;border:1px solid #30363d;border-radius:6px;padding:5px 10px}
#newtab{display:flex;align-items:center;justify-content:center;height:calc(100vh - 44px);font-size:32px;color:#7d8590}
</style></head><body>
<div id="bar"><button data-cmd="back">&#8592;</button><button data-cmd="forward">&#8594;</button>
<button data-cmd="reload">&#8635;</button><div id="tabs"></div><button data-cmd="new_tab">+</button>
<input id="url" placeholder="Search or enter address"></div>
<div id="newtab">Tabshell</div>
<script>
function send(cmd,extra){window.ipc.postMessage(JSON.stringify(Object.assign({cmd:cmd},extra||{})))}
document.querySelectorAll('[data-cmd]').forEach(function(b){b.onclick=function(){send(b.dataset.cmd)}});
var url=document.getElementById('url');
url.addEventListener('keydown',function(e){if(e.key==='Enter'&&url.value.trim())send('navigate',{url:url.value.trim()})});
window.tabshell={update:function(s){
  var t=document.getElementById('tabs');t.innerHTML='';
  s.tabs.forEach(function(tab){var d=document.createElement('div');
    d.className='tab'+(tab.id===s.currentTabId?' on':'');d.textContent=tab.title||tab.url;
    d.onclick=function(){send('switch_tab',{id:tab.id})};
    d.onauxclick=function(){send('close_tab',{id:tab.id})};t.appendChild(d)});
  var cur=s.tabs.find(function(tab){return tab.id===s.currentTabId});
  if(document.activeElement!==url)url.value=cur&&cur.url!=='newtab'?cur.url:'';
}};
send('ui_ready');
</script></body></html>"#;

// ─── View host ───

struct Surface {
    window: Rc<Window>,
    chrome: WebView,
    pages: HashMap<TabId, WebView>,
    visible: Option<TabId>,
}

impl Surface {
    fn size(&self) -> (f64, f64) {
        let scale = self.window.scale_factor();
        let size = self.window.inner_size();
        (size.width as f64 / scale, size.height as f64 / scale)
    }

    fn page_rect(&self) -> Rect {
        let (width, height) = self.size();
        Rect {
            position: LogicalPosition::new(0.0, CHROME_HEIGHT).into(),
            size: LogicalSize::new(width, (height - CHROME_HEIGHT).max(0.0)).into(),
        }
    }

    /// The chrome covers the window while no page is visible.
    fn layout(&self) {
        let (width, height) = self.size();
        let chrome_height = if self.visible.is_some() { CHROME_HEIGHT } else { height };
        let _ = self.chrome.set_bounds(Rect {
            position: LogicalPosition::new(0.0, 0.0).into(),
            size: LogicalSize::new(width, chrome_height).into(),
        });
        let rect = self.page_rect();
        for page in self.pages.values() {
            let _ = page.set_bounds(rect);
        }
    }

    fn set_page_visible(&self, tab_id: &str, visible: bool) {
        if let Some(page) = self.pages.get(tab_id) {
            if let Err(e) = page.set_visible(visible) {
                tracing::warn!(tab_id, error = %e, "failed to change page visibility");
            }
        }
    }
}

/// Renders each tab in a `wry` child webview.
pub struct WryViewHost {
    surface: Rc<RefCell<Surface>>,
    proxy: EventLoopProxy<UserEvent>,
}

impl WryViewHost {
    fn build_page(&self, tab_id: &str) -> wry::Result<WebView> {
        let surface = self.surface.borrow();
        let load_proxy = self.proxy.clone();
        let title_proxy = self.proxy.clone();
        let popup_proxy = self.proxy.clone();
        let load_id = tab_id.to_string();
        let title_id = tab_id.to_string();

        WebViewBuilder::new()
            .with_visible(false)
            .with_bounds(surface.page_rect())
            .with_on_page_load_handler(move |event, url| {
                if let PageLoadEvent::Finished = event {
                    let _ = load_proxy.send_event(UserEvent::View(ViewEvent::Navigated {
                        tab_id: load_id.clone(),
                        url,
                    }));
                }
            })
            .with_document_title_changed_handler(move |title| {
                let _ = title_proxy.send_event(UserEvent::View(ViewEvent::TitleUpdated {
                    tab_id: title_id.clone(),
                    title,
                }));
            })
            .with_new_window_req_handler(move |url, _features| {
                let _ = popup_proxy.send_event(UserEvent::View(ViewEvent::NewWindow { url }));
                wry::NewWindowResponse::Deny
            })
            .with_devtools(cfg!(debug_assertions))
            .build_as_child(surface.window.as_ref())
    }

    fn with_page<F>(&self, tab_id: &str, f: F)
    where
        F: FnOnce(&WebView) -> wry::Result<()>,
    {
        let surface = self.surface.borrow();
        if let Some(page) = surface.pages.get(tab_id) {
            if let Err(e) = f(page) {
                tracing::warn!(tab_id, error = %e, "view command failed");
            }
        }
    }
}

impl ViewHost for WryViewHost {
    fn dispatch(&mut self, command: ViewCommand) {
        match command {
            ViewCommand::Create { tab_id } => match self.build_page(&tab_id) {
                Ok(page) => {
                    self.surface.borrow_mut().pages.insert(tab_id, page);
                }
                Err(e) => tracing::error!(tab_id = %tab_id, error = %e, "failed to create view"),
            },
            ViewCommand::Destroy { tab_id } => {
                let mut surface = self.surface.borrow_mut();
                surface.pages.remove(&tab_id);
                if surface.visible.as_deref() == Some(tab_id.as_str()) {
                    surface.visible = None;
                    surface.layout();
                }
            }
            ViewCommand::Navigate { tab_id, url } => self.with_page(&tab_id, |p| p.load_url(&url)),
            ViewCommand::Reload { tab_id } => self.with_page(&tab_id, |p| p.reload()),
            ViewCommand::Back { tab_id } => {
                self.with_page(&tab_id, |p| p.evaluate_script("history.back()"))
            }
            ViewCommand::Forward { tab_id } => {
                self.with_page(&tab_id, |p| p.evaluate_script("history.forward()"))
            }
            ViewCommand::Show { tab_id } => {
                let mut surface = self.surface.borrow_mut();
                if let Some(previous) = surface.visible.take() {
                    surface.set_page_visible(&previous, false);
                }
                surface.set_page_visible(&tab_id, true);
                surface.visible = Some(tab_id);
                surface.layout();
            }
            ViewCommand::Hide => {
                let mut surface = self.surface.borrow_mut();
                if let Some(previous) = surface.visible.take() {
                    surface.set_page_visible(&previous, false);
                }
                surface.layout();
            }
        }
    }
}

// ─── Chrome IPC ───

fn handle_chrome(browser: &mut Browser, message: &str) -> ShellAction {
    let Ok(msg) = serde_json::from_str::<Value>(message) else {
        tracing::debug!(message, "malformed chrome message");
        return ShellAction::Continue;
    };
    let cmd = msg.get("cmd").and_then(|v| v.as_str()).unwrap_or("");
    let id = msg.get("id").and_then(|v| v.as_str()).map(str::to_string);
    let current = browser.tabs.current_tab_id().map(str::to_string);

    match (cmd, id.or(current)) {
        ("navigate", Some(tab)) => {
            let input = msg.get("url").and_then(|v| v.as_str()).unwrap_or("");
            let url = browser.settings.get_settings().general.resolve_address(input);
            let _ = browser.navigate(&tab, &url);
        }
        ("new_tab", _) => {
            browser.create_tab(None);
        }
        ("close_tab", Some(tab)) => {
            if let Ok(ShellAction::Quit) = browser.close_tab(&tab) {
                return ShellAction::Quit;
            }
        }
        ("switch_tab", Some(tab)) => {
            let _ = browser.switch_tab(&tab);
        }
        ("back", Some(tab)) => {
            let _ = browser.go_back(&tab);
        }
        ("forward", Some(tab)) => {
            let _ = browser.go_forward(&tab);
        }
        ("reload", Some(tab)) => {
            let _ = browser.tabs.reload_tab(&tab);
        }
        ("reopen", _) => {
            browser.tabs.reopen_closed_tab();
        }
        _ => {}
    }
    ShellAction::Continue
}

fn push_tabs(surface: &Rc<RefCell<Surface>>, browser: &Browser) {
    let snapshot = json!(browser.tabs.snapshot());
    let script = format!("window.tabshell&&tabshell.update({})", snapshot);
    if let Err(e) = surface.borrow().chrome.evaluate_script(&script) {
        tracing::debug!(error = %e, "failed to update chrome");
    }
}

// ─── Main entry point ───

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ShellConfig::load_or_default();
    let store = config.open_store()?;
    let bus = EventBus::new(config.event_capacity);

    let event_loop: EventLoop<UserEvent> = EventLoopBuilder::with_user_event().build();
    let proxy = event_loop.create_proxy();

    let window = Rc::new(
        WindowBuilder::new()
            .with_title("Tabshell")
            .with_inner_size(tao::dpi::LogicalSize::new(1280.0, 800.0))
            .build(&event_loop)?,
    );

    let ipc_proxy = proxy.clone();
    let chrome = WebViewBuilder::new()
        .with_html(CHROME_HTML)
        .with_ipc_handler(move |msg: wry::http::Request<String>| {
            let _ = ipc_proxy.send_event(UserEvent::Chrome(msg.body().clone()));
        })
        .build_as_child(window.as_ref())?;

    let surface = Rc::new(RefCell::new(Surface {
        window: window.clone(),
        chrome,
        pages: HashMap::new(),
        visible: None,
    }));
    surface.borrow().layout();

    let host = WryViewHost {
        surface: surface.clone(),
        proxy,
    };
    let mut browser = Browser::new("main", WindowKind::Main, store, &bus, Box::new(host), &config);
    browser.startup();

    let mut next_tick = Instant::now() + TICK_INTERVAL;

    event_loop.run(move |event, _, control_flow| {
        let now = Instant::now();
        if now >= next_tick {
            browser.tick(now);
            next_tick = now + TICK_INTERVAL;
        }
        *control_flow = ControlFlow::WaitUntil(next_tick);

        match event {
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => {
                browser.shutdown();
                *control_flow = ControlFlow::Exit;
            }
            Event::WindowEvent {
                event: WindowEvent::Resized(_),
                ..
            } => surface.borrow().layout(),
            Event::UserEvent(UserEvent::View(view_event)) => {
                browser.handle_view_event(view_event);
                push_tabs(&surface, &browser);
            }
            Event::UserEvent(UserEvent::Chrome(message)) => {
                if handle_chrome(&mut browser, &message) == ShellAction::Quit {
                    browser.shutdown();
                    *control_flow = ControlFlow::Exit;
                    return;
                }
                push_tabs(&surface, &browser);
            }
            _ => {}
        }
    })
}
