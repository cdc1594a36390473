//! Tabshell RPC server: JSON-RPC over stdin/stdout for an external UI process.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"tab.navigate", "params":{"id":"...","url":"..."}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//! View commands are pushed as {"event":"view","command":{...}} lines ahead of
//! the response to the request that caused them.

use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use tabshell::app::{Browser, WindowKind};
use tabshell::config::ShellConfig;
use tabshell::rpc_handler::{handle_method, handle_store_method, is_quit};
use tabshell::services::event_bus::EventBus;
use tabshell::storage::StoreBridge;
use tabshell::view::JsonLineViewHost;

const MAIN_WINDOW: &str = "main";
const TICK_INTERVAL: Duration = Duration::from_millis(250);

struct Output {
    stdout: tokio::io::Stdout,
}

impl Output {
    async fn line(&mut self, value: &Value) -> std::io::Result<()> {
        let mut bytes = value.to_string().into_bytes();
        bytes.push(b'\n');
        self.stdout.write_all(&bytes).await?;
        self.stdout.flush().await
    }

    /// Writes every view command queued so far.
    async fn drain_view(&mut self, rx: &mut mpsc::UnboundedReceiver<Value>) -> std::io::Result<()> {
        while let Ok(event) = rx.try_recv() {
            self.line(&event).await?;
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tabshell::logging::init();

    let config = ShellConfig::load_or_default();
    let store = config.open_store()?;
    let bridge = StoreBridge::spawn(store.clone())?;
    let bus = EventBus::new(config.event_capacity);
    let (host, mut view_rx) = JsonLineViewHost::channel();

    let mut browser = Browser::new(MAIN_WINDOW, WindowKind::Main, store, &bus, Box::new(host), &config);
    let mut out = Output { stdout: tokio::io::stdout() };

    browser.startup();
    out.drain_view(&mut view_rx).await?;

    // Signal ready
    out.line(&json!({"event":"ready","version":env!("CARGO_PKG_VERSION")})).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(TICK_INTERVAL);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                browser.tick(std::time::Instant::now());
                out.drain_view(&mut view_rx).await?;
            }
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(l)) => l,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!(error = %e, "stdin read failed");
                        break;
                    }
                };
                if line.trim().is_empty() { continue; }

                let req: Value = match serde_json::from_str(&line) {
                    Ok(v) => v,
                    Err(e) => {
                        out.line(&json!({"id":null,"error":format!("parse error: {}",e)})).await?;
                        continue;
                    }
                };

                let id = req.get("id").cloned().unwrap_or(Value::Null);
                let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
                let params = req.get("params").cloned().unwrap_or(json!({}));
                tracing::debug!(method, "rpc request");

                let result = match handle_store_method(&bridge, method, &params).await {
                    Some(result) => result,
                    None => handle_method(&mut browser, method, &params),
                };
                let quit = method == "tab.close" && result.as_ref().is_ok_and(is_quit);

                out.drain_view(&mut view_rx).await?;
                let response = match result {
                    Ok(val) => json!({"id": id, "result": val}),
                    Err(err) => json!({"id": id, "error": err}),
                };
                out.line(&response).await?;

                if quit {
                    break;
                }
            }
        }
    }

    browser.shutdown();
    out.drain_view(&mut view_rx).await?;
    tracing::info!("rpc server exiting");
    Ok(())
}
