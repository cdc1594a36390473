//! Tabshell: the tab, session, and navigation-history core of a thin desktop
//! browser shell.
//!
//! This library crate exposes all modules for use by the binaries and integration tests.

pub mod app;
pub mod config;
pub mod database;
pub mod logging;
pub mod managers;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod storage;
pub mod types;
pub mod view;

#[cfg(feature = "gui")]
pub mod ui;
