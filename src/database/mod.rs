//! Tabshell SQLite layer.
//!
//! Backs the secondary key-value store. Provides connection management and
//! versioned schema migrations.
//!
//! # Usage
//!
//! ```no_run
//! use tabshell::database::Database;
//!
//! let db = Database::open("fallback.db").expect("failed to open database");
//! let conn = db.connection();
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;
