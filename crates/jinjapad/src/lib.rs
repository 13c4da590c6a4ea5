//! jinjapad - a local scratchpad service for Jinja templates.
//!
//! Paste JSON or YAML input and a template, get the rendered result back.
//! Renders are kept in a bounded history, and input can be loaded from a
//! fixture directory.
//!
//! # Architecture
//!
//! - **Render**: detects the input format (JSON first, then YAML) and evaluates
//!   the template in a sandboxed minijinja environment with strict undefined
//!   handling and an extra filter set
//! - **Stores**: [`SettingsStore`] (TOML) and [`HistoryLog`] (JSON) each own
//!   one file and do a full read-modify-write per mutation
//! - **Fixtures**: [`FixtureResolver`] lists the fixture directory and reads
//!   bare file names confined to it
//!
//! # Security
//!
//! - Templates cannot load other templates or touch the filesystem
//! - Fixture reads reject anything but bare names, then check the canonical
//!   path stays inside the canonical fixture root
//! - The server binds to loopback by default; there is no authentication

pub mod config;
pub mod error;
pub mod fixtures;
pub mod history;
pub mod render;
pub mod routes;
pub mod settings;
pub mod state;

pub use config::Config;
pub use fixtures::FixtureResolver;
pub use history::HistoryLog;
pub use routes::router;
pub use settings::SettingsStore;
pub use state::AppState;
