//! # Phoenix Core Library
//!
//! Core logic for the Phoenix daily tracker: a personal log of active
//! minutes, health and execution notes, bookings, prototype audits and
//! outreach contacts over a fixed program window, plus plain-text drafts
//! generated from that record. The `phoenix` CLI is a thin layer over this
//! crate.
//!
//! ## Architecture
//!
//! - **State**: one serializable [`AppState`] document, normalized on load
//! - **Store**: [`StateStore`] owns the state, its backend and the status
//!   channel, and exposes every mutation
//! - **Storage**: SQLite key-value persistence with an in-memory fallback,
//!   and TOML-based configuration
//! - **Derive**: pure computations (window progress, range filters, gate
//!   scores, warnings, compliance guard)
//! - **Sprint**: a caller-driven focus timer guarded by tick tokens
//! - **Generator**: the three document drafts
//!
//! ## Key Components
//!
//! - [`StateStore`]: lifecycle and mutation entry points
//! - [`SprintTimer`]: focus-sprint state machine
//! - [`Config`]: application configuration management

pub mod dates;
pub mod derive;
pub mod error;
pub mod events;
pub mod generator;
pub mod sprint;
pub mod state;
pub mod status;
pub mod storage;
pub mod store;

pub use dates::ProgramWindow;
pub use error::{ConfigError, CoreError, ImportError, StorageError, ValidationError};
pub use events::Event;
pub use generator::{Document, DocumentKind};
pub use sprint::{format_timer, SprintTimer, TickOutcome, TickToken};
pub use state::{normalize, AppState, VERSION};
pub use status::{Status, StatusChannel};
pub use storage::{Config, Database, KeyValueStore, MemoryStorage};
pub use store::{LogKind, SaveOutcome, StateStore};
