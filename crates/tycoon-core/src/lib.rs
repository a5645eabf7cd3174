//! Session layer for the Tycoon earning game.
//!
//! A [`GameSession`] wraps one player's statistics record, the current task
//! batch and the presentation state (active view, open task, withdrawal
//! form, transient notification). All state changes go through the
//! economy engine; the session only decides when to call it and what to
//! tell the player.
//!
//! # Modules
//!
//! - [`config`] -- Loading `tycoon-config.yaml` into typed structs
//! - [`controller`] -- [`GameSession`] and its operations
//! - [`session`] -- Session state and client-facing snapshots
//! - [`regen`] -- The background energy ticker
//! - [`error`] -- Session errors and their player-facing messages

pub mod config;
pub mod controller;
pub mod error;
pub mod regen;
pub mod session;

pub use config::{ConfigError, TycoonConfig};
pub use controller::{
    DEFAULT_NOTIFICATION_TTL, FetchOutcome, GameSession, SessionSettings, SessionUpdate,
    SubmitOutcome, UpdateReason,
};
pub use error::SessionError;
pub use regen::spawn_energy_regen;
pub use session::{
    Notification, SessionSnapshot, SessionState, TaskView, WithdrawForm, WithdrawFormUpdate,
};
