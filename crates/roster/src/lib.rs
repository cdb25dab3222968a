//! `roster` - A small record table with pluggable persistence
//!
//! This library provides the record store, form validation and view
//! controller behind the `roster` CLI. Records can be kept in memory, in a
//! local `SQLite` file, or on a remote record server over HTTP.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod record;
pub mod render;
pub mod shell;
pub mod store;
pub mod validate;

pub use config::{BackendKind, Config};
pub use controller::{Intent, Mode, ViewController};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use record::{Candidate, NewRecord, Record, RecordId, RecordRef};
pub use store::{open_backend, Backend, RecordStore};
pub use validate::{validate, Field, FieldErrors};
