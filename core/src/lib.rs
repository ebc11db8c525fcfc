//! Client core for the launch-data REST API.
//!
//! # Overview
//! Caller options are validated and normalized per endpoint (`params`), sent
//! as GET requests (`client`, `transport`), and, for launches, mirrored into
//! a continuously updated local cache (`watcher`).
//!
//! # Design
//! - Validation is synchronous and runs before any I/O; a rejected option
//!   never reaches the transport.
//! - Requests and responses are plain data (`http`), so the I/O boundary is
//!   explicit and the `Transport` can be swapped.
//! - Entities are opaque `Record`s with a typed `id`.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod params;
pub mod resource;
pub mod transport;
pub mod types;
pub mod watcher;

pub use client::{LaunchClient, LaunchFeed};
pub use config::{ApiKey, AuthMode, ClientConfig};
pub use error::{ApiError, ConfigError, Error, ValidationError};
pub use http::{HttpRequest, HttpResponse};
pub use params::{validate, RawOptions, RawValue, Validated, ValidationWarning, WireParams};
pub use resource::Resource;
pub use transport::{ReqwestTransport, Transport};
pub use types::{Page, Record};
pub use watcher::{EventKind, Fetch, WatchEvent, Watcher, WatcherState};
