//! # oidcd-core
//!
//! Shared foundations for the oidcd authorization server:
//!
//! - [`config`] - Immutable server configuration (issuer, endpoint paths,
//!   default token lifetimes), built once at startup
//! - [`clock`] - The current-time source supplied by the host
//!
//! Configuration is read-only after startup: endpoint pipelines receive it
//! behind an `Arc` and never mutate it.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod clock;
pub mod config;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::ServerConfig;
