//! # oidcd-model
//!
//! Data model for the oidcd authorization server: the authentication
//! ticket every token kind serializes, and the pieces it owns.
//!
//! ## Modules
//!
//! - [`claim`] - `Claim` and the per-claim destination filter
//! - [`principal`] - `Identity` (with its delegation actor chain) and
//!   `Principal`
//! - [`properties`] - The ticket metadata bag
//! - [`ticket`] - `Ticket` and the reserved property accessors
//! - [`types`] - Token kinds, confidentiality levels and reserved names
//!
//! ## Ownership
//!
//! Tickets, identities and claims form an owned tree: nothing in this
//! crate aliases another ticket's data. The only sanctioned way to branch
//! a ticket's lifetime is [`Ticket::filtered`], which deep-copies the
//! whole principal (actor chains included) while applying a claim filter.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod claim;
pub mod error;
pub mod principal;
pub mod properties;
pub mod ticket;
pub mod types;

pub use claim::Claim;
pub use error::{Error, Result};
pub use principal::{Identity, Principal};
pub use properties::Properties;
pub use ticket::Ticket;
pub use types::{claims, properties as property_names, ConfidentialityLevel, TokenKind};
