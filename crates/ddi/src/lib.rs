//! # ddi
//!
//! Blocking client for the Infoblox DDI and infrastructure REST APIs.
//!
//! This crate provides:
//! - An authenticated HTTP client with uniform error reporting
//! - A catalog of resource types and where they live on the wire
//! - Next-available address, subnet and address block queries
//!
//! Each catalog entry plugs into the `declarative` engine through
//! [`HttpClient::resource`].
//!
//! ## Example
//!
//! ```no_run
//! use ddi::{ClientConfig, HttpClient};
//!
//! let client = HttpClient::new(ClientConfig::new("https://csp.infoblox.com", "secret"))?;
//! for block in client.next_available_address_blocks("ipam/address_block/abc", Some(24), Some(2))? {
//!     println!("{block}");
//! }
//! # Ok::<(), ddi::Error>(())
//! ```
//!
//! ## Resource Types
//!
//! | Type                 | API prefix      | Collection           |
//! |----------------------|-----------------|----------------------|
//! | `dns_view`           | `/api/ddi/v1`   | `dns/view`           |
//! | `dns_auth_zone`      | `/api/ddi/v1`   | `dns/auth_zone`      |
//! | `ipam_address_block` | `/api/ddi/v1`   | `ipam/address_block` |
//! | `infra_join_token`   | `/api/infra/v1` | `jointoken`          |
//!
//! See [`catalog::all`] for the full list.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod client;
pub mod error;
pub mod next_available;

pub use client::{ClientConfig, DEFAULT_TIMEOUT, HttpClient, ResourceEndpoint};
pub use error::{Error, ErrorCategory, Result};
