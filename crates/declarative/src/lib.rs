//! # Declarative
//!
//! A framework for declarative reconciliation of remote resources.
//!
//! Given a desired state for an object held by a remote store, the engine
//! finds the object (by id or natural key), decides whether it differs, and
//! performs the single action that converges it: create, update, delete or
//! nothing.
//!
//! ## Core Concepts
//!
//! - **Resource**: Static metadata of a resource type (natural key, readonly fields)
//! - **DesiredState**: The caller's partial description of an object
//! - **Reconciler**: Resolves, diffs and converges one object
//! - **Executor**: Runs independent reconciliations, optionally in parallel
//!
//! ## Example
//!
//! ```
//! use declarative::{
//!     DesiredState, LifecycleState, MemoryClient, ReconcileRequest, Reconciler,
//!     ResourceDescriptor,
//! };
//!
//! const ZONE: ResourceDescriptor =
//!     ResourceDescriptor::new("dns_auth_zone", "AuthZone", "/api/ddi/v1", "dns/auth_zone")
//!         .with_natural_key(&["fqdn"])
//!         .with_readonly(&["fqdn"]);
//!
//! let client = MemoryClient::new("dns/auth_zone");
//! let desired = DesiredState::new().with("fqdn", "example.com.").with("comment", "lab");
//!
//! // First run creates, second run finds nothing to do
//! let request = ReconcileRequest::new(desired);
//! assert!(Reconciler::new(&client, &ZONE).run(&request)?.changed);
//! assert!(!Reconciler::new(&client, &ZONE).run(&request)?.changed);
//!
//! // Delete it again
//! let request = request.with_state(LifecycleState::Absent);
//! assert_eq!(Reconciler::new(&client, &ZONE).run(&request)?.msg, "AuthZone deleted");
//! # Ok::<(), declarative::Error>(())
//! ```
//!
//! ## Provider Traits
//!
//! The crate uses traits for dependency injection:
//!
//! - [`ResourceClient`]: Reads and mutates one collection of the remote store
//! - [`ProgressCallback`]: Receives progress updates during batch execution
//!
//! This allows the crate to be used without hard dependencies on a
//! transport or UI.

pub mod context;
pub mod diff;
pub mod error;
pub mod executor;
pub mod filter;
pub mod guard;
pub mod memory;
pub mod outcome;
pub mod pagination;
pub mod reconciler;
pub mod request;
pub mod resolver;
pub mod resource;
pub mod types;

// Re-export main types at crate root
pub use context::{ListQuery, NoProgress, ProgressCallback, ResourceClient};
pub use diff::{Difference, DifferenceKind, first_difference, is_changed};
pub use error::{ApiError, ClientError, Error, ErrorCategory, Result};
pub use executor::{ExecuteOptions, Job, execute, execute_simple};
pub use filter::FilterSpec;
pub use memory::{Call, MemoryClient};
pub use outcome::{Diff, ExecuteSummary, InfoOutcome, Outcome};
pub use pagination::PageWalker;
pub use reconciler::{Action, Reconciler, plan};
pub use request::{InfoRequest, LifecycleState, ReconcileRequest};
pub use resolver::Resolver;
pub use resource::{DEFAULT_PAGE_LIMIT, Resource, ResourceDescriptor};
pub use types::{DesiredState, Field, Object};
