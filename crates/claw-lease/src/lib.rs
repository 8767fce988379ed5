//! # Claw Lease
//!
//! The contract layer between secrets engines and the Clawbernetes lease
//! manager:
//!
//! - **Secret descriptors**: per-kind field schema, default lease timing, and
//!   renew/revoke hooks
//! - **Lease identifiers**: `<type>-<suffix>` ids that resolve back to their
//!   descriptor
//! - **Response building**: leased envelopes with renewability derived from
//!   the presence of a renew hook
//! - **Registry**: type lookup and hook dispatch for the lease manager
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use claw_lease::{
//!     HookResult, LeaseRequest, ResponseData, SecretDescriptor, SecretRegistry, SecretType,
//! };
//!
//! fn revoke_user(_req: &LeaseRequest) -> HookResult {
//!     Ok(None)
//! }
//!
//! let descriptor = SecretDescriptor::builder(SecretType::new("postgres").expect("valid type"))
//!     .default_duration(Duration::from_secs(3600))
//!     .revoke(revoke_user)
//!     .build();
//!
//! let response = descriptor
//!     .response_with_default_ids(ResponseData::new())
//!     .expect("uuid generation");
//! let lease_id = response.lease_id().expect("leased").clone();
//! assert_eq!(lease_id.secret_type(), "postgres");
//!
//! let mut registry = SecretRegistry::new();
//! registry.register(descriptor).expect("has revoke hook");
//! registry.revoke(&lease_id, response.into_data()).expect("revoked");
//! ```
//!
//! ## Lease ids
//!
//! Ids decode by splitting on the first `-`. An id without one decodes to an
//! empty type and never resolves; [`SecretRegistry`] reports it as
//! [`Error::UnknownLeaseType`].

pub mod config;
pub mod descriptor;
pub mod error;
pub mod id;
pub mod registry;
pub mod types;

// Re-export commonly used types
pub use error::{Error, HookError, Result};
pub use types::{FieldSchema, FieldType, Lease, Response, ResponseData, SecretType};

pub use config::LeaseTiming;

pub use descriptor::{HookResult, LeaseHook, LeaseRequest, SecretDescriptor, SecretDescriptorBuilder};

pub use id::{IdGenerator, LeaseId, UuidGenerator, SEPARATOR};

pub use registry::SecretRegistry;
