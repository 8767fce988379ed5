//! Registry of secret descriptors and hook dispatch.
//!
//! The lease manager holds one [`SecretRegistry`], built at engine
//! registration time and shared read-only afterwards (for example behind an
//! `Arc`). Lease ids are resolved back to descriptors through their type
//! component.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, warn};

use crate::descriptor::{LeaseHook, LeaseRequest, SecretDescriptor};
use crate::error::{Error, Result};
use crate::id::LeaseId;
use crate::types::{Response, ResponseData, SecretType};

/// Type-to-descriptor lookup used to dispatch renew and revoke hooks.
#[derive(Debug, Default)]
pub struct SecretRegistry {
    /// `SecretType` keys compare case-insensitively.
    descriptors: HashMap<SecretType, SecretDescriptor>,
}

impl SecretRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a descriptor.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The descriptor has no revoke hook
    /// - A descriptor with the same type (ignoring case) is already registered
    pub fn register(&mut self, descriptor: SecretDescriptor) -> Result<()> {
        if let Err(e) = descriptor.validate() {
            warn!(secret_type = %descriptor.secret_type(), error = %e, "rejected secret type");
            return Err(e);
        }

        let key = descriptor.secret_type().clone();
        if self.descriptors.contains_key(&key) {
            warn!(secret_type = %descriptor.secret_type(), "secret type already registered");
            return Err(Error::DuplicateSecretType {
                secret_type: descriptor.secret_type().to_string(),
            });
        }

        debug!(
            secret_type = %descriptor.secret_type(),
            renewable = descriptor.renewable(),
            "registered secret type"
        );
        self.descriptors.insert(key, descriptor);
        Ok(())
    }

    /// Returns the descriptor for a type name, ignoring case.
    ///
    /// Names that are not valid secret types are never registered.
    #[must_use]
    pub fn get(&self, secret_type: &str) -> Option<&SecretDescriptor> {
        let key = SecretType::new(secret_type).ok()?;
        self.descriptors.get(&key)
    }

    /// Resolves a lease id to the descriptor of its type.
    ///
    /// Returns `None` if the id has no type component or the type is unknown.
    #[must_use]
    pub fn resolve(&self, lease_id: &LeaseId) -> Option<&SecretDescriptor> {
        if !lease_id.is_resolvable() {
            return None;
        }
        self.get(lease_id.secret_type())
    }

    /// Checks if a secret type is registered.
    #[must_use]
    pub fn contains(&self, secret_type: &str) -> bool {
        self.get(secret_type).is_some()
    }

    /// Lists the registered secret types.
    #[must_use]
    pub fn types(&self) -> Vec<&SecretType> {
        self.descriptors
            .values()
            .map(SecretDescriptor::secret_type)
            .collect()
    }

    /// Returns the number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Dispatches a renewal to the lease's renew hook.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The lease id does not resolve to a registered type
    /// - The type has no renew hook
    /// - The hook fails
    pub fn renew(
        &self,
        lease_id: &LeaseId,
        data: ResponseData,
        increment: Option<Duration>,
    ) -> Result<Option<Response>> {
        let descriptor = self.resolve_or_err(lease_id)?;
        let hook = descriptor.renew_hook().ok_or_else(|| Error::NotRenewable {
            lease_id: lease_id.to_string(),
        })?;

        debug!(lease_id = %lease_id, ?increment, "renewing lease");
        let request = Self::request(descriptor, lease_id, data, increment);
        Self::dispatch(hook, &request)
    }

    /// Dispatches a revocation to the lease's revoke hook.
    ///
    /// # Errors
    ///
    /// Returns an error if the lease id does not resolve or the hook fails.
    pub fn revoke(&self, lease_id: &LeaseId, data: ResponseData) -> Result<Option<Response>> {
        let descriptor = self.resolve_or_err(lease_id)?;
        // Registration guarantees a revoke hook
        let hook = descriptor
            .revoke_hook()
            .ok_or_else(|| Error::MissingRevokeHook {
                secret_type: descriptor.secret_type().to_string(),
            })?;

        debug!(lease_id = %lease_id, "revoking lease");
        let request = Self::request(descriptor, lease_id, data, None);
        Self::dispatch(hook, &request)
    }

    fn resolve_or_err(&self, lease_id: &LeaseId) -> Result<&SecretDescriptor> {
        self.resolve(lease_id).ok_or_else(|| {
            warn!(lease_id = %lease_id, "lease id does not resolve to a secret type");
            Error::UnknownLeaseType {
                lease_id: lease_id.to_string(),
            }
        })
    }

    fn request(
        descriptor: &SecretDescriptor,
        lease_id: &LeaseId,
        data: ResponseData,
        increment: Option<Duration>,
    ) -> LeaseRequest {
        LeaseRequest {
            lease_id: lease_id.clone(),
            secret_type: descriptor.secret_type().clone(),
            data,
            increment,
        }
    }

    fn dispatch(hook: &dyn LeaseHook, request: &LeaseRequest) -> Result<Option<Response>> {
        hook.call(request).map_err(|source| {
            warn!(lease_id = %request.lease_id, error = %source, "lease hook failed");
            Error::Hook {
                lease_id: request.lease_id.to_string(),
                source,
            }
        })
    }
}
