//! Secret descriptors and response building.
//!
//! A [`SecretDescriptor`] is declared once per secret kind by a secrets engine.
//! It carries the field schema, default lease timing, and the hooks the lease
//! manager calls to renew or revoke an issued secret. Descriptors have no
//! mutating methods once built.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::config::LeaseTiming;
use crate::error::{Error, HookError, Result};
use crate::id::{self, IdGenerator, LeaseId, UuidGenerator};
use crate::types::{FieldSchema, Lease, Response, ResponseData, SecretType};

/// Result returned by renew and revoke hooks.
///
/// A renew hook may return a refreshed response; revoke hooks normally
/// return `None`.
pub type HookResult = std::result::Result<Option<Response>, HookError>;

/// Context passed to a renew or revoke hook.
#[derive(Debug, Clone)]
pub struct LeaseRequest {
    /// The full lease identifier.
    pub lease_id: LeaseId,
    /// The descriptor's secret type.
    pub secret_type: SecretType,
    /// Instance data the lease manager stored at issuance.
    pub data: ResponseData,
    /// Requested extension, for renewals.
    pub increment: Option<Duration>,
}

impl LeaseRequest {
    /// Returns the unique suffix of the lease id.
    #[must_use]
    pub fn suffix(&self) -> &str {
        self.lease_id.suffix()
    }
}

/// A callback invoked by the lease manager for one lease.
///
/// Any `Fn(&LeaseRequest) -> HookResult` closure that is `Send + Sync`
/// implements this trait.
pub trait LeaseHook: Send + Sync {
    /// Runs the hook.
    ///
    /// # Errors
    ///
    /// Returns a [`HookError`] if the underlying credential operation fails.
    fn call(&self, request: &LeaseRequest) -> HookResult;
}

impl<F> LeaseHook for F
where
    F: Fn(&LeaseRequest) -> HookResult + Send + Sync,
{
    fn call(&self, request: &LeaseRequest) -> HookResult {
        self(request)
    }
}

/// Declaration of a kind of leased secret.
#[derive(Clone)]
pub struct SecretDescriptor {
    secret_type: SecretType,
    fields: BTreeMap<String, FieldSchema>,
    default_duration: Duration,
    default_grace_period: Duration,
    renew: Option<Arc<dyn LeaseHook>>,
    revoke: Option<Arc<dyn LeaseHook>>,
}

impl SecretDescriptor {
    /// Starts building a descriptor for the given type.
    #[must_use]
    pub fn builder(secret_type: SecretType) -> SecretDescriptorBuilder {
        SecretDescriptorBuilder::new(secret_type)
    }

    /// Returns the secret type.
    #[must_use]
    pub const fn secret_type(&self) -> &SecretType {
        &self.secret_type
    }

    /// Returns the field schema.
    #[must_use]
    pub const fn fields(&self) -> &BTreeMap<String, FieldSchema> {
        &self.fields
    }

    /// Returns the default lease duration.
    #[must_use]
    pub const fn default_duration(&self) -> Duration {
        self.default_duration
    }

    /// Returns the default grace period.
    #[must_use]
    pub const fn default_grace_period(&self) -> Duration {
        self.default_grace_period
    }

    /// Returns true if leases of this type can be renewed.
    #[must_use]
    pub const fn renewable(&self) -> bool {
        self.renew.is_some()
    }

    /// Returns the renew hook, if any.
    #[must_use]
    pub fn renew_hook(&self) -> Option<&dyn LeaseHook> {
        self.renew.as_deref()
    }

    /// Returns the revoke hook, if any.
    #[must_use]
    pub fn revoke_hook(&self) -> Option<&dyn LeaseHook> {
        self.revoke.as_deref()
    }

    /// Checks that the descriptor may be registered.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingRevokeHook`] if no revoke hook is set.
    pub fn validate(&self) -> Result<()> {
        if self.revoke.is_none() {
            return Err(Error::MissingRevokeHook {
                secret_type: self.secret_type.to_string(),
            });
        }
        Ok(())
    }

    /// Builds the leased response for a newly issued secret.
    ///
    /// The lease id is `<type>-<suffix>` with the suffix taken from
    /// `generator`; timing comes from the descriptor defaults.
    ///
    /// # Errors
    ///
    /// Returns the generator's error unchanged if it fails.
    pub fn response(&self, generator: &dyn IdGenerator, data: ResponseData) -> Result<Response> {
        let suffix = generator.generate()?;
        let lease_id = id::encode(&self.secret_type, &suffix);

        debug!(
            secret_type = %self.secret_type,
            lease_id = %lease_id,
            renewable = self.renewable(),
            "issuing leased secret"
        );

        let lease = Lease {
            lease_id,
            renewable: self.renewable(),
            duration: self.default_duration,
            grace_period: self.default_grace_period,
        };
        Ok(Response::secret(lease, data))
    }

    /// Builds a leased response using random UUID suffixes.
    ///
    /// # Errors
    ///
    /// Returns an error if id generation fails.
    pub fn response_with_default_ids(&self, data: ResponseData) -> Result<Response> {
        self.response(&UuidGenerator, data)
    }
}

impl fmt::Debug for SecretDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretDescriptor")
            .field("secret_type", &self.secret_type)
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .field("default_duration", &self.default_duration)
            .field("default_grace_period", &self.default_grace_period)
            .field("renewable", &self.renewable())
            .field("revocable", &self.revoke.is_some())
            .finish()
    }
}

/// Builder for [`SecretDescriptor`].
pub struct SecretDescriptorBuilder {
    inner: SecretDescriptor,
}

impl SecretDescriptorBuilder {
    fn new(secret_type: SecretType) -> Self {
        let timing = LeaseTiming::default();
        Self {
            inner: SecretDescriptor {
                secret_type,
                fields: BTreeMap::new(),
                default_duration: timing.duration(),
                default_grace_period: timing.grace_period(),
                renew: None,
                revoke: None,
            },
        }
    }

    /// Adds a field to the schema, replacing any field of the same name.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, schema: FieldSchema) -> Self {
        self.inner.fields.insert(name.into(), schema);
        self
    }

    /// Sets the default lease duration.
    #[must_use]
    pub fn default_duration(mut self, duration: Duration) -> Self {
        self.inner.default_duration = duration;
        self
    }

    /// Sets the default grace period.
    #[must_use]
    pub fn default_grace_period(mut self, grace_period: Duration) -> Self {
        self.inner.default_grace_period = grace_period;
        self
    }

    /// Sets both defaults from configured timing.
    #[must_use]
    pub fn timing(self, timing: &LeaseTiming) -> Self {
        self.default_duration(timing.duration())
            .default_grace_period(timing.grace_period())
    }

    /// Sets the renew hook, making leases of this type renewable.
    #[must_use]
    pub fn renew(mut self, hook: impl LeaseHook + 'static) -> Self {
        self.inner.renew = Some(Arc::new(hook));
        self
    }

    /// Sets the revoke hook.
    #[must_use]
    pub fn revoke(mut self, hook: impl LeaseHook + 'static) -> Self {
        self.inner.revoke = Some(Arc::new(hook));
        self
    }

    /// Finishes the descriptor.
    ///
    /// Validation happens at registration; see [`SecretDescriptor::validate`].
    #[must_use]
    pub fn build(self) -> SecretDescriptor {
        self.inner
    }
}
