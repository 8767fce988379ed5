//! Core types for the secret-lease layer.
//!
//! This module defines the value types shared by descriptors, the registry and
//! the lease manager:
//! - [`SecretType`]: A validated secret kind name, also the lease id prefix
//! - [`FieldSchema`]: Documentation metadata for one field of instance data
//! - [`Lease`]: Lease metadata attached to an issued secret
//! - [`Response`]: The envelope handed to the lease manager

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::id::LeaseId;

/// Instance data carried by a [`Response`].
pub type ResponseData = Map<String, Value>;

/// A validated secret type name.
///
/// Secret types must:
/// - Be non-empty
/// - Contain only ASCII letters, digits, and underscores
///
/// Equality and hashing ignore ASCII case, so `AWS` and `aws` name the same
/// secret kind; the declared spelling is kept for display and lease ids. The
/// type never contains the lease id separator, so it can always be recovered
/// from an encoded lease id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SecretType(String);

impl SecretType {
    /// Creates a new `SecretType` after validating the input.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or contains a character outside
    /// `[A-Za-z0-9_]`.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// Returns the type as declared.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::InvalidSecretType {
                reason: "type cannot be empty".to_string(),
            });
        }

        if let Some(c) = name
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && *c != '_')
        {
            return Err(Error::InvalidSecretType {
                reason: format!(
                    "type contains invalid character '{c}'; only letters, digits, and underscores are allowed"
                ),
            });
        }

        Ok(())
    }
}

impl PartialEq for SecretType {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for SecretType {}

impl Hash for SecretType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.0.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
        // Terminator so adjacent fields cannot run together
        state.write_u8(0xff);
    }
}

impl fmt::Display for SecretType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for SecretType {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for SecretType {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl From<SecretType> for String {
    fn from(t: SecretType) -> Self {
        t.0
    }
}

impl AsRef<str> for SecretType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The kind of value a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// A string value.
    String,
    /// An integer value.
    Int,
    /// A boolean value.
    Bool,
    /// A nested key/value map.
    Map,
    /// A duration, in seconds.
    Duration,
    /// A list of values.
    Array,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Int => write!(f, "int"),
            Self::Bool => write!(f, "bool"),
            Self::Map => write!(f, "map"),
            Self::Duration => write!(f, "duration"),
            Self::Array => write!(f, "array"),
        }
    }
}

/// Schema for one field of a secret's instance data.
///
/// Used for documentation and by external validators; responses are not
/// checked against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// The kind of value.
    pub field_type: FieldType,
    /// Human-readable description.
    pub description: String,
    /// Value assumed when the field is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl FieldSchema {
    /// Creates a schema with no default.
    #[must_use]
    pub fn new(field_type: FieldType, description: impl Into<String>) -> Self {
        Self {
            field_type,
            description: description.into(),
            default: None,
        }
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Lease metadata attached to an issued secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lease {
    /// The encoded `<type>-<suffix>` lease identifier.
    pub lease_id: LeaseId,
    /// Whether the lease manager may extend this lease.
    pub renewable: bool,
    /// How long the lease lives.
    pub duration: Duration,
    /// Extra time after expiry during which the lease may still be renewed.
    pub grace_period: Duration,
}

impl Lease {
    /// Returns when a lease issued at `issued_at` expires.
    ///
    /// Returns `None` if the result is not representable.
    #[must_use]
    pub fn expires_at(&self, issued_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        add_std(issued_at, self.duration)
    }

    /// Returns the last moment a lease issued at `issued_at` can be renewed.
    #[must_use]
    pub fn renewable_until(&self, issued_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.expires_at(issued_at)
            .and_then(|expiry| add_std(expiry, self.grace_period))
    }
}

fn add_std(at: DateTime<Utc>, span: Duration) -> Option<DateTime<Utc>> {
    chrono::Duration::from_std(span)
        .ok()
        .and_then(|delta| at.checked_add_signed(delta))
}

/// The envelope returned to the caller and handed to the lease manager.
///
/// A secret response always carries a lease and a plain one never does;
/// the fields are private so that pairing cannot be broken.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ResponseWire", into = "ResponseWire")]
pub struct Response {
    lease: Option<Lease>,
    data: ResponseData,
}

impl Response {
    /// Creates a leased secret response.
    #[must_use]
    pub fn secret(lease: Lease, data: ResponseData) -> Self {
        Self {
            lease: Some(lease),
            data,
        }
    }

    /// Creates a plain response that the lease manager does not track.
    #[must_use]
    pub fn plain(data: ResponseData) -> Self {
        Self { lease: None, data }
    }

    /// Returns true if the lease manager must track this response.
    #[must_use]
    pub const fn is_secret(&self) -> bool {
        self.lease.is_some()
    }

    /// Returns the lease metadata of a secret response.
    #[must_use]
    pub const fn lease(&self) -> Option<&Lease> {
        self.lease.as_ref()
    }

    /// Returns the lease identifier, if this is a leased response.
    #[must_use]
    pub fn lease_id(&self) -> Option<&LeaseId> {
        self.lease.as_ref().map(|l| &l.lease_id)
    }

    /// Returns the instance data.
    #[must_use]
    pub const fn data(&self) -> &ResponseData {
        &self.data
    }

    /// Consumes the response and returns the instance data.
    #[must_use]
    pub fn into_data(self) -> ResponseData {
        self.data
    }

    /// Overrides the lease duration. Has no effect on plain responses.
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        if let Some(lease) = self.lease.as_mut() {
            lease.duration = duration;
        }
        self
    }

    /// Overrides the lease grace period. Has no effect on plain responses.
    #[must_use]
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        if let Some(lease) = self.lease.as_mut() {
            lease.grace_period = grace_period;
        }
        self
    }

    /// Serializes the response to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::Serialization {
            reason: e.to_string(),
        })
    }

    /// Deserializes a response from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a valid response, including a
    /// secret flag that disagrees with the presence of a lease.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Serialization {
            reason: e.to_string(),
        })
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Instance data usually holds credentials; only keys are shown
        let keys: Vec<&String> = self.data.keys().collect();
        f.debug_struct("Response")
            .field("secret", &self.is_secret())
            .field("lease", &self.lease)
            .field("data_keys", &keys)
            .field("data", &"[REDACTED]")
            .finish()
    }
}

/// Stored form of a [`Response`], with an explicit secret flag.
#[derive(Serialize, Deserialize)]
struct ResponseWire {
    secret: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lease: Option<Lease>,
    #[serde(default)]
    data: ResponseData,
}

impl From<Response> for ResponseWire {
    fn from(resp: Response) -> Self {
        Self {
            secret: resp.is_secret(),
            lease: resp.lease,
            data: resp.data,
        }
    }
}

impl TryFrom<ResponseWire> for Response {
    type Error = Error;

    fn try_from(wire: ResponseWire) -> Result<Self> {
        if wire.secret != wire.lease.is_some() {
            return Err(Error::Serialization {
                reason: "secret flag does not match lease presence".to_string(),
            });
        }
        Ok(Self {
            lease: wire.lease,
            data: wire.data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use test_case::test_case;

    fn sample_lease() -> Lease {
        Lease {
            lease_id: LeaseId::parse("aws-1234"),
            renewable: true,
            duration: Duration::from_secs(3600),
            grace_period: Duration::from_secs(300),
        }
    }

    fn sample_data() -> ResponseData {
        let mut data = ResponseData::new();
        data.insert("access_key".to_string(), json!("AKIAEXAMPLE"));
        data.insert("secret_key".to_string(), json!("wJalrXUtnFEMI"));
        data
    }

    // ===================
    // SecretType Tests
    // ===================

    #[test_case("aws" ; "lowercase")]
    #[test_case("AWS" ; "uppercase")]
    #[test_case("postgres_user" ; "underscore")]
    #[test_case("db2" ; "digit")]
    #[test_case("_" ; "single underscore")]
    fn secret_type_valid(input: &str) {
        let t = SecretType::new(input).expect("should be valid");
        assert_eq!(t.as_str(), input);
    }

    #[test_case("" ; "empty string")]
    #[test_case("bad type!" ; "space and exclamation")]
    #[test_case("aws-iam" ; "contains separator")]
    #[test_case("db.user" ; "contains period")]
    #[test_case("caf\u{e9}" ; "non ascii")]
    fn secret_type_invalid(input: &str) {
        let result = SecretType::new(input);
        assert!(
            matches!(result, Err(Error::InvalidSecretType { .. })),
            "expected '{input}' to be invalid"
        );
    }

    #[test]
    fn secret_type_keeps_declared_spelling() {
        let t = SecretType::new("Aws_IAM").expect("valid");
        assert_eq!(t.as_str(), "Aws_IAM");
        assert_eq!(t.to_string(), "Aws_IAM");
    }

    #[test]
    fn secret_type_equality_ignores_case() {
        use std::collections::HashSet;

        let upper = SecretType::new("AWS").expect("valid");
        let lower = SecretType::new("aws").expect("valid");
        assert_eq!(upper, lower);
        assert_ne!(upper, SecretType::new("gcp").expect("valid"));

        let set: HashSet<SecretType> = [upper, lower].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn secret_type_serde_rejects_invalid() {
        let result: std::result::Result<SecretType, _> = serde_json::from_str(r#""bad type!""#);
        assert!(result.is_err());

        let ok: SecretType = serde_json::from_str(r#""aws""#).expect("deserialize");
        assert_eq!(ok, SecretType::new("AWS").expect("valid"));
        assert_eq!(ok.as_str(), "aws");
    }

    // ===================
    // FieldSchema Tests
    // ===================

    #[test]
    fn field_schema_with_default() {
        let schema = FieldSchema::new(FieldType::Duration, "lease ttl").with_default(3600);
        assert_eq!(schema.field_type, FieldType::Duration);
        assert_eq!(schema.default, Some(json!(3600)));
    }

    #[test]
    fn field_type_serializes_snake_case() {
        let json = serde_json::to_string(&FieldType::Duration).expect("serialize");
        assert_eq!(json, r#""duration""#);
        assert_eq!(FieldType::Array.to_string(), "array");
    }

    // ===================
    // Lease Tests
    // ===================

    #[test]
    fn lease_expiry_and_grace() {
        let issued = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).single().expect("valid date");
        let lease = sample_lease();

        let expiry = lease.expires_at(issued).expect("representable");
        assert_eq!(expiry, Utc.with_ymd_and_hms(2026, 1, 1, 1, 0, 0).single().expect("valid"));

        let until = lease.renewable_until(issued).expect("representable");
        assert_eq!(until, Utc.with_ymd_and_hms(2026, 1, 1, 1, 5, 0).single().expect("valid"));
    }

    #[test]
    fn lease_expiry_overflow_is_none() {
        let mut lease = sample_lease();
        lease.duration = Duration::MAX;
        assert!(lease.expires_at(Utc::now()).is_none());
        assert!(lease.renewable_until(Utc::now()).is_none());
    }

    #[test]
    fn lease_serializes_id_as_plain_string() {
        let value = serde_json::to_value(sample_lease()).expect("serialize");
        assert_eq!(value["lease_id"], json!("aws-1234"));
        assert_eq!(value["duration"], json!({"secs": 3600, "nanos": 0}));
    }

    #[test]
    fn sub_second_timing_survives_json() {
        let mut lease = sample_lease();
        lease.duration = Duration::from_millis(1500);
        lease.grace_period = Duration::from_millis(500);
        let resp = Response::secret(lease, sample_data());

        let restored = Response::from_json(&resp.to_json().expect("serialize")).expect("deserialize");
        let restored_lease = restored.lease().expect("lease");
        assert_eq!(restored_lease.duration, Duration::from_millis(1500));
        assert_eq!(restored_lease.grace_period, Duration::from_millis(500));
        assert_eq!(restored, resp);
    }

    // ===================
    // Response Tests
    // ===================

    #[test]
    fn response_plain_is_not_secret() {
        let resp = Response::plain(sample_data());
        assert!(!resp.is_secret());
        assert!(resp.lease().is_none());
        assert!(resp.lease_id().is_none());
    }

    #[test]
    fn response_overrides_apply_to_lease() {
        let resp = Response::secret(sample_lease(), sample_data())
            .with_duration(Duration::from_secs(60))
            .with_grace_period(Duration::from_secs(10));
        let lease = resp.lease().expect("secret response has a lease");
        assert_eq!(lease.duration, Duration::from_secs(60));
        assert_eq!(lease.grace_period, Duration::from_secs(10));
    }

    #[test]
    fn response_overrides_ignored_on_plain() {
        let resp = Response::plain(sample_data()).with_duration(Duration::from_secs(60));
        assert!(resp.lease().is_none());
    }

    #[test]
    fn response_debug_redacts_data() {
        let resp = Response::secret(sample_lease(), sample_data());
        let debug_str = format!("{resp:?}");
        assert!(debug_str.contains("[REDACTED]"));
        assert!(debug_str.contains("access_key"));
        assert!(!debug_str.contains("AKIAEXAMPLE"));
        assert!(!debug_str.contains("wJalrXUtnFEMI"));
    }

    #[test]
    fn response_json_roundtrip() {
        let original = Response::secret(sample_lease(), sample_data());
        let json = original.to_json().expect("serialize");
        let restored = Response::from_json(&json).expect("deserialize");
        assert_eq!(original, restored);
    }

    #[test]
    fn response_from_invalid_json() {
        let result = Response::from_json("{not json");
        assert!(matches!(result, Err(Error::Serialization { .. })));
    }

    #[test_case(r#"{"secret": true, "data": {}}"# ; "secret without lease")]
    #[test_case(
        r#"{"secret": false, "lease": {"lease_id": "aws-1", "renewable": false, "duration": {"secs": 1, "nanos": 0}, "grace_period": {"secs": 0, "nanos": 0}}, "data": {}}"#
        ; "lease on plain response"
    )]
    fn response_rejects_mismatched_secret_flag(json: &str) {
        let result = Response::from_json(json);
        assert!(matches!(result, Err(Error::Serialization { .. })));
    }

    #[test]
    fn response_json_carries_secret_flag() {
        let value: Value = serde_json::from_str(
            &Response::secret(sample_lease(), sample_data()).to_json().expect("serialize"),
        )
        .expect("valid json");
        assert_eq!(value["secret"], json!(true));

        let plain: Value = serde_json::from_str(
            &Response::plain(sample_data()).to_json().expect("serialize"),
        )
        .expect("valid json");
        assert_eq!(plain["secret"], json!(false));
        assert!(plain.get("lease").is_none());
    }

    #[test]
    fn response_accessors() {
        let resp = Response::secret(sample_lease(), sample_data());
        assert!(resp.is_secret());
        assert_eq!(resp.lease_id(), Some(&LeaseId::parse("aws-1234")));
        assert_eq!(resp.data(), &sample_data());
        assert_eq!(resp.into_data(), sample_data());
    }
}
