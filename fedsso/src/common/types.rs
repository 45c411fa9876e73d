use chrono::{DateTime, Utc};

/// One role/principal pair extracted from a SAML assertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGrant {
    /// IAM role ARN
    pub role_arn: String,

    /// SAML provider principal ARN the role trusts
    pub principal_arn: String,
}

impl RoleGrant {
    /// Builds a grant from the two ARNs carried by one attribute value.
    ///
    /// The attribute value should read `role_arn,principal_arn`, but
    /// real-world assertions sometimes deliver the pair reversed. When
    /// the first component carries the `saml-provider` segment, the two
    /// are swapped back into canonical order. A canonical pair passes
    /// through unchanged, so the normalization is idempotent.
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        let first = first.into();
        let second = second.into();
        if first.contains("saml-provider") {
            Self {
                role_arn: second,
                principal_arn: first,
            }
        } else {
            Self {
                role_arn: first,
                principal_arn: second,
            }
        }
    }

    /// Parses a raw `A,B` attribute value; `None` when no comma is present
    pub fn parse(raw: &str) -> Option<Self> {
        let (first, second) = raw.split_once(',')?;
        Some(Self::new(first.trim(), second.trim()))
    }

    /// Stable string form used for ordering and deduplication
    pub fn canonical(&self) -> String {
        format!("{},{}", self.role_arn, self.principal_arn)
    }
}

/// Deduplicates and orders grants for deterministic presentation across runs
pub fn build_role_catalog(mut grants: Vec<RoleGrant>) -> Vec<RoleGrant> {
    grants.sort_by_key(|grant| grant.canonical());
    grants.dedup();
    grants
}

/// Temporary credentials returned by the exchange service
#[derive(Debug, Clone)]
pub struct SessionCredential {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expires_at: DateTime<Utc>,
}
