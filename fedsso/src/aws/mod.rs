use aws_config::BehaviorVersion;
use aws_sdk_sts::error::DisplayErrorContext;
use aws_sdk_sts::Client as StsClient;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::common::{RoleGrant, SessionCredential};
use crate::error::{AuthError, AuthResult};

/// STS-backed exchange of a SAML assertion for temporary credentials
pub struct CredentialExchange {
    sts_client: StsClient,
}

impl CredentialExchange {
    pub async fn new() -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        Self {
            sts_client: StsClient::new(&config),
        }
    }

    /// Calls `AssumeRoleWithSAML` for the selected grant.
    ///
    /// A rejection here is most often the requested duration exceeding
    /// the role's configured maximum; the error carries the duration so
    /// the caller can suggest retrying with a shorter one.
    pub async fn exchange(
        &self,
        assertion_b64: &str,
        grant: &RoleGrant,
        duration_seconds: i32,
    ) -> AuthResult<SessionCredential> {
        info!("requesting temporary credentials for {}", grant.role_arn);
        debug!(
            "principal: {}, duration: {}s",
            grant.principal_arn, duration_seconds
        );

        let response = self
            .sts_client
            .assume_role_with_saml()
            .role_arn(&grant.role_arn)
            .principal_arn(&grant.principal_arn)
            .saml_assertion(assertion_b64)
            .duration_seconds(duration_seconds)
            .send()
            .await
            .map_err(|e| {
                AuthError::exchange_rejected(duration_seconds, DisplayErrorContext(&e).to_string())
            })?;

        let credentials = response.credentials().ok_or_else(|| {
            AuthError::exchange_rejected(duration_seconds, "exchange returned no credentials")
        })?;

        let expires_at = DateTime::<Utc>::from_timestamp(
            credentials.expiration().secs(),
            credentials.expiration().subsec_nanos(),
        )
        .unwrap_or_default();

        Ok(SessionCredential {
            access_key_id: credentials.access_key_id().to_string(),
            secret_access_key: credentials.secret_access_key().to_string(),
            session_token: credentials.session_token().to_string(),
            expires_at,
        })
    }
}
