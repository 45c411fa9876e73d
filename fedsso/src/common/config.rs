use serde::{Deserialize, Serialize};

/// One ADFS endpoint the user can federate through
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdfsEndpoint {
    /// AWS region the endpoint fronts, for display in the menu
    pub region: String,

    /// ADFS hostname
    pub domain: String,
}

/// Settings for one login run
///
/// Built once at startup and handed to the flow; nothing mutates it
/// afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// ADFS endpoints offered by the interactive menu
    pub endpoints: Vec<AdfsEndpoint>,

    /// Session duration requested for ordinary roles (seconds)
    #[serde(default = "default_session_duration")]
    pub session_duration_secs: i32,

    /// Session duration requested for the privileged role (seconds)
    #[serde(default = "default_privileged_session_duration")]
    pub privileged_session_duration_secs: i32,

    /// Role name that is granted the extended session duration
    #[serde(default = "default_privileged_role_name")]
    pub privileged_role_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoints: vec![
                AdfsEndpoint {
                    region: "us-east-2 (Ohio)".to_string(),
                    domain: "fedssoawuse2.clmgmt.entsvcs.com".to_string(),
                },
                AdfsEndpoint {
                    region: "eu-west-1 (Ireland)".to_string(),
                    domain: "fedssoawiew1.clmgmt.entsvcs.com".to_string(),
                },
            ],
            session_duration_secs: default_session_duration(),
            privileged_session_duration_secs: default_privileged_session_duration(),
            privileged_role_name: default_privileged_role_name(),
        }
    }
}

impl AppConfig {
    /// IdP-initiated sign-on URL for an ADFS domain
    pub fn sso_url(domain: &str) -> String {
        format!("https://{domain}/adfs/ls/IdpInitiatedSignOn.aspx?loginToRp=urn:amazon:webservices")
    }

    /// Session duration to request for a role ARN
    ///
    /// The role name is the path segment after the first `/` of the ARN.
    pub fn session_duration_for(&self, role_arn: &str) -> i32 {
        let role_name = role_arn.split('/').nth(1).unwrap_or_default();
        if role_name == self.privileged_role_name {
            self.privileged_session_duration_secs
        } else {
            self.session_duration_secs
        }
    }
}

fn default_session_duration() -> i32 {
    3599
}

fn default_privileged_session_duration() -> i32 {
    7200
}

fn default_privileged_role_name() -> String {
    "dxcrole-iam_manager".to_string()
}
