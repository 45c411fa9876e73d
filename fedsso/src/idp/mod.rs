use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use crate::error::{AuthError, AuthResult};
use crate::prompt::Prompt;

pub mod assertion;
pub mod form;

/// Field the one-time code is posted under
const MFA_CODE_FIELD: &str = "security_code";

/// ADFS authentication-method discriminator for the second stage
const MFA_AUTH_METHOD_FIELD: &str = "AuthMethod";
const MFA_AUTH_METHOD: &str = "VIPAuthenticationProviderWindowsAccountName";

/// Sent by the 2019 ADFS login form; the second-stage endpoint answers
/// HTTP 500 if it is posted back
const MFA_STALE_FIELD: &str = "UserName";

/// HTTP client for the handshake. The cookie jar is the one piece of
/// state that must survive the login -> MFA -> assertion sequence: it
/// carries the IdP's session cookies.
pub fn build_http_client() -> AuthResult<Client> {
    let client = Client::builder().cookie_store(true).build()?;
    Ok(client)
}

/// Drives one ADFS login handshake up to a raw base64 assertion.
///
/// Owns no state of its own beyond the borrowed HTTP session and prompt
/// provider; one instance serves exactly one attempt.
pub struct AdfsClient<'a> {
    pub http: &'a Client,
    pub prompt: &'a dyn Prompt,
}

impl AdfsClient<'_> {
    /// Fetches the login page, submits credentials, runs at most one MFA
    /// round and returns the assertion the IdP posted back.
    pub async fn authenticate(
        &self,
        sso_url: &Url,
        username: &str,
        password: &str,
    ) -> AuthResult<String> {
        info!("fetching login form from {}", sso_url);
        let response = self
            .http
            .get(sso_url.clone())
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    AuthError::endpoint_unreachable(sso_url.as_str(), e)
                } else {
                    AuthError::from(e)
                }
            })?;
        let login_page = response.text().await?;

        let fields = form::extract_input_fields(&login_page);
        let login_data = form::inject_credentials(&fields, username, password);
        let submit_url = form::locate_login_form(&login_page, sso_url)?;

        debug!("submitting credentials to {}", submit_url);
        let response = self.http.post(submit_url).form(&login_data).send().await?;
        let response_url = response.url().clone();
        let mut body = response.text().await?;

        // At most one MFA round: this ADFS deployment never chains
        // challenges, so a second marker-less response means the login
        // itself was rejected.
        if !body.contains(assertion::ASSERTION_FIELD) {
            body = self.mfa_round(&response_url, &body).await?;
        }

        assertion::extract_assertion(&body).ok_or(AuthError::AssertionNotFound)
    }

    /// Completes the second-factor challenge the IdP redirected us to.
    ///
    /// All fields from the challenge page are carried over verbatim, the
    /// prompted code and the provider's auth-method marker are added, and
    /// the stale `UserName` field is dropped. The POST goes to the
    /// challenge page's own URL, not the original login URL.
    async fn mfa_round(&self, challenge_url: &Url, body: &str) -> AuthResult<String> {
        info!("response carries no assertion, starting MFA challenge");

        let mut fields = form::extract_input_fields(body);
        let code = self.prompt.read_line(
            "For security reasons, we require additional information to verify your account\nMFA token",
        )?;
        fields.insert(MFA_CODE_FIELD.to_string(), code);
        fields.insert(MFA_AUTH_METHOD_FIELD.to_string(), MFA_AUTH_METHOD.to_string());
        fields.remove(MFA_STALE_FIELD);

        debug!("submitting MFA response to {}", challenge_url);
        let response = self
            .http
            .post(challenge_url.clone())
            .form(&fields)
            .send()
            .await?;
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::testing::ScriptedPrompt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SSO_PATH: &str = "/adfs/ls/IdpInitiatedSignOn.aspx";

    fn login_page() -> &'static str {
        r#"<html><body>
        <form id="loginForm" action="/adfs/ls/IdpInitiatedSignOn.aspx?loginToRp=urn:amazon:webservices" method="post">
            <input name="UserName" value="" />
            <input name="Password" value="" />
            <input type="hidden" name="Kmsi" value="true" />
        </form>
        </body></html>"#
    }

    fn mfa_challenge_page() -> &'static str {
        r#"<html><body>
        <form id="options" action="/adfs/ls/IdpInitiatedSignOn.aspx" method="post">
            <input type="hidden" name="Context" value="ctx-token" />
            <input type="hidden" name="UserName" value="alice@clmgmt.entsvcs.com" />
        </form>
        </body></html>"#
    }

    fn assertion_page() -> &'static str {
        r#"<html><body><form>
        <input type="hidden" name="SAMLResponse" value="QUJD" />
        </form></body></html>"#
    }

    async fn mount_login_page(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path(SSO_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string(login_page()))
            .mount(server)
            .await;
    }

    fn sso_url(server: &MockServer) -> Url {
        Url::parse(&format!(
            "{}{SSO_PATH}?loginToRp=urn:amazon:webservices",
            server.uri()
        ))
        .unwrap()
    }

    #[tokio::test]
    async fn handshake_without_mfa_returns_the_assertion() {
        let server = MockServer::start().await;
        mount_login_page(&server).await;
        Mock::given(method("POST"))
            .and(path(SSO_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string(assertion_page()))
            .mount(&server)
            .await;

        let http = build_http_client().unwrap();
        let prompt = ScriptedPrompt::new(&[]);
        let adfs = AdfsClient {
            http: &http,
            prompt: &prompt,
        };

        let assertion = adfs
            .authenticate(&sso_url(&server), "alice", "secret")
            .await
            .unwrap();
        assert_eq!(assertion, "QUJD");
        assert_eq!(prompt.prompt_count(), 0);
    }

    #[tokio::test]
    async fn credentials_are_injected_into_the_login_post() {
        let server = MockServer::start().await;
        mount_login_page(&server).await;
        Mock::given(method("POST"))
            .and(path(SSO_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string(assertion_page()))
            .mount(&server)
            .await;

        let http = build_http_client().unwrap();
        let prompt = ScriptedPrompt::new(&[]);
        let adfs = AdfsClient {
            http: &http,
            prompt: &prompt,
        };
        adfs.authenticate(&sso_url(&server), "alice", "secret")
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let login_post = requests
            .iter()
            .find(|r| r.method.as_str() == "POST")
            .unwrap();
        let body = String::from_utf8_lossy(&login_post.body);
        assert!(body.contains("UserName=alice"));
        assert!(body.contains("Password=secret"));
        assert!(body.contains("Kmsi=true"));
    }

    #[tokio::test]
    async fn marker_less_response_triggers_one_mfa_round() {
        let server = MockServer::start().await;
        mount_login_page(&server).await;
        // First POST: challenge page without the assertion marker.
        Mock::given(method("POST"))
            .and(path(SSO_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string(mfa_challenge_page()))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        // Second POST: assertion comes back after the code is verified.
        Mock::given(method("POST"))
            .and(path(SSO_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string(assertion_page()))
            .mount(&server)
            .await;

        let http = build_http_client().unwrap();
        let prompt = ScriptedPrompt::new(&["123456"]);
        let adfs = AdfsClient {
            http: &http,
            prompt: &prompt,
        };

        let assertion = adfs
            .authenticate(&sso_url(&server), "alice", "secret")
            .await
            .unwrap();
        assert_eq!(assertion, "QUJD");
        assert_eq!(prompt.prompt_count(), 1);

        let requests = server.received_requests().await.unwrap();
        let mfa_post = requests
            .iter()
            .filter(|r| r.method.as_str() == "POST")
            .nth(1)
            .unwrap();
        let body = String::from_utf8_lossy(&mfa_post.body);
        assert!(body.contains("security_code=123456"));
        assert!(body.contains("AuthMethod=VIPAuthenticationProviderWindowsAccountName"));
        assert!(body.contains("Context=ctx-token"));
        // The stale field breaks the second-stage endpoint and must not
        // be posted back.
        assert!(!body.contains("UserName"));
    }

    #[tokio::test]
    async fn second_marker_less_response_fails_without_another_challenge() {
        let server = MockServer::start().await;
        mount_login_page(&server).await;
        Mock::given(method("POST"))
            .and(path(SSO_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string(mfa_challenge_page()))
            .mount(&server)
            .await;

        let http = build_http_client().unwrap();
        let prompt = ScriptedPrompt::new(&["123456", "654321"]);
        let adfs = AdfsClient {
            http: &http,
            prompt: &prompt,
        };

        let result = adfs.authenticate(&sso_url(&server), "alice", "wrong").await;
        assert!(matches!(result, Err(AuthError::AssertionNotFound)));
        // Exactly one MFA round, never a second challenge.
        assert_eq!(prompt.prompt_count(), 1);
    }

    #[tokio::test]
    async fn page_without_login_form_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(SSO_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<html><body>maintenance</body></html>"),
            )
            .mount(&server)
            .await;

        let http = build_http_client().unwrap();
        let prompt = ScriptedPrompt::new(&[]);
        let adfs = AdfsClient {
            http: &http,
            prompt: &prompt,
        };

        let result = adfs.authenticate(&sso_url(&server), "alice", "secret").await;
        assert!(matches!(result, Err(AuthError::FormNotFound)));
    }

    #[tokio::test]
    async fn connection_failure_reports_the_endpoint() {
        let http = build_http_client().unwrap();
        let prompt = ScriptedPrompt::new(&[]);
        let adfs = AdfsClient {
            http: &http,
            prompt: &prompt,
        };

        let unreachable = Url::parse("http://127.0.0.1:1/adfs/ls/IdpInitiatedSignOn.aspx").unwrap();
        let result = adfs.authenticate(&unreachable, "alice", "secret").await;
        assert!(matches!(result, Err(AuthError::EndpointUnreachable { .. })));
    }
}
