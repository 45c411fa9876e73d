use thiserror::Error;

/// Errors that can occur while driving a federated login to completion.
///
/// All of these are fatal for the current run: the flow never retries,
/// it reports the failure and exits.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("could not reach identity provider at {url}: {source}")]
    EndpointUnreachable { url: String, source: reqwest::Error },

    #[error("login form not found in the identity provider response")]
    FormNotFound,

    #[error("no SAML assertion in the response; check username, password or token")]
    AssertionNotFound,

    #[error("malformed SAML assertion: {message}")]
    AssertionParse { message: String },

    #[error("assertion does not grant any AWS roles")]
    NoRolesGranted,

    #[error("invalid selection {input:?}")]
    InvalidSelection { input: String },

    #[error("credential exchange rejected (requested {duration_seconds}s): {message}")]
    ExchangeRejected {
        duration_seconds: i32,
        message: String,
    },

    #[error("HTTP error: {source}")]
    Http {
        #[from]
        source: reqwest::Error,
    },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl AuthError {
    pub fn endpoint_unreachable(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::EndpointUnreachable {
            url: url.into(),
            source,
        }
    }

    pub fn assertion_parse(message: impl Into<String>) -> Self {
        Self::AssertionParse {
            message: message.into(),
        }
    }

    pub fn invalid_selection(input: impl Into<String>) -> Self {
        Self::InvalidSelection {
            input: input.into(),
        }
    }

    pub fn exchange_rejected(duration_seconds: i32, message: impl Into<String>) -> Self {
        Self::ExchangeRejected {
            duration_seconds,
            message: message.into(),
        }
    }
}

pub type AuthResult<T> = Result<T, AuthError>;
