use std::collections::HashMap;

use scraper::{Html, Selector};
use url::Url;

use crate::error::{AuthError, AuthResult};

/// `id` attribute ADFS puts on its credential form
const LOGIN_FORM_ID: &str = "loginForm";

/// Collects every input element's name/value pair from an HTML document.
///
/// Missing attributes become empty strings; broken markup yields whatever
/// fields the parser can recover, never an error. The HTML parser folds
/// tag names to lowercase, so `<INPUT>` variants are picked up as well.
pub fn extract_input_fields(body: &str) -> HashMap<String, String> {
    let document = Html::parse_document(body);
    let selector = Selector::parse("input").unwrap();

    document
        .select(&selector)
        .map(|input| {
            let name = input.value().attr("name").unwrap_or_default().to_string();
            let value = input.value().attr("value").unwrap_or_default().to_string();
            (name, value)
        })
        .collect()
}

/// Resolves the submission URL of the ADFS login form.
///
/// Picks the form whose id is `loginForm` and which carries a non-empty
/// `action`, then appends that action to the scheme and host of the page
/// URL. ADFS only emits path-absolute actions on this page; relative
/// actions are a documented limitation.
pub fn locate_login_form(body: &str, page_url: &Url) -> AuthResult<Url> {
    let document = Html::parse_document(body);
    let selector = Selector::parse("form").unwrap();

    for form in document.select(&selector) {
        let action = form.value().attr("action").unwrap_or_default();
        if form.value().attr("id") == Some(LOGIN_FORM_ID) && !action.is_empty() {
            let submit_url = format!("{}{}", page_url.origin().ascii_serialization(), action);
            return Url::parse(&submit_url).map_err(|_| AuthError::FormNotFound);
        }
    }

    Err(AuthError::FormNotFound)
}

/// Fills the extracted login fields with session credentials.
///
/// Field names containing `user` or `email` receive the username, names
/// containing `pass` receive the password, and everything else keeps its
/// existing value so hidden state tokens survive the round trip. The
/// substring rules match the field names real IdP forms use; they are
/// part of the contract and deliberately no smarter than this.
pub fn inject_credentials(
    fields: &HashMap<String, String>,
    username: &str,
    password: &str,
) -> HashMap<String, String> {
    fields
        .iter()
        .map(|(name, value)| {
            let lowered = name.to_lowercase();
            let value = if lowered.contains("user") || lowered.contains("email") {
                username.to_string()
            } else if lowered.contains("pass") {
                password.to_string()
            } else {
                value.clone()
            };
            (name.clone(), value)
        })
        .collect()
}
