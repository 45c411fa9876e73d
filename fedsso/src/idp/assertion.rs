use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use scraper::{Html, Selector};

use crate::common::{build_role_catalog, RoleGrant};
use crate::error::{AuthError, AuthResult};

/// Attribute `Name` AWS expects role pairs under
const ROLE_ATTRIBUTE: &str = "https://aws.amazon.com/SAML/Attributes/Role";

/// Hidden field the IdP posts the assertion back in
pub const ASSERTION_FIELD: &str = "SAMLResponse";

/// Pulls the base64 SAML assertion out of a response body.
///
/// `None` is indistinguishable from a rejected login at this layer: ADFS
/// renders an error page without the `SAMLResponse` field either way.
pub fn extract_assertion(body: &str) -> Option<String> {
    let document = Html::parse_document(body);
    let selector = Selector::parse(r#"input[name="SAMLResponse"]"#).unwrap();

    document
        .select(&selector)
        .next()
        .and_then(|input| input.value().attr("value"))
        .map(str::to_string)
}

/// Decodes an assertion and extracts the granted role/principal pairs.
///
/// Walks every `Attribute` element carrying the AWS role attribute URI
/// and reads each child `AttributeValue` as one comma-joined pair. The
/// result is normalized (see [`RoleGrant::new`]), deduplicated and
/// sorted, so the same assertion always presents the same catalog. An
/// assertion without the role attribute yields an empty catalog, not an
/// error; the caller decides whether that is fatal.
pub fn parse_role_catalog(assertion_b64: &str) -> AuthResult<Vec<RoleGrant>> {
    let decoded = BASE64
        .decode(assertion_b64)
        .map_err(|e| AuthError::assertion_parse(format!("invalid base64: {e}")))?;
    let xml = String::from_utf8(decoded)
        .map_err(|e| AuthError::assertion_parse(format!("assertion is not UTF-8: {e}")))?;
    let document = roxmltree::Document::parse(&xml)
        .map_err(|e| AuthError::assertion_parse(format!("invalid XML: {e}")))?;

    let grants = document
        .descendants()
        .filter(|node| {
            node.tag_name().name() == "Attribute"
                && node.attribute("Name") == Some(ROLE_ATTRIBUTE)
        })
        .flat_map(|attribute| {
            attribute
                .children()
                .filter(|child| child.tag_name().name() == "AttributeValue")
                .filter_map(|value| value.text().and_then(RoleGrant::parse))
        })
        .collect();

    Ok(build_role_catalog(grants))
}
