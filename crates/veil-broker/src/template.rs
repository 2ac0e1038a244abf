//! Removal request template rendering.

use regex::{Captures, Regex};
use std::sync::OnceLock;
use veil_core::UserData;

/// Substitutes `{name}`, `{email}`, `{phone}` and `{address}` placeholders in
/// `template` with the user's values.
///
/// Every occurrence is replaced in a single pass over the template, so
/// placeholder text inside a substituted value is left as written. Missing
/// optional fields become the empty string; `{name}` is `"first last"` with
/// absent parts dropped.
#[must_use]
pub fn render_template(template: &str, user: &UserData) -> String {
    static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = PLACEHOLDER_REGEX
        .get_or_init(|| Regex::new(r"\{(name|email|phone|address)\}").expect("valid regex"));

    let name = user.full_name();
    regex
        .replace_all(template, |caps: &Captures<'_>| match &caps[1] {
            "name" => name.as_str(),
            "email" => user.email().unwrap_or_default(),
            "phone" => user.phone.as_deref().unwrap_or_default(),
            _ => user.address.as_deref().unwrap_or_default(),
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACXIOM_TEMPLATE: &str = "I request the removal of my personal information from your \
        database pursuant to CCPA/GDPR regulations. My information includes: \
        {name}, {email}, {address}, {phone}.";

    #[test]
    fn test_missing_optional_fields_render_empty() {
        let user = UserData::new("Jane", "Doe", "jane@x.com");
        let rendered = render_template(ACXIOM_TEMPLATE, &user);

        assert!(rendered.ends_with("My information includes: Jane Doe, jane@x.com, , ."));
        assert!(!rendered.contains('{'));
    }

    #[test]
    fn test_all_fields() {
        let user = UserData {
            phone: Some("555-0100".to_string()),
            address: Some("1 Main St".to_string()),
            ..UserData::new("Jane", "Doe", "jane@x.com")
        };
        let rendered = render_template("{name}|{email}|{phone}|{address}", &user);
        assert_eq!(rendered, "Jane Doe|jane@x.com|555-0100|1 Main St");
    }

    #[test]
    fn test_repeated_placeholders_all_replaced() {
        let user = UserData::new("Jane", "Doe", "jane@x.com");
        let rendered = render_template("{name} ({email}) - signed, {name}", &user);
        assert_eq!(rendered, "Jane Doe (jane@x.com) - signed, Jane Doe");
    }

    #[test]
    fn test_placeholders_in_user_values_stay_literal() {
        let user = UserData {
            address: Some("{phone} Main St".to_string()),
            phone: Some("555-0100".to_string()),
            ..UserData::new("{email}", "Doe", "jane@x.com")
        };
        let rendered = render_template("{name} <{email}> {address}", &user);
        assert_eq!(rendered, "{email} Doe <jane@x.com> {phone} Main St");
    }

    #[test]
    fn test_unknown_placeholders_untouched() {
        let user = UserData::new("Jane", "Doe", "jane@x.com");
        assert_eq!(render_template("{ssn}", &user), "{ssn}");
    }
}
