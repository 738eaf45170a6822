//! Recipient normalization: phone numbers to WhatsApp JIDs.
//!
//! A bare phone number becomes `<digits>@c.us`; identifiers that already carry
//! a JID suffix (user, group, or multi-device form) pass through unchanged.

/// JID suffixes accepted as already-qualified recipients.
const JID_SUFFIXES: [&str; 3] = ["@c.us", "@g.us", "@s.whatsapp.net"];

/// Normalize a recipient to a WhatsApp JID.
///
/// Accepts a bare phone number in international format (digits, optional
/// leading `+`, spaces and dashes tolerated) or an already-qualified JID.
/// Returns an error string naming the bad input when nothing usable remains.
pub fn normalize_recipient(input: &str) -> Result<String, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("recipient is empty".to_string());
    }
    if JID_SUFFIXES.iter().any(|s| trimmed.ends_with(s)) {
        return Ok(trimmed.to_string());
    }
    let digits: String = trimmed
        .strip_prefix('+')
        .unwrap_or(trimmed)
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    let stripped: String = trimmed
        .strip_prefix('+')
        .unwrap_or(trimmed)
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    if digits.is_empty() || stripped != digits {
        return Err(format!("invalid recipient: {}", input.trim()));
    }
    Ok(format!("{}@c.us", digits))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_number_gets_user_suffix() {
        assert_eq!(normalize_recipient("4915112345678").unwrap(), "4915112345678@c.us");
    }

    #[test]
    fn plus_spaces_and_dashes_are_stripped() {
        assert_eq!(normalize_recipient("+49 151 1234-5678").unwrap(), "4915112345678@c.us");
    }

    #[test]
    fn qualified_jids_pass_through() {
        assert_eq!(normalize_recipient("4915112345678@c.us").unwrap(), "4915112345678@c.us");
        assert_eq!(
            normalize_recipient("1234567890-987654@g.us").unwrap(),
            "1234567890-987654@g.us"
        );
        assert_eq!(
            normalize_recipient("4915112345678@s.whatsapp.net").unwrap(),
            "4915112345678@s.whatsapp.net"
        );
    }

    #[test]
    fn empty_and_non_numeric_are_rejected() {
        assert!(normalize_recipient("").is_err());
        assert!(normalize_recipient("   ").is_err());
        assert!(normalize_recipient("not-a-number").is_err());
        assert!(normalize_recipient("+49abc").is_err());
    }
}
