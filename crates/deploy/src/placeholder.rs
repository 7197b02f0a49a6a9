//! Textual references to the address of a contract that is not deployed yet.
//!
//! A placeholder is the contract name wrapped in double braces, e.g. `{{Token}}`. Whitespace
//! inside the braces is ignored on decode, so `{{ Token }}` refers to the same contract.
//!
//! There is no escaping: names containing `{{` or `}}` cannot be represented.

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Returns `true` if `value` has the exact form `{{...}}`.
pub fn is_placeholder(value: &str) -> bool {
    value.len() >= OPEN.len() + CLOSE.len() && value.starts_with(OPEN) && value.ends_with(CLOSE)
}

/// Returns the trimmed contract name referenced by `value`, or `None` if `value` is not a
/// placeholder.
pub fn decode(value: &str) -> Option<&str> {
    if !is_placeholder(value) {
        return None;
    }
    Some(value[OPEN.len()..value.len() - CLOSE.len()].trim())
}

/// Wraps `name` into a placeholder.
pub fn encode(name: &str) -> String {
    format!("{OPEN}{name}{CLOSE}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn detects_placeholders() {
        assert!(is_placeholder("{{Token}}"));
        assert!(is_placeholder("{{ Token }}"));
        assert!(is_placeholder("{{}}"));

        assert!(!is_placeholder("{{Token}"));
        assert!(!is_placeholder("{Token}}"));
        assert!(!is_placeholder(" {{Token}}"));
        assert!(!is_placeholder("{{}"));
        assert!(!is_placeholder("}}"));
        assert!(!is_placeholder("0x0000000000000000000000000000000000000001"));
        assert!(!is_placeholder(""));
    }

    // `{{}` is three characters long and must not be mistaken for an empty reference.
    #[test]
    fn overlapping_delimiters_are_not_placeholders() {
        assert!(!is_placeholder("{}}"));
        assert!(!is_placeholder("{{}"));
    }

    #[test]
    fn decodes_and_trims() {
        assert_eq!(decode("{{Token}}"), Some("Token"));
        assert_eq!(decode("{{  Vault\t}}"), Some("Vault"));
        assert_eq!(decode("{{}}"), Some(""));
        assert_eq!(decode("Token"), None);
    }

    #[test]
    fn encode_is_inverse_of_decode() {
        for name in ["A", "Token", "ERC20Mock", "my_contract", "Lib.v2", "with space"] {
            let encoded = encode(name);
            assert!(is_placeholder(&encoded), "{encoded}");
            assert_eq!(decode(&encoded), Some(name));
        }
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(name in "[A-Za-z_$][A-Za-z0-9_$.]{0,31}") {
            let encoded = encode(&name);
            prop_assert!(is_placeholder(&encoded));
            prop_assert_eq!(decode(&encoded), Some(name.as_str()));
        }

        #[test]
        fn anything_in_braces_is_a_placeholder(inner in ".{0,16}") {
            let value = format!("{{{{{inner}}}}}");
            prop_assert!(is_placeholder(&value));
            prop_assert_eq!(decode(&value), Some(inner.trim()));
        }

        #[test]
        fn needs_both_delimiters(value in "[^{].{0,15}", other in ".{0,15}[^}]") {
            prop_assert!(!is_placeholder(&value));
            prop_assert!(!is_placeholder(&other));
            prop_assert_eq!(decode(&value), None);
            prop_assert_eq!(decode(&other), None);
        }
    }
}
