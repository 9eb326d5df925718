//! Property-based tests for identifier normalization
//!
//! Uses proptest to generate random names and check the invariants of
//! `jsify`.

use flowgen::util::is_identifier;
use flowgen::{jsify, Error};
use proptest::prelude::*;

/// snake_case and camelCase style names
fn any_name() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{1,8}(_[a-z]{1,8}){0,3}",
        "[a-z]{1,8}([A-Z][a-z]{1,6}){0,3}",
        "[A-Z][a-z]{1,8}([A-Z][a-z]{1,6}){0,3}",
    ]
}

proptest! {
    #[test]
    fn test_jsify_is_idempotent(name in any_name(), upper in any::<bool>()) {
        let once = jsify(&name, upper).unwrap();
        prop_assert_eq!(jsify(&once, upper).unwrap(), once);
    }

    #[test]
    fn test_jsify_output_is_an_identifier(name in "[A-Za-z0-9_ .-]{0,24}", upper in any::<bool>()) {
        if let Ok(ident) = jsify(&name, upper) {
            prop_assert!(is_identifier(&ident), "{:?} -> {:?}", name, ident);
        }
    }

    #[test]
    fn test_first_letter_case(name in any_name()) {
        let upper = jsify(&name, true).unwrap();
        let lower = jsify(&name, false).unwrap();
        prop_assert!(upper.starts_with(|c: char| c.is_ascii_uppercase()));
        prop_assert!(lower.starts_with(|c: char| c.is_ascii_lowercase()));
    }

    #[test]
    fn test_inputs_with_a_letter_succeed(
        prefix in "[ _.-]{0,4}",
        letter in "[A-Za-z]",
        suffix in "[A-Za-z0-9 _.-]{0,12}",
    ) {
        let name = format!("{}{}{}", prefix, letter, suffix);
        prop_assert!(jsify(&name, false).is_ok());
    }

    #[test]
    fn test_inputs_without_letters_or_digits_fail(name in "[ _.!@#-]{0,12}") {
        let result = jsify(&name, true);
        prop_assert!(matches!(result, Err(Error::InvalidIdentifierInput(_))), "{:?}", result);
    }

    #[test]
    fn test_letters_and_digits_are_kept(name in any_name()) {
        let ident = jsify(&name, false).unwrap();
        let letters = |s: &str| s.chars().filter(char::is_ascii_alphanumeric).count();
        prop_assert_eq!(letters(&ident), letters(&name));
    }
}
