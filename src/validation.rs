//! Value-validity predicates shared by the clause builder and the services.
//!
//! These mirror the checks the repositories rely on when deciding whether an
//! optional filter/update field participates in a query.

use rust_decimal::Decimal;

/// Review ratings live in [1, 5].
pub fn is_valid_rating(rating: &i16) -> bool {
    (1..=5).contains(rating)
}

/// Prices are never negative.
pub fn is_valid_price(price: &Decimal) -> bool {
    !price.is_sign_negative()
}

/// Editions are positive ordinals.
pub fn is_valid_edition(edition: &i16) -> bool {
    *edition > 0
}

/// Password policy: longer than 8 characters, mixed case, a digit, a
/// non-alphanumeric character and more than 3 distinct characters.
pub fn is_strong_password(password: &str) -> bool {
    let mut distinct: Vec<char> = password.chars().collect();
    distinct.sort_unstable();
    distinct.dedup();

    password.chars().count() > 8
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| c.is_lowercase())
        && password.chars().any(|c| c.is_uppercase())
        && password.chars().any(|c| !c.is_alphanumeric())
        && distinct.len() > 3
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn rating_bounds() {
        assert!(is_valid_rating(&1));
        assert!(is_valid_rating(&5));
        assert!(!is_valid_rating(&0));
        assert!(!is_valid_rating(&6));
        assert!(!is_valid_rating(&-3));
    }

    #[test]
    fn price_bounds() {
        assert!(is_valid_price(&Decimal::ZERO));
        assert!(is_valid_price(&Decimal::new(1999, 2)));
        assert!(!is_valid_price(&Decimal::new(-1, 0)));
    }

    #[test]
    fn edition_bounds() {
        assert!(is_valid_edition(&1));
        assert!(!is_valid_edition(&0));
        assert!(!is_valid_edition(&-2));
    }

    #[test]
    fn password_policy() {
        assert!(is_strong_password("Str0ng!pass"));
        // too short
        assert!(!is_strong_password("Ab1!x"));
        // no digit
        assert!(!is_strong_password("Abcdefgh!jk"));
        // no special character
        assert!(!is_strong_password("Abcdefgh1jk"));
        // no upper case
        assert!(!is_strong_password("abcdefgh1!k"));
    }
}
