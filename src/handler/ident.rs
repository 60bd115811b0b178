//! Identifier extraction from the request line. Pure; no I/O, no suspension.

use http::Method;

/// Extract the lookup key from `target`.
///
/// Canonical rule: the method must be GET and the target must be the fixed
/// `prefix` followed by one or more ASCII digits, fully consumed. An empty
/// remainder, any non-digit byte, or a value outside `u64` all yield `None` —
/// absence is never a default of zero.
pub fn parse_identifier(method: &Method, target: &str, prefix: &str) -> Option<u64> {
    if method != Method::GET {
        return None;
    }
    let digits = target.strip_prefix(prefix)?;
    if digits.is_empty() {
        return None;
    }
    let mut id: u64 = 0;
    for byte in digits.bytes() {
        if !byte.is_ascii_digit() {
            return None;
        }
        id = id
            .checked_mul(10)?
            .checked_add(u64::from(byte - b'0'))?;
    }
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "/employee/";

    fn parse(method: Method, target: &str) -> Option<u64> {
        parse_identifier(&method, target, PREFIX)
    }

    #[test]
    fn accepts_digit_only_remainder() {
        assert_eq!(parse(Method::GET, "/employee/42"), Some(42));
        assert_eq!(parse(Method::GET, "/employee/0"), Some(0));
        assert_eq!(parse(Method::GET, "/employee/007"), Some(7));
        assert_eq!(
            parse(Method::GET, "/employee/18446744073709551615"),
            Some(u64::MAX)
        );
    }

    #[test]
    fn rejects_wrong_shape() {
        assert_eq!(parse(Method::GET, "/employee/"), None);
        assert_eq!(parse(Method::GET, "/employee"), None);
        assert_eq!(parse(Method::GET, "/employee/42abc"), None);
        assert_eq!(parse(Method::GET, "/employee/-1"), None);
        assert_eq!(parse(Method::GET, "/employee/4 2"), None);
        assert_eq!(parse(Method::GET, "/widget/42"), None);
        assert_eq!(parse(Method::GET, "/42"), None);
        assert_eq!(parse(Method::GET, ""), None);
    }

    #[test]
    fn rejects_overflow() {
        // u64::MAX + 1
        assert_eq!(parse(Method::GET, "/employee/18446744073709551616"), None);
        assert_eq!(
            parse(Method::GET, "/employee/99999999999999999999999999"),
            None
        );
    }

    #[test]
    fn rejects_wrong_method() {
        assert_eq!(parse(Method::POST, "/employee/42"), None);
        assert_eq!(parse(Method::HEAD, "/employee/42"), None);
        assert_eq!(parse(Method::DELETE, "/employee/42"), None);
    }
}
