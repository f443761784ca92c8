use crate::types::QuizId;

use super::error::SessionError;

/// Turns the raw `<id>` argument into a lookup key.
///
/// Surrounding whitespace is ignored and the longest leading run of digits, with an
/// optional sign, is used, so `"7abc"` yields 7. A `0x` prefix switches to hex digits.
/// Input with no leading digits, or a value that does not fit a [`QuizId`], is rejected.
pub fn validate_id(arg: Option<&str>) -> Result<QuizId, SessionError> {
    let raw = arg.ok_or(SessionError::MissingParameter)?;
    leading_integer(raw).ok_or_else(|| SessionError::InvalidParameter(raw.to_string()))
}

fn leading_integer(raw: &str) -> Option<QuizId> {
    let s = raw.trim();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => ("-", &s[1..]),
        Some(b'+') => ("", &s[1..]),
        _ => ("", s),
    };
    let (radix, body) = match rest.get(..2) {
        Some("0x" | "0X") => (16, &rest[2..]),
        _ => (10, rest),
    };
    let end = body
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(body.len());
    if end == 0 {
        return None;
    }
    QuizId::from_str_radix(&format!("{sign}{}", &body[..end]), radix).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_argument_is_missing() {
        assert!(matches!(validate_id(None), Err(SessionError::MissingParameter)));
    }

    #[test]
    fn parses_plain_padded_and_signed_integers() {
        assert_eq!(validate_id(Some("3")).unwrap(), 3);
        assert_eq!(validate_id(Some(" 7 ")).unwrap(), 7);
        assert_eq!(validate_id(Some("-2")).unwrap(), -2);
        assert_eq!(validate_id(Some("+12")).unwrap(), 12);
        assert_eq!(validate_id(Some("7abc")).unwrap(), 7);
    }

    #[test]
    fn hex_prefix_reads_hex_digits() {
        assert_eq!(validate_id(Some("0x1A")).unwrap(), 26);
        assert_eq!(validate_id(Some("-0X10")).unwrap(), -16);
        assert_eq!(validate_id(Some("0x1g")).unwrap(), 1);
        assert_eq!(validate_id(Some("0")).unwrap(), 0);
        assert!(matches!(validate_id(Some("0x")), Err(SessionError::InvalidParameter(_))));
        assert!(matches!(validate_id(Some("0xg")), Err(SessionError::InvalidParameter(_))));
    }

    #[test]
    fn rejects_non_numbers() {
        for raw in ["", "   ", "abc", "-", "+-1", "x7", "99999999999999999999999"] {
            assert!(
                matches!(validate_id(Some(raw)), Err(SessionError::InvalidParameter(_))),
                "{raw:?} should be invalid"
            );
        }
    }
}
