//! Cookie value quoting.
//!
//! Values made only of RFC 6265 cookie-octets travel bare. Anything else that is printable ASCII
//! is wrapped in double quotes, with `\"` and `\\` escapes and three digit octal escapes for the
//! separators, so a rendered value never contains a raw space, comma or semicolon.

use std::borrow::Cow;

use super::{CookieDecodeError, CookieEncodeError};

/// `cookie-octet` from RFC 6265 section 4.1.1.
pub(super) fn is_cookie_octet(b: u8) -> bool {
    matches!(b, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E)
}

/// `token` from RFC 7230, used for cookie names.
pub(super) fn is_token_char(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'!' | b'#'
                | b'$'
                | b'%'
                | b'&'
                | b'\''
                | b'*'
                | b'+'
                | b'-'
                | b'.'
                | b'^'
                | b'_'
                | b'`'
                | b'|'
                | b'~'
        )
}

pub(super) fn quote(value: &str) -> Result<Cow<'_, str>, CookieEncodeError> {
    if value.is_empty() {
        return Err(CookieEncodeError::UnrepresentableValue {
            reason: "value is empty",
        });
    }
    if value.bytes().all(is_cookie_octet) {
        return Ok(Cow::Borrowed(value));
    }

    let mut quoted = String::with_capacity(value.len() + 8);
    quoted.push('"');
    for b in value.bytes() {
        match b {
            b'"' => quoted.push_str("\\\""),
            b'\\' => quoted.push_str("\\\\"),
            b' ' | b',' | b';' => quoted.push_str(&format!("\\{b:03o}")),
            b if is_cookie_octet(b) => quoted.push(char::from(b)),
            _ => {
                return Err(CookieEncodeError::UnrepresentableValue {
                    reason: "contains control or non-ASCII characters",
                })
            }
        }
    }
    quoted.push('"');
    Ok(Cow::Owned(quoted))
}

pub(super) fn unquote(raw: &str) -> Result<String, CookieDecodeError> {
    if raw.is_empty() {
        return Err(CookieDecodeError::EmptyValue);
    }

    let Some(inner) = raw.strip_prefix('"') else {
        if raw.bytes().all(is_cookie_octet) {
            return Ok(raw.to_owned());
        }
        return Err(CookieDecodeError::IllegalOctet);
    };
    let inner = inner
        .strip_suffix('"')
        .ok_or(CookieDecodeError::UnterminatedQuote)?;

    let mut out = Vec::with_capacity(inner.len());
    let mut bytes = inner.bytes();
    while let Some(b) = bytes.next() {
        match b {
            b'\\' => match bytes.next() {
                Some(first @ b'0'..=b'3') => {
                    let second = octal_digit(bytes.next())?;
                    let third = octal_digit(bytes.next())?;
                    out.push((first - b'0') * 64 + second * 8 + third);
                }
                Some(escaped) if (0x20..=0x7E).contains(&escaped) => out.push(escaped),
                _ => return Err(CookieDecodeError::BadEscape),
            },
            b'"' => return Err(CookieDecodeError::BadEscape),
            0x20..=0x7E => out.push(b),
            _ => return Err(CookieDecodeError::IllegalOctet),
        }
    }

    let value = String::from_utf8(out).map_err(|_| CookieDecodeError::IllegalOctet)?;
    if value.is_empty() {
        return Err(CookieDecodeError::EmptyValue);
    }
    Ok(value)
}

fn octal_digit(b: Option<u8>) -> Result<u8, CookieDecodeError> {
    match b {
        Some(d @ b'0'..=b'7') => Ok(d - b'0'),
        _ => Err(CookieDecodeError::BadEscape),
    }
}
