//! XML entity escaping
//!
//! Every value placed inside a SOAP argument or a DIDL fragment goes through
//! [`escape_xml`]. Metadata handed to AVTransport is itself XML, so it ends up
//! escaped exactly once inside the envelope.

use std::borrow::Cow;

/// Escape `&`, `<`, `>`, `'` and `"`
pub fn escape_xml(raw: &str) -> String {
    quick_xml::escape::escape(raw).into_owned()
}

/// Resolve the predefined and numeric entities.
///
/// Text with a malformed entity is returned untouched rather than rejected,
/// device metadata is not always well formed.
pub fn unescape_xml(escaped: &str) -> String {
    match quick_xml::escape::unescape(escaped) {
        Ok(Cow::Borrowed(s)) => s.to_string(),
        Ok(Cow::Owned(s)) => s,
        Err(_) => escaped.to_string(),
    }
}
