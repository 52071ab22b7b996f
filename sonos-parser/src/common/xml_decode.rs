//! XML decoding utilities.
//!
//! UPnP payloads mix namespace prefixes freely. Stripping them before handing
//! the text to serde keeps the struct definitions simple.

use crate::error::{ParseError, ParseResult};
use serde::de::DeserializeOwned;

/// Parse XML string into a deserializable type with namespace stripping.
pub fn parse<T: DeserializeOwned>(xml: &str) -> ParseResult<T> {
    let stripped = strip_namespaces(xml);
    quick_xml::de::from_str(&stripped)
        .map_err(|e| ParseError::XmlDeserializationFailed(e.to_string()))
}

/// Strip namespace prefixes from element and attribute names.
///
/// `xmlns` declarations are dropped entirely.
///
/// # Example
///
/// Input: `<s:Body><u:Result>x</u:Result></s:Body>`
/// Output: `<Body><Result>x</Result></Body>`
pub fn strip_namespaces(xml: &str) -> String {
    let mut result = String::with_capacity(xml.len());
    let mut rest = xml;

    while let Some(open) = rest.find('<') {
        result.push_str(&rest[..open]);
        let tag_and_after = &rest[open..];
        let Some(close) = find_tag_end(tag_and_after) else {
            result.push_str(tag_and_after);
            return result;
        };
        let tag = &tag_and_after[..=close];
        if tag.starts_with("<?") || tag.starts_with("<!") {
            result.push_str(tag);
        } else {
            result.push_str(&strip_tag(tag));
        }
        rest = &tag_and_after[close + 1..];
    }
    result.push_str(rest);
    result
}

/// Index of the `>` closing the tag that starts at byte 0, skipping quoted values
fn find_tag_end(tag: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, ch) in tag.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(ch),
            (None, '>') => return Some(i),
            _ => {}
        }
    }
    None
}

fn strip_tag(tag: &str) -> String {
    // tag is `<...>` including brackets
    let inner = &tag[1..tag.len() - 1];
    let (closing, inner) = match inner.strip_prefix('/') {
        Some(rest) => ("/", rest),
        None => ("", inner),
    };
    let (body, self_closing) = match inner.strip_suffix('/') {
        Some(rest) => (rest, "/"),
        None => (inner, ""),
    };

    let name_end = body
        .find(|c: char| c.is_whitespace())
        .unwrap_or(body.len());
    let name = local(&body[..name_end]);

    let mut out = format!("<{}{}", closing, name);
    for (attr_name, value) in split_attributes(&body[name_end..]) {
        if attr_name == "xmlns" || attr_name.starts_with("xmlns:") {
            continue;
        }
        out.push(' ');
        out.push_str(local(attr_name));
        out.push('=');
        out.push_str(value);
    }
    out.push_str(self_closing);
    out.push('>');
    out
}

fn local(name: &str) -> &str {
    name.rsplit_once(':').map(|(_, l)| l).unwrap_or(name)
}

/// Split `a="1" b:c='2'` into names and quoted values (quotes kept)
fn split_attributes(attrs: &str) -> Vec<(&str, &str)> {
    let mut out = Vec::new();
    let mut rest = attrs.trim_start();
    while let Some(eq) = rest.find('=') {
        let name = rest[..eq].trim();
        let after = rest[eq + 1..].trim_start();
        let Some(quote) = after.chars().next().filter(|c| *c == '"' || *c == '\'') else {
            break;
        };
        let Some(end) = after[1..].find(quote) else {
            break;
        };
        out.push((name, &after[..end + 2]));
        rest = after[end + 2..].trim_start();
    }
    out
}
