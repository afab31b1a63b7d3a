//! NHX ("New Hampshire Extended") vertex annotations.
//!
//! Provides the [Annotations] map and the decoding of raw `[&&NHX:key=value:...]`
//! blocks captured by the Newick parser. Values are kept as strings; their
//! meaning (species, duplication flags, bootstrap values, ...) is left to the
//! consumer.

use std::collections::BTreeMap;

/// Opening tag of an NHX block, matched case-insensitively
pub(crate) const NHX_TAG: &str = "[&&NHX";

/// Key/value annotations of a single vertex, sorted by key.
pub type Annotations = BTreeMap<String, String>;

/// Decodes all NHX blocks in `raw` into `annotations` and returns the remaining label.
///
/// Each `[&&NHX...]` block (up to the first `]`, or the end of `raw`) is cut out
/// of the text. Its payload is split on `:`; each non-empty part is split on the
/// first `=` into key and value, both trimmed. A part without `=` is stored as a
/// key with an empty value. Later keys overwrite earlier ones. The remainder is
/// trimmed and stripped of enclosing quotes.
///
/// # Example
/// ```
/// use nhxtree::model::annotation::{Annotations, decode_nhx};
///
/// let mut annotations = Annotations::new();
/// let label = decode_nhx("'Homo sapiens'[&&NHX:S=human:D=N]", &mut annotations);
/// assert_eq!(label, "Homo sapiens");
/// assert_eq!(annotations["S"], "human");
/// assert_eq!(annotations["D"], "N");
/// ```
pub fn decode_nhx(raw: &str, annotations: &mut Annotations) -> String {
    let mut remainder = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = find_nhx_tag(rest) {
        remainder.push_str(&rest[..start]);
        let block = &rest[start + NHX_TAG.len()..];
        let (payload, after) = match block.find(']') {
            Some(end) => (&block[..end], &block[end + 1..]),
            None => (block, ""),
        };
        decode_payload(payload, annotations);
        rest = after;
    }
    remainder.push_str(rest);

    strip_quotes(remainder.trim())
}

/// Byte offset of the first NHX tag in `text`, ignoring ASCII case.
fn find_nhx_tag(text: &str) -> Option<usize> {
    let tag = NHX_TAG.as_bytes();
    text.as_bytes()
        .windows(tag.len())
        .position(|window| window.eq_ignore_ascii_case(tag))
}

fn decode_payload(payload: &str, annotations: &mut Annotations) {
    for part in payload.split(':') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (key, value) = part.split_once('=').unwrap_or((part, ""));
        annotations.insert(key.trim().to_string(), value.trim().to_string());
    }
}

/// Removes one pair of enclosing single or double quotes.
///
/// Doubled single quotes inside a single-quoted label are unescaped.
pub fn strip_quotes(label: &str) -> String {
    let bytes = label.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == b'\'' && last == b'\'' {
            return label[1..label.len() - 1].replace("''", "'");
        }
        if first == b'"' && last == b'"' {
            return label[1..label.len() - 1].to_string();
        }
    }
    label.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_simple_block() {
        let mut annotations = Annotations::new();
        let label = decode_nhx("A[&&NHX:S=human]", &mut annotations);
        assert_eq!(label, "A");
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations["S"], "human");
    }

    #[test]
    fn test_decode_trims_keys_and_values() {
        let mut annotations = Annotations::new();
        let label = decode_nhx(" B [&&NHX: S = mouse : B=100 ]", &mut annotations);
        assert_eq!(label, "B");
        assert_eq!(annotations["S"], "mouse");
        assert_eq!(annotations["B"], "100");
    }

    #[test]
    fn test_value_keeps_later_equals_signs() {
        let mut annotations = Annotations::new();
        decode_nhx("[&&NHX:expr=a=b]", &mut annotations);
        assert_eq!(annotations["expr"], "a=b");
    }

    #[test]
    fn test_part_without_value() {
        let mut annotations = Annotations::new();
        decode_nhx("X[&&NHX:flag:S=x]", &mut annotations);
        assert_eq!(annotations["flag"], "");
        assert_eq!(annotations["S"], "x");
    }

    #[test]
    fn test_lowercase_tag_and_unterminated_block() {
        let mut annotations = Annotations::new();
        let label = decode_nhx("C[&&nhx:S=rat", &mut annotations);
        assert_eq!(label, "C");
        assert_eq!(annotations["S"], "rat");
    }

    #[test]
    fn test_multiple_blocks_later_wins() {
        let mut annotations = Annotations::new();
        let label = decode_nhx("D[&&NHX:S=a:T=1][&&NHX:S=b]", &mut annotations);
        assert_eq!(label, "D");
        assert_eq!(annotations["S"], "b");
        assert_eq!(annotations["T"], "1");
    }

    #[test]
    fn test_other_brackets_stay_in_label() {
        let mut annotations = Annotations::new();
        let label = decode_nhx("E[note]", &mut annotations);
        assert_eq!(label, "E[note]");
        assert!(annotations.is_empty());
    }

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("'Wilson''s'"), "Wilson's");
        assert_eq!(strip_quotes("\"Kea\""), "Kea");
        assert_eq!(strip_quotes("'"), "'");
        assert_eq!(strip_quotes("Kaka"), "Kaka");
    }
}
