/// Keeps at most `max_chars` characters, counted as Unicode scalar values.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Local name of an IRI-like relationship type: the text after the final `#`.
pub fn type_suffix(kind: &str) -> &str {
    kind.rsplit('#').next().unwrap_or(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_on_char_boundaries() {
        assert_eq!(truncate_chars("FiberOpticCableSegment", 15), "FiberOpticCable");
        assert_eq!(truncate_chars("short", 15), "short");
        assert_eq!(truncate_chars("基站设备与光纤网络连接关系描述信息", 3), "基站设");
        assert_eq!(truncate_chars("", 15), "");
    }

    #[test]
    fn type_suffix_takes_fragment() {
        assert_eq!(type_suffix("http://x#linksTo"), "linksTo");
        assert_eq!(type_suffix("a#b#c"), "c");
        assert_eq!(type_suffix("SUBCLASS_OF"), "SUBCLASS_OF");
        assert_eq!(type_suffix("http://x#"), "");
    }
}
