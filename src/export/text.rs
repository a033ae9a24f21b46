/// UTF-8 bytes of the text, unchanged
pub fn encode(text: &str) -> Vec<u8> {
    text.as_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_verbatim() {
        assert_eq!(encode("line1\nline2"), b"line1\nline2".to_vec());
    }

    #[test]
    fn test_decodes_back_to_input() {
        let text = "\n\n--- Image 1 ---\nनमस्ते\tதமிழ்\r\n€ ✓";
        assert_eq!(String::from_utf8(encode(text)).unwrap(), text);
    }
}
