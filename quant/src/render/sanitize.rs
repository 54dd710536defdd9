/// Drop C0/C1 control characters (ESC, BEL, CSI, DEL and friends) so text
/// from the gateway cannot drive the terminal. Newlines and tabs survive.
pub fn strip_controls(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_sequences_lose_their_introducers() {
        let cleaned = strip_controls("up\x1b]52;c;cm0gLXJmIH4=\x07\x1b[2J\u{9b}31m done");

        assert!(!cleaned.contains('\x1b'));
        assert!(!cleaned.contains('\x07'));
        assert!(!cleaned.contains('\u{9b}'));
        assert_eq!(cleaned, "up]52;c;cm0gLXJmIH4=[2J31m done");
    }

    #[test]
    fn layout_whitespace_is_kept() {
        assert_eq!(strip_controls("a\tb\nc\r\x7f"), "a\tb\nc");
    }
}
