/// Trim every line, drop blank ones, and join the rest with `\n`.
///
/// The markup cleaner emits text with ragged indentation and runs of empty
/// lines; chunk windows are measured in characters, so that whitespace would
/// otherwise eat into every window.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_blank_lines_and_indentation() {
        let raw = "  Title  \n\n\n\tRow a | b\r\n   \nLast line ";
        assert_eq!(normalize_text(raw), "Title\nRow a | b\nLast line");
    }

    #[test]
    fn empty_and_whitespace_only_input() {
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text(" \n\t\n "), "");
    }

    #[test]
    fn already_normalized_text_is_unchanged() {
        let text = "מכבי\nכללית | זהב";
        assert_eq!(normalize_text(text), text);
    }
}
