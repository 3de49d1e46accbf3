//! Session titles from the first user message.

use council_domain::turn::HistoryTurn;

/// Title used until the first message arrives.
pub const UNTITLED: &str = "New chat";

/// First line of the first user message, cut to `max_chars` characters.
///
/// An attachment-only message is titled by the file name.
pub fn derive_title(first: &HistoryTurn, max_chars: usize) -> String {
    let text = first
        .segments
        .iter()
        .filter_map(|s| s.as_text())
        .flat_map(str::lines)
        .map(str::trim)
        .find(|l| !l.is_empty());

    let source = match (text, &first.attachment) {
        (Some(line), _) => line,
        (None, Some(att)) => att.name.as_str(),
        (None, None) => return UNTITLED.to_string(),
    };

    let max_chars = max_chars.max(1);
    if source.chars().count() <= max_chars {
        return source.to_string();
    }
    let cut: String = source.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::turn::{AttachmentRef, Role};

    #[test]
    fn short_message_is_used_whole() {
        assert_eq!(derive_title(&HistoryTurn::user("Explain photosynthesis"), 48), "Explain photosynthesis");
    }

    #[test]
    fn long_message_is_cut_on_chars() {
        let title = derive_title(&HistoryTurn::user("ééééé ééééé"), 6);
        assert_eq!(title, "ééééé...");
    }

    #[test]
    fn first_non_empty_line_wins() {
        assert_eq!(derive_title(&HistoryTurn::user("\n  \nsecond line\nthird"), 48), "second line");
    }

    #[test]
    fn attachment_only_uses_file_name() {
        let turn = HistoryTurn {
            role: Role::User,
            segments: vec![],
            attachment: Some(AttachmentRef {
                handle: "h".into(),
                mime_type: "image/png".into(),
                name: "leaf.png".into(),
            }),
        };
        assert_eq!(derive_title(&turn, 48), "leaf.png");
    }

    #[test]
    fn nothing_at_all_is_untitled() {
        let turn = HistoryTurn {
            role: Role::User,
            segments: vec![],
            attachment: None,
        };
        assert_eq!(derive_title(&turn, 48), UNTITLED);
    }
}
