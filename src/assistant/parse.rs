//! Prompt construction and reply parsing for assistant suggestions.

const LIST_MARKERS: &[char] = &['0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '.', '-', ')', ' ', '*', '•'];

/// Prompt asking for `count` single words that connect `anchor` to `target`.
pub fn bridge_prompt(anchor: &str, target: &str, count: usize) -> String {
    format!(
        "You are helping someone connect two concepts with a chain of associations.\n\
         \n\
         <anchor>{anchor}</anchor>\n\
         <target>{target}</target>\n\
         \n\
         List words that sit between the anchor and the target: each should relate to both.\n\
         \n\
         Rules:\n\
         - Provide exactly {count} words\n\
         - One word per line\n\
         - Just the word, no explanation or numbering\n\
         - Single words only (no phrases)\n\
         - Do not repeat the anchor or the target\n\
         \n\
         Your words:",
        anchor = escape(anchor),
        target = escape(target),
        count = count,
    )
}

/// Extracts up to `limit` lowercase words from a free-form model reply.
///
/// Each non-blank line contributes its first token after list markers
/// (`1.`, `2)`, `-`, `*`) are stripped; non-alphabetic characters are dropped
/// and lines that end up empty are skipped.
pub fn parse_guesses(text: &str, limit: usize) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let cleaned = line.trim_start_matches(LIST_MARKERS);
            let token = cleaned.split_whitespace().next()?;
            let word: String = token
                .chars()
                .filter(|c| c.is_alphabetic())
                .flat_map(char::to_lowercase)
                .collect();
            (!word.is_empty()).then_some(word)
        })
        .take(limit)
        .collect()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_prompt_mentions_both_words_and_count() {
        let prompt = bridge_prompt("ocean", "forest", 5);
        assert!(prompt.contains("<anchor>ocean</anchor>"));
        assert!(prompt.contains("<target>forest</target>"));
        assert!(prompt.contains("exactly 5 words"));
    }

    #[test]
    fn test_bridge_prompt_escapes_markup() {
        let prompt = bridge_prompt("<b>", "a&b", 3);
        assert!(prompt.contains("<anchor>&lt;b&gt;</anchor>"));
        assert!(prompt.contains("<target>a&amp;b</target>"));
    }

    #[test]
    fn test_parse_guesses_plain_lines() {
        assert_eq!(
            parse_guesses("tide\nshore\nwood\n", 5),
            vec!["tide", "shore", "wood"]
        );
    }

    #[test]
    fn test_parse_guesses_strips_numbering_and_punctuation() {
        let reply = "1. Tide!\n2) Shore - the edge\n- Mangrove,\n* rain\n\n10. Delta";
        assert_eq!(
            parse_guesses(reply, 10),
            vec!["tide", "shore", "mangrove", "rain", "delta"]
        );
    }

    #[test]
    fn test_parse_guesses_truncates() {
        assert_eq!(parse_guesses("a\nb\nc\nd", 2), vec!["a", "b"]);
    }

    #[test]
    fn test_parse_guesses_skips_empty_tokens() {
        assert_eq!(parse_guesses("1.\n42\n...\nriver", 5), vec!["river"]);
        assert!(parse_guesses("", 5).is_empty());
    }
}
