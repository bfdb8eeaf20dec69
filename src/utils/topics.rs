/// Split a free-form tag string into topic names.
///
/// Words are separated by whitespace and reduced to their alphanumeric
/// characters (any script, case kept). Words with nothing left are dropped;
/// duplicates are removed while keeping first-seen order.
pub fn parse_topics(raw: &str) -> Vec<String> {
    let mut topics: Vec<String> = Vec::new();
    for word in raw.split_whitespace() {
        let name: String = word.chars().filter(|c| c.is_alphanumeric()).collect();
        if !name.is_empty() && !topics.contains(&name) {
            topics.push(name);
        }
    }
    topics
}

#[cfg(test)]
mod tests {
    use super::parse_topics;

    #[test]
    fn punctuation_is_stripped() {
        assert_eq!(
            parse_topics("Hello, World! foo_bar"),
            vec!["Hello", "World", "foobar"]
        );
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(parse_topics("").is_empty());
        assert!(parse_topics("   \t\n").is_empty());
    }

    #[test]
    fn symbol_only_words_are_skipped() {
        assert_eq!(parse_topics("!!! rust ###"), vec!["rust"]);
    }

    #[test]
    fn unicode_letters_are_kept() {
        assert_eq!(parse_topics("café ñandú"), vec!["café", "ñandú"]);
    }

    #[test]
    fn repeated_words_collapse() {
        assert_eq!(parse_topics("rust Rust rust!"), vec!["rust", "Rust"]);
    }
}
