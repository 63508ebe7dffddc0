//! Copy-paste helpers for ticket replies.

use std::collections::HashSet;

use crate::types::{CaseVariants, LineTools, TextStats};

/// Upper, lower, title and sentence case of `text`.
pub fn case_variants(text: &str) -> CaseVariants {
    CaseVariants {
        upper: text.to_uppercase(),
        lower: text.to_lowercase(),
        title: title_case(text),
        sentence: sentence_case(text),
    }
}

/// Capitalise the first letter of every alphabetic run, lower-case the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// First character upper-cased, everything else lower-cased.
fn sentence_case(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.as_str().to_lowercase().chars())
            .collect(),
        None => String::new(),
    }
}

/// Trim lines, drop blanks, then dedupe and sort.
pub fn line_tools(text: &str) -> LineTools {
    let lines: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();

    let mut seen = HashSet::new();
    let unique = lines
        .iter()
        .filter(|l| seen.insert(l.as_str()))
        .cloned()
        .collect();

    let mut sorted = lines.clone();
    sorted.sort();

    LineTools {
        lines,
        unique,
        sorted,
    }
}

/// Character, word and line counts.
pub fn text_stats(text: &str) -> TextStats {
    TextStats {
        characters: text.chars().count(),
        words: text.split_whitespace().count(),
        lines: text.split('\n').count(),
        spaces: text.matches(' ').count(),
        alphanumeric: text.chars().filter(|c| c.is_alphanumeric()).count(),
        special: text
            .chars()
            .filter(|c| !c.is_alphanumeric() && !c.is_whitespace())
            .count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_variants() {
        let variants = case_variants("hello WORLD from support-buddy");
        assert_eq!(variants.upper, "HELLO WORLD FROM SUPPORT-BUDDY");
        assert_eq!(variants.lower, "hello world from support-buddy");
        assert_eq!(variants.title, "Hello World From Support-Buddy");
        assert_eq!(variants.sentence, "Hello world from support-buddy");
    }

    #[test]
    fn test_case_variants_empty() {
        let variants = case_variants("");
        assert!(variants.title.is_empty());
        assert!(variants.sentence.is_empty());
    }

    #[test]
    fn test_line_tools() {
        let tools = line_tools("  b.example.com\n\na.example.com \nb.example.com\n   \n");
        assert_eq!(tools.lines, vec!["b.example.com", "a.example.com", "b.example.com"]);
        assert_eq!(tools.unique, vec!["b.example.com", "a.example.com"]);
        assert_eq!(tools.sorted, vec!["a.example.com", "b.example.com", "b.example.com"]);
    }

    #[test]
    fn test_text_stats() {
        let stats = text_stats("Hi there!\nIP: 1.2.3.4");
        assert_eq!(stats.characters, 21);
        assert_eq!(stats.words, 4);
        assert_eq!(stats.lines, 2);
        assert_eq!(stats.spaces, 2);
        assert_eq!(stats.alphanumeric, 13);
        assert_eq!(stats.special, 5);
    }

    #[test]
    fn test_text_stats_empty() {
        let stats = text_stats("");
        assert_eq!(stats.characters, 0);
        assert_eq!(stats.words, 0);
        assert_eq!(stats.lines, 1);
    }
}
