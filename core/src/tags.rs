use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref SEPARATOR: Regex = Regex::new(r"[,\s]+").expect("valid regex");
}

/// Normalize a single tag: NFKC, lowercase, surrounding whitespace and leading `#` removed.
/// Returns `None` when nothing is left.
pub fn normalize_tag(raw: &str) -> Option<String> {
    clean_token(&raw.nfkc().collect::<String>())
}

/// Lowercase and strip a token that is already NFKC-normalized.
fn clean_token(token: &str) -> Option<String> {
    let lowered = token.to_lowercase();
    let tag = lowered.trim().trim_start_matches('#').trim();
    if tag.is_empty() { None } else { Some(tag.to_string()) }
}

/// Split a raw hashtag field ("cultural, Food #beach") into a deduplicated set of normalized tags.
pub fn parse_hashtags(raw: &str) -> BTreeSet<String> {
    // NFKC before splitting so full-width commas and spaces separate too
    let normalized = raw.nfkc().collect::<String>();
    SEPARATOR
        .split(&normalized)
        .filter_map(clean_token)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_commas_and_whitespace() {
        let tags = parse_hashtags(" cultural,food  beach,,");
        let got: Vec<&str> = tags.iter().map(|s| s.as_str()).collect();
        assert_eq!(got, vec!["beach", "cultural", "food"]);
    }

    #[test]
    fn lowercases_and_dedups() {
        let tags = parse_hashtags("Food, FOOD, #food");
        assert_eq!(tags.len(), 1);
        assert!(tags.contains("food"));
    }

    #[test]
    fn full_width_separators_split() {
        let tags = parse_hashtags("Ｆｏｏｄ，beach\u{3000}#Art");
        let got: Vec<&str> = tags.iter().map(|s| s.as_str()).collect();
        assert_eq!(got, vec!["art", "beach", "food"]);
    }

    #[test]
    fn blank_input_is_empty() {
        assert!(parse_hashtags("  , ,\t").is_empty());
        assert!(normalize_tag("#").is_none());
    }
}
