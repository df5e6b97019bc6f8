// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2.

/// Case-insensitive containment. An empty query matches everything.
pub fn contains_ignore_case(haystack: &str, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    haystack.to_lowercase().contains(&query.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_case_insensitive() {
        assert!(contains_ignore_case("Beta School", "school"));
        assert!(contains_ignore_case("ACME Academy", "acme a"));
        assert!(!contains_ignore_case("Beta School", "acme"));
    }

    #[test]
    fn test_contains_empty_query() {
        assert!(contains_ignore_case("Beta School", ""));
        assert!(contains_ignore_case("", ""));
    }

    #[test]
    fn test_contains_longer_query() {
        assert!(!contains_ignore_case("Acme", "Acme Academy"));
    }

    #[test]
    fn test_contains_unicode() {
        assert!(contains_ignore_case("Skolan Åbo", "åbo"));
    }
}
