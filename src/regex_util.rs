use fancy_regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::language::text_source_map::TextSourceMap;

static MATCH_REPLACEMENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(?:\$|&|`|'|(\d\d?)|<([^>]*)>)").unwrap());

/// Applies a regex replacement to `text`, recording every length change in
/// `source_map`. The replacement string supports the JS `String.replace`
/// placeholders: `$$`, `$&`, `` $` ``, `$'`, `$1`..`$99` and `$<name>`.
pub fn apply_text_replacement(
    text: &str,
    source_map: &mut TextSourceMap,
    pattern: &Regex,
    replacement: &str,
    is_global: bool,
) -> String {
    let mut current_text = text.to_string();
    let mut search_from = 0;
    loop {
        let Some(captures) = pattern
            .captures(&current_text[search_from..])
            .ok()
            .flatten()
        else {
            break;
        };
        let matched = captures.get(0).unwrap();
        let match_start = search_from + matched.start();
        let match_end = search_from + matched.end();
        let matched_is_empty = matched.as_str().is_empty();
        let actual_replacement =
            apply_match_replacement(replacement, &captures, &current_text[search_from..]);

        let match_start_chars = current_text[..match_start].chars().count();
        let match_length_chars = matched.as_str().chars().count();
        let replacement_chars = actual_replacement.chars().count();
        source_map.replace(match_start_chars, match_length_chars, replacement_chars);

        let mut new_text = String::with_capacity(
            current_text.len() - matched.as_str().len() + actual_replacement.len(),
        );
        new_text.push_str(&current_text[..match_start]);
        new_text.push_str(&actual_replacement);
        new_text.push_str(&current_text[match_end..]);
        current_text = new_text;

        search_from = match_start + actual_replacement.len();
        // zero-length matches must still advance or the loop never ends
        if matched_is_empty {
            match current_text[search_from..].chars().next() {
                Some(c) => search_from += c.len_utf8(),
                None => break,
            }
        }
        if !is_global || search_from >= current_text.len() {
            break;
        }
    }
    current_text
}

fn apply_match_replacement(replacement: &str, captures: &Captures, haystack: &str) -> String {
    MATCH_REPLACEMENT_PATTERN
        .replace_all(replacement, |inner: &Captures| {
            let token = inner.get(0).unwrap().as_str();
            if let Some(digits) = inner.get(1) {
                if let Ok(index) = digits.as_str().parse::<usize>() {
                    if index > 0 && index < captures.len() {
                        return captures
                            .get(index)
                            .map_or(String::new(), |m| m.as_str().to_string());
                    }
                }
                return token.to_string();
            }
            if let Some(name) = inner.get(2) {
                return captures
                    .name(name.as_str())
                    .map_or_else(|| token.to_string(), |m| m.as_str().to_string());
            }
            match token {
                "$$" => "$".to_string(),
                "$&" => captures.get(0).unwrap().as_str().to_string(),
                // prefix/suffix placeholders resolve against the text the
                // outer match ran on
                "$`" => haystack[..captures.get(0).unwrap().start()].to_string(),
                "$'" => haystack[captures.get(0).unwrap().end()..].to_string(),
                _ => token.to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn replace_all(text: &str, pattern: &str, replacement: &str) -> (String, TextSourceMap) {
        let mut map = TextSourceMap::new(text);
        let regex = Regex::new(pattern).unwrap();
        let out = apply_text_replacement(text, &mut map, &regex, replacement, true);
        (out, map)
    }

    #[test]
    fn plain_replacement_updates_source_map() {
        let (out, map) = replace_all("ああーお", "ー", "");
        assert_eq!(out, "ああお");
        assert_eq!(map.original_length(out.chars().count()), 4);
        assert_eq!(map.original_length(2), 3);
    }

    #[test]
    fn numbered_groups_are_substituted() {
        let (out, _) = replace_all("takusan", "taku(san)", "$1");
        assert_eq!(out, "san");
    }

    #[test]
    fn named_groups_are_substituted() {
        let (out, _) = replace_all("good-morning", "(?P<head>\\w+)-\\w+", "$<head>");
        assert_eq!(out, "good");
    }

    #[test]
    fn dollar_escape() {
        let (out, _) = replace_all("cost", "cost", "$$5");
        assert_eq!(out, "$5");
    }

    #[test]
    fn non_global_replaces_once() {
        let mut map = TextSourceMap::new("aaa");
        let regex = Regex::new("a").unwrap();
        let out = apply_text_replacement("aaa", &mut map, &regex, "b", false);
        assert_eq!(out, "baa");
    }
}
