use unicode_normalization::UnicodeNormalization;

use crate::language::text_source_map::TextSourceMap;
use crate::language::TextTransformation;

pub const DECAPITALIZE: TextTransformation = TextTransformation {
    id: "decapitalize",
    name: "Decapitalize text",
    description: "CAPITALIZED TEXT → capitalized text",
    apply: decapitalize,
};

pub const CAPITALIZE_FIRST_LETTER: TextTransformation = TextTransformation {
    id: "capitalize_first_letter",
    name: "Capitalize first letter",
    description: "lowercase text → Lowercase text",
    apply: capitalize_first_letter,
};

pub const REMOVE_ALPHABETIC_DIACRITICS: TextTransformation = TextTransformation {
    id: "remove_alphabetic_diacritics",
    name: "Remove alphabetic diacritics",
    description: "ápple → apple",
    apply: remove_alphabetic_diacritics,
};

fn decapitalize(text: &str, source_map: &mut TextSourceMap) -> String {
    let mut result = String::new();
    let mut out_length = 0;
    for c in text.chars() {
        let mut produced = 0;
        for lower in c.to_lowercase() {
            result.push(lower);
            produced += 1;
        }
        if produced != 1 {
            source_map.replace(out_length, 1, produced);
        }
        out_length += produced;
    }
    result
}

fn capitalize_first_letter(text: &str, source_map: &mut TextSourceMap) -> String {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let mut result = String::new();
    let mut produced = 0;
    for upper in first.to_uppercase() {
        result.push(upper);
        produced += 1;
    }
    if produced != 1 {
        source_map.replace(0, 1, produced);
    }
    result.push_str(chars.as_str());
    result
}

fn remove_alphabetic_diacritics(text: &str, source_map: &mut TextSourceMap) -> String {
    let mut result = String::new();
    let mut out_length = 0;
    for c in text.chars() {
        let mut produced = 0;
        for decomposed in c.nfd() {
            if ('\u{0300}'..='\u{036f}').contains(&decomposed) {
                continue;
            }
            result.push(decomposed);
            produced += 1;
        }
        if produced != 1 {
            source_map.replace(out_length, 1, produced);
        }
        out_length += produced;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn apply(transformation: &TextTransformation, text: &str) -> String {
        let mut map = TextSourceMap::new(text);
        (transformation.apply)(text, &mut map)
    }

    #[test]
    fn decapitalize_lowercases() {
        assert_eq!(apply(&DECAPITALIZE, "Read"), "read");
        assert_eq!(apply(&DECAPITALIZE, "ÉCOLE"), "école");
    }

    #[test]
    fn capitalize_first_letter_only_touches_the_head() {
        assert_eq!(apply(&CAPITALIZE_FIRST_LETTER, "read"), "Read");
        assert_eq!(apply(&CAPITALIZE_FIRST_LETTER, ""), "");
    }

    #[test]
    fn diacritics_are_stripped() {
        assert_eq!(apply(&REMOVE_ALPHABETIC_DIACRITICS, "ápplé"), "apple");
    }
}
