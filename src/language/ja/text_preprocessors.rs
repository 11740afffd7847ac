use wana_kana::ConvertJapanese;

use crate::language::ja::japanese::{
    convert_fullwidth_alphanumeric_to_normal, convert_halfwidth_kana_to_fullwidth,
    convert_hiragana_to_katakana, convert_katakana_to_hiragana, normalize_combining_characters,
};
use crate::language::text_source_map::TextSourceMap;
use crate::language::TextTransformation;

pub const CONVERT_HALF_WIDTH_CHARACTERS: TextTransformation = TextTransformation {
    id: "convert_half_width_characters",
    name: "Convert half width characters to full width",
    description: "ﾖﾐﾁｬﾝ → ヨミチャン",
    apply: |text, source_map| convert_halfwidth_kana_to_fullwidth(text, source_map),
};

pub const ALPHABETIC_TO_HIRAGANA: TextTransformation = TextTransformation {
    id: "alphabetic_to_hiragana",
    name: "Convert alphabetic characters to hiragana",
    description: "yomichan → よみちゃん",
    apply: convert_alphabetic_to_kana,
};

pub const NORMALIZE_COMBINING_CHARACTERS: TextTransformation = TextTransformation {
    id: "normalize_combining_characters",
    name: "Normalize combining characters",
    description: "ト\u{3099} → ド",
    apply: |text, source_map| normalize_combining_characters(text, source_map),
};

pub const CONVERT_FULLWIDTH_CHARACTERS: TextTransformation = TextTransformation {
    id: "convert_fullwidth_characters",
    name: "Convert fullwidth alphanumeric characters to normal",
    description: "ｙｏｍｉｔａｎ → yomitan",
    apply: |text, _| convert_fullwidth_alphanumeric_to_normal(text),
};

pub const CONVERT_HIRAGANA_TO_KATAKANA: TextTransformation = TextTransformation {
    id: "hiragana_to_katakana",
    name: "Convert hiragana to katakana",
    description: "よみちゃん → ヨミチャン",
    apply: |text, _| convert_hiragana_to_katakana(text),
};

pub const CONVERT_KATAKANA_TO_HIRAGANA: TextTransformation = TextTransformation {
    id: "katakana_to_hiragana",
    name: "Convert katakana to hiragana",
    description: "ヨミチャン → よみちゃん",
    apply: |text, _| convert_katakana_to_hiragana(text, false),
};

/// Converts runs of alphabetic characters to hiragana, leaving everything
/// else in place. Width-variant letters are normalized before conversion.
fn convert_alphabetic_to_kana(text: &str, source_map: &mut TextSourceMap) -> String {
    let mut result = String::new();
    let mut part = String::new();
    let mut part_chars = 0;
    let mut out_length = 0;

    let flush =
        |part: &mut String, part_chars: &mut usize, result: &mut String, out_length: &mut usize, source_map: &mut TextSourceMap| {
            if part.is_empty() {
                return;
            }
            let converted = part.as_str().to_hiragana();
            let produced = converted.chars().count();
            if produced != *part_chars {
                source_map.replace(*out_length, *part_chars, produced);
            }
            *out_length += produced;
            result.push_str(&converted);
            part.clear();
            *part_chars = 0;
        };

    for c in text.chars() {
        let code_point = c as u32;
        let normalized = match code_point {
            0x41..=0x5a => char::from_u32(code_point + 0x20),
            0x61..=0x7a => Some(c),
            0xff21..=0xff3a => char::from_u32(code_point - 0xff21 + 0x61),
            0xff41..=0xff5a => char::from_u32(code_point - 0xff41 + 0x61),
            0x2d | 0xff0d => Some('-'), // dashes mark long vowels
            _ => None,
        };
        match normalized {
            Some(n) => {
                part.push(n);
                part_chars += 1;
            }
            None => {
                flush(&mut part, &mut part_chars, &mut result, &mut out_length, source_map);
                result.push(c);
                out_length += 1;
            }
        }
    }
    flush(&mut part, &mut part_chars, &mut result, &mut out_length, source_map);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn alphabetic_runs_convert_to_hiragana() {
        let mut map = TextSourceMap::new("yomichanを使う");
        let out = convert_alphabetic_to_kana("yomichanを使う", &mut map);
        assert_eq!(out, "よみちゃんを使う");
        // "よみちゃん" (5 chars) came from "yomichan" (8 chars)
        assert_eq!(map.original_length(5), 8);
        assert_eq!(map.original_length(out.chars().count()), 11);
    }

    #[test]
    fn fullwidth_letters_are_normalized_before_conversion() {
        let mut map = TextSourceMap::new("ｙｏｍｉ");
        let out = convert_alphabetic_to_kana("ｙｏｍｉ", &mut map);
        assert_eq!(out, "よみ");
    }
}
