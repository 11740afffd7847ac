use std::collections::HashMap;
use std::sync::LazyLock;

use crate::language::text_source_map::TextSourceMap;

pub const HIRAGANA_SMALL_TSU_CODE_POINT: u32 = 0x3063;
pub const KATAKANA_SMALL_TSU_CODE_POINT: u32 = 0x30c3;
pub const KATAKANA_SMALL_KA_CODE_POINT: u32 = 0x30f5;
pub const KATAKANA_SMALL_KE_CODE_POINT: u32 = 0x30f6;
pub const KANA_PROLONGED_SOUND_MARK_CODE_POINT: u32 = 0x30fc;

pub type CodepointRange = (u32, u32);

pub const HIRAGANA_CONVERSION_RANGE: CodepointRange = (0x3041, 0x3096);
pub const KATAKANA_CONVERSION_RANGE: CodepointRange = (0x30a1, 0x30f6);

pub const HIRAGANA_RANGE: CodepointRange = (0x3040, 0x309f);
pub const KATAKANA_RANGE: CodepointRange = (0x30a0, 0x30ff);

pub const KANA_RANGES: &[CodepointRange] = &[HIRAGANA_RANGE, KATAKANA_RANGE];

/// Unicode blocks which are considered Japanese for the purposes of
/// character filtering.
pub const JAPANESE_RANGES: &[CodepointRange] = &[
    HIRAGANA_RANGE,
    KATAKANA_RANGE,
    (0x3000, 0x303f), // CJK symbols and punctuation
    (0x31f0, 0x31ff), // katakana phonetic extensions
    (0x3200, 0x32ff), // enclosed CJK letters and months
    (0x3300, 0x33ff), // CJK compatibility
    (0x3400, 0x4dbf), // CJK unified ideographs extension A
    (0x4e00, 0x9fff), // CJK unified ideographs
    (0xf900, 0xfaff), // CJK compatibility ideographs
    (0xfe30, 0xfe4f), // CJK compatibility forms
    (0xff00, 0xffef), // halfwidth and fullwidth forms
    (0x1b000, 0x1b0ff), // kana supplement
    (0x20000, 0x2a6df), // CJK unified ideographs extension B
    (0x2a700, 0x2b73f), // CJK unified ideographs extension C
    (0x2b740, 0x2b81f), // CJK unified ideographs extension D
    (0x2f800, 0x2fa1f), // CJK compatibility ideographs supplement
];

fn is_code_point_in_range(code_point: u32, (min, max): CodepointRange) -> bool {
    code_point >= min && code_point <= max
}

fn is_code_point_in_ranges(code_point: u32, ranges: &[CodepointRange]) -> bool {
    ranges
        .iter()
        .any(|range| is_code_point_in_range(code_point, *range))
}

pub fn is_code_point_kana(code_point: u32) -> bool {
    is_code_point_in_ranges(code_point, KANA_RANGES)
}

pub fn is_code_point_japanese(code_point: u32) -> bool {
    is_code_point_in_ranges(code_point, JAPANESE_RANGES)
}

/// Maps each kana character to the vowel its mora ends in, used to resolve
/// prolonged sound marks during katakana to hiragana conversion.
static KANA_TO_VOWEL_MAPPING: LazyLock<HashMap<char, char>> = LazyLock::new(|| {
    let rows = [
        ('あ', "ぁあかがさざただなはばぱまゃやらゎわ"),
        ('い', "ぃいきぎしじちぢにひびぴみり"),
        ('う', "ぅうくぐすずっつづぬふぶぷむゅゆるゔ"),
        ('え', "ぇえけげせぜてでねへべぺめれ"),
        ('お', "ぉおこごそぞとどのほぼぽもょよろを"),
    ];
    let mut mapping = HashMap::new();
    for (vowel, characters) in rows {
        for c in characters.chars() {
            mapping.insert(c, vowel);
        }
    }
    mapping
});

fn get_prolonged_hiragana(previous: char) -> Option<char> {
    KANA_TO_VOWEL_MAPPING.get(&previous).copied()
}

/// Halfwidth katakana and the fullwidth forms they convert to. Where a
/// voiced (and semi-voiced) form exists it follows the plain form, so a
/// trailing combining mark can pick it by index.
static HALFWIDTH_KATAKANA_MAPPING: LazyLock<HashMap<char, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ('ｦ', "ヲ"),
        ('ｧ', "ァ"),
        ('ｨ', "ィ"),
        ('ｩ', "ゥ"),
        ('ｪ', "ェ"),
        ('ｫ', "ォ"),
        ('ｬ', "ャ"),
        ('ｭ', "ュ"),
        ('ｮ', "ョ"),
        ('ｯ', "ッ"),
        ('ｰ', "ー"),
        ('ｱ', "ア"),
        ('ｲ', "イ"),
        ('ｳ', "ウヴ"),
        ('ｴ', "エ"),
        ('ｵ', "オ"),
        ('ｶ', "カガ"),
        ('ｷ', "キギ"),
        ('ｸ', "クグ"),
        ('ｹ', "ケゲ"),
        ('ｺ', "コゴ"),
        ('ｻ', "サザ"),
        ('ｼ', "シジ"),
        ('ｽ', "スズ"),
        ('ｾ', "セゼ"),
        ('ｿ', "ソゾ"),
        ('ﾀ', "タダ"),
        ('ﾁ', "チヂ"),
        ('ﾂ', "ツヅ"),
        ('ﾃ', "テデ"),
        ('ﾄ', "トド"),
        ('ﾅ', "ナ"),
        ('ﾆ', "ニ"),
        ('ﾇ', "ヌ"),
        ('ﾈ', "ネ"),
        ('ﾉ', "ノ"),
        ('ﾊ', "ハバパ"),
        ('ﾋ', "ヒビピ"),
        ('ﾌ', "フブプ"),
        ('ﾍ', "ヘベペ"),
        ('ﾎ', "ホボポ"),
        ('ﾏ', "マ"),
        ('ﾐ', "ミ"),
        ('ﾑ', "ム"),
        ('ﾒ', "メ"),
        ('ﾓ', "モ"),
        ('ﾔ', "ヤ"),
        ('ﾕ', "ユ"),
        ('ﾖ', "ヨ"),
        ('ﾗ', "ラ"),
        ('ﾘ', "リ"),
        ('ﾙ', "ル"),
        ('ﾚ', "レ"),
        ('ﾛ', "ロ"),
        ('ﾜ', "ワ"),
        ('ﾝ', "ン"),
    ])
});

const HALFWIDTH_VOICED_MARK: char = 'ﾞ';
const HALFWIDTH_SEMI_VOICED_MARK: char = 'ﾟ';

pub fn convert_katakana_to_hiragana(text: &str, keep_prolonged_sound_marks: bool) -> String {
    let offset = HIRAGANA_CONVERSION_RANGE.0 - KATAKANA_CONVERSION_RANGE.0;
    let mut result = String::new();
    for c in text.chars() {
        let code_point = c as u32;
        let converted = match code_point {
            KATAKANA_SMALL_KA_CODE_POINT | KATAKANA_SMALL_KE_CODE_POINT => c,
            KANA_PROLONGED_SOUND_MARK_CODE_POINT if !keep_prolonged_sound_marks => result
                .chars()
                .last()
                .and_then(get_prolonged_hiragana)
                .unwrap_or(c),
            _ if is_code_point_in_range(code_point, KATAKANA_CONVERSION_RANGE) => {
                char::from_u32(code_point + offset).unwrap_or(c)
            }
            _ => c,
        };
        result.push(converted);
    }
    result
}

pub fn convert_hiragana_to_katakana(text: &str) -> String {
    let offset = KATAKANA_CONVERSION_RANGE.0 - HIRAGANA_CONVERSION_RANGE.0;
    text.chars()
        .map(|c| {
            let code_point = c as u32;
            if is_code_point_in_range(code_point, HIRAGANA_CONVERSION_RANGE) {
                char::from_u32(code_point + offset).unwrap_or(c)
            } else {
                c
            }
        })
        .collect()
}

pub fn convert_fullwidth_alphanumeric_to_normal(text: &str) -> String {
    text.chars()
        .map(|c| {
            let code_point = c as u32;
            let converted = match code_point {
                0xff10..=0xff19 => code_point - (0xff10 - 0x30), // ０-９
                0xff21..=0xff3a => code_point - (0xff21 - 0x41), // Ａ-Ｚ
                0xff41..=0xff5a => code_point - (0xff41 - 0x61), // ａ-ｚ
                _ => code_point,
            };
            char::from_u32(converted).unwrap_or(c)
        })
        .collect()
}

/// Converts halfwidth katakana to fullwidth, folding trailing voiced and
/// semi-voiced marks into the preceding character.
pub fn convert_halfwidth_kana_to_fullwidth(text: &str, source_map: &mut TextSourceMap) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut result = String::new();
    let mut out_length = 0;
    let mut i = 0;
    while i < chars.len() {
        let Some(mapping) = HALFWIDTH_KATAKANA_MAPPING.get(&chars[i]) else {
            result.push(chars[i]);
            out_length += 1;
            i += 1;
            continue;
        };
        let forms: Vec<char> = mapping.chars().collect();
        let mut index = 0;
        if let Some(&mark) = chars.get(i + 1) {
            if mark == HALFWIDTH_VOICED_MARK && forms.len() > 1 {
                index = 1;
            } else if mark == HALFWIDTH_SEMI_VOICED_MARK && forms.len() > 2 {
                index = 2;
            }
        }
        let consumed = if index > 0 { 2 } else { 1 };
        result.push(forms[index]);
        if consumed != 1 {
            source_map.replace(out_length, consumed, 1);
        }
        out_length += 1;
        i += consumed;
    }
    result
}

/// Composes combining voiced and semi-voiced sound marks (U+3099, U+309A)
/// with the preceding kana.
pub fn normalize_combining_characters(text: &str, source_map: &mut TextSourceMap) -> String {
    let mut result = String::new();
    let mut out_length = 0;
    for c in text.chars() {
        if matches!(c, '\u{3099}' | '\u{309a}') {
            if let Some(previous) = result.chars().last() {
                if let Some(composed) = unicode_normalization::char::compose(previous, c) {
                    result.pop();
                    result.push(composed);
                    source_map.replace(out_length - 1, 2, 1);
                    continue;
                }
            }
        }
        result.push(c);
        out_length += 1;
    }
    result
}

pub fn is_emphatic_code_point(code_point: u32) -> bool {
    code_point == HIRAGANA_SMALL_TSU_CODE_POINT
        || code_point == KATAKANA_SMALL_TSU_CODE_POINT
        || code_point == KANA_PROLONGED_SOUND_MARK_CODE_POINT
}

/// Collapses runs of repeated emphatic characters (small tsu, prolonged
/// sound mark) between the first and last non-emphatic character. With
/// `full_collapse` the runs are removed outright instead of shortened to a
/// single character.
pub fn collapse_emphatic_sequences(
    text: &str,
    full_collapse: bool,
    source_map: &mut TextSourceMap,
) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut left = 0;
    while left < chars.len() && is_emphatic_code_point(chars[left] as u32) {
        left += 1;
    }
    let mut right = chars.len();
    while right > left && is_emphatic_code_point(chars[right - 1] as u32) {
        right -= 1;
    }
    // entirely emphatic input is left alone
    if left >= right {
        return text.to_string();
    }
    let mut result: String = chars[..left].iter().collect();
    let mut out_length = left;
    let mut i = left;
    while i < right {
        let c = chars[i];
        if is_emphatic_code_point(c as u32) {
            let mut run = 1;
            while i + run < right && chars[i + run] == c {
                run += 1;
            }
            let kept = usize::from(!full_collapse);
            if kept == 1 {
                result.push(c);
            }
            if run != kept {
                source_map.replace(out_length, run, kept);
            }
            out_length += kept;
            i += run;
        } else {
            result.push(c);
            out_length += 1;
            i += 1;
        }
    }
    result.extend(&chars[right..]);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn katakana_to_hiragana() {
        assert_eq!(convert_katakana_to_hiragana("ヨミチャン", false), "よみちゃん");
        assert_eq!(convert_katakana_to_hiragana("スーパー", false), "すうぱあ");
        assert_eq!(convert_katakana_to_hiragana("スーパー", true), "すーぱー");
    }

    #[test]
    fn hiragana_to_katakana() {
        assert_eq!(convert_hiragana_to_katakana("よみちゃん"), "ヨミチャン");
    }

    #[test]
    fn fullwidth_alphanumeric_to_normal() {
        assert_eq!(convert_fullwidth_alphanumeric_to_normal("ＡＢＣ０１２ａｂｃ"), "ABC012abc");
    }

    #[test]
    fn halfwidth_kana_with_voiced_marks() {
        let mut map = TextSourceMap::new("ｶﾞｷﾞﾊﾟﾖ");
        let out = convert_halfwidth_kana_to_fullwidth("ｶﾞｷﾞﾊﾟﾖ", &mut map);
        assert_eq!(out, "ガギパヨ");
        assert_eq!(map.original_length(1), 2);
        assert_eq!(map.original_length(4), 7);
    }

    #[test]
    fn combining_marks_compose() {
        let mut map = TextSourceMap::new("ト\u{3099}");
        let out = normalize_combining_characters("ト\u{3099}", &mut map);
        assert_eq!(out, "ド");
        assert_eq!(map.original_length(1), 2);
    }

    #[test]
    fn emphatic_collapse() {
        let mut map = TextSourceMap::new("すっっごーーい");
        let out = collapse_emphatic_sequences("すっっごーーい", false, &mut map);
        assert_eq!(out, "すっごーい");
        assert_eq!(map.original_length(out.chars().count()), 7);

        let mut map = TextSourceMap::new("すっっごーーい");
        let out = collapse_emphatic_sequences("すっっごーーい", true, &mut map);
        assert_eq!(out, "すごい");
        assert_eq!(map.original_length(out.chars().count()), 7);

        // leading and trailing emphatics are untouched
        let mut map = TextSourceMap::new("っっとーー");
        let out = collapse_emphatic_sequences("っっとーー", false, &mut map);
        assert_eq!(out, "っっとーー");
    }
}
