use std::sync::LazyLock;

use crate::language::deinflector::{rule_flags, DeinflectionRule};

const V1: u32 = rule_flags::ICHIDAN;
const V5: u32 = rule_flags::GODAN;
const VS: u32 = rule_flags::SURU;
const VK: u32 = rule_flags::KURU;
const ADJ: u32 = rule_flags::ADJ_I;
const IRU: u32 = rule_flags::IRU;
const VERB: u32 = V1 | V5 | VS | VK;

const fn rule(
    name: &'static str,
    suffix_in: &'static str,
    suffix_out: &'static str,
    rules_in: u32,
    rules_out: u32,
) -> DeinflectionRule {
    DeinflectionRule {
        name,
        rules_in,
        rules_out,
        suffix_in,
        suffix_out,
    }
}

/// The Japanese deinflection table. Suffix rewrites reverse one inflection
/// each; rule masks keep chains morphologically coherent (a candidate that
/// came out of a godan rewrite only feeds rules expecting a godan form).
pub static JAPANESE_DEINFLECTION_RULES: LazyLock<Vec<DeinflectionRule>> = LazyLock::new(|| {
    vec![
        // -ba
        rule("-ba", "ければ", "い", 0, ADJ),
        rule("-ba", "えば", "う", 0, V5),
        rule("-ba", "けば", "く", 0, V5),
        rule("-ba", "げば", "ぐ", 0, V5),
        rule("-ba", "せば", "す", 0, V5),
        rule("-ba", "てば", "つ", 0, V5),
        rule("-ba", "ねば", "ぬ", 0, V5),
        rule("-ba", "べば", "ぶ", 0, V5),
        rule("-ba", "めば", "む", 0, V5),
        rule("-ba", "れば", "る", 0, V1 | V5 | VK | VS),
        // -chau
        rule("-chau", "ちゃう", "る", V5, V1),
        rule("-chau", "いちゃう", "く", V5, V5),
        rule("-chau", "いじゃう", "ぐ", V5, V5),
        rule("-chau", "しちゃう", "す", V5, V5),
        rule("-chau", "っちゃう", "う", V5, V5),
        rule("-chau", "っちゃう", "つ", V5, V5),
        rule("-chau", "っちゃう", "る", V5, V5),
        rule("-chau", "んじゃう", "ぬ", V5, V5),
        rule("-chau", "んじゃう", "ぶ", V5, V5),
        rule("-chau", "んじゃう", "む", V5, V5),
        rule("-chau", "しちゃう", "する", V5, VS),
        rule("-chau", "きちゃう", "くる", V5, VK),
        // -shimau
        rule("-shimau", "てしまう", "て", V5, IRU),
        rule("-shimau", "でしまう", "で", V5, IRU),
        // -nasai
        rule("-nasai", "なさい", "る", 0, V1),
        rule("-nasai", "いなさい", "う", 0, V5),
        rule("-nasai", "きなさい", "く", 0, V5),
        rule("-nasai", "ぎなさい", "ぐ", 0, V5),
        rule("-nasai", "しなさい", "す", 0, V5),
        rule("-nasai", "ちなさい", "つ", 0, V5),
        rule("-nasai", "になさい", "ぬ", 0, V5),
        rule("-nasai", "びなさい", "ぶ", 0, V5),
        rule("-nasai", "みなさい", "む", 0, V5),
        rule("-nasai", "りなさい", "る", 0, V5),
        rule("-nasai", "しなさい", "する", 0, VS),
        rule("-nasai", "きなさい", "くる", 0, VK),
        // -sou
        rule("-sou", "そう", "い", 0, ADJ),
        rule("-sou", "そう", "る", 0, V1),
        rule("-sou", "いそう", "う", 0, V5),
        rule("-sou", "きそう", "く", 0, V5),
        rule("-sou", "ぎそう", "ぐ", 0, V5),
        rule("-sou", "しそう", "す", 0, V5),
        rule("-sou", "ちそう", "つ", 0, V5),
        rule("-sou", "にそう", "ぬ", 0, V5),
        rule("-sou", "びそう", "ぶ", 0, V5),
        rule("-sou", "みそう", "む", 0, V5),
        rule("-sou", "りそう", "る", 0, V5),
        rule("-sou", "しそう", "する", 0, VS),
        rule("-sou", "きそう", "くる", 0, VK),
        // -sugiru
        rule("-sugiru", "すぎる", "い", V1, ADJ),
        rule("-sugiru", "すぎる", "る", V1, V1),
        rule("-sugiru", "いすぎる", "う", V1, V5),
        rule("-sugiru", "きすぎる", "く", V1, V5),
        rule("-sugiru", "ぎすぎる", "ぐ", V1, V5),
        rule("-sugiru", "しすぎる", "す", V1, V5),
        rule("-sugiru", "ちすぎる", "つ", V1, V5),
        rule("-sugiru", "にすぎる", "ぬ", V1, V5),
        rule("-sugiru", "びすぎる", "ぶ", V1, V5),
        rule("-sugiru", "みすぎる", "む", V1, V5),
        rule("-sugiru", "りすぎる", "る", V1, V5),
        rule("-sugiru", "しすぎる", "する", V1, VS),
        rule("-sugiru", "きすぎる", "くる", V1, VK),
        // -tai
        rule("-tai", "たい", "る", ADJ, V1),
        rule("-tai", "いたい", "う", ADJ, V5),
        rule("-tai", "きたい", "く", ADJ, V5),
        rule("-tai", "ぎたい", "ぐ", ADJ, V5),
        rule("-tai", "したい", "す", ADJ, V5),
        rule("-tai", "ちたい", "つ", ADJ, V5),
        rule("-tai", "にたい", "ぬ", ADJ, V5),
        rule("-tai", "びたい", "ぶ", ADJ, V5),
        rule("-tai", "みたい", "む", ADJ, V5),
        rule("-tai", "りたい", "る", ADJ, V5),
        rule("-tai", "したい", "する", ADJ, VS),
        rule("-tai", "きたい", "くる", ADJ, VK),
        // -tara
        rule("-tara", "たら", "る", 0, V1),
        rule("-tara", "いたら", "く", 0, V5),
        rule("-tara", "いだら", "ぐ", 0, V5),
        rule("-tara", "したら", "す", 0, V5),
        rule("-tara", "ったら", "う", 0, V5),
        rule("-tara", "ったら", "つ", 0, V5),
        rule("-tara", "ったら", "る", 0, V5),
        rule("-tara", "んだら", "ぬ", 0, V5),
        rule("-tara", "んだら", "ぶ", 0, V5),
        rule("-tara", "んだら", "む", 0, V5),
        rule("-tara", "かったら", "い", 0, ADJ),
        rule("-tara", "したら", "する", 0, VS),
        rule("-tara", "きたら", "くる", 0, VK),
        // -tari
        rule("-tari", "たり", "る", 0, V1),
        rule("-tari", "いたり", "く", 0, V5),
        rule("-tari", "いだり", "ぐ", 0, V5),
        rule("-tari", "したり", "す", 0, V5),
        rule("-tari", "ったり", "う", 0, V5),
        rule("-tari", "ったり", "つ", 0, V5),
        rule("-tari", "ったり", "る", 0, V5),
        rule("-tari", "んだり", "ぬ", 0, V5),
        rule("-tari", "んだり", "ぶ", 0, V5),
        rule("-tari", "んだり", "む", 0, V5),
        rule("-tari", "かったり", "い", 0, ADJ),
        rule("-tari", "したり", "する", 0, VS),
        rule("-tari", "きたり", "くる", 0, VK),
        // -te
        rule("-te", "くて", "い", IRU, ADJ),
        rule("-te", "て", "る", IRU, V1),
        rule("-te", "いて", "く", IRU, V5),
        rule("-te", "いで", "ぐ", IRU, V5),
        rule("-te", "して", "す", IRU, V5),
        rule("-te", "って", "う", IRU, V5),
        rule("-te", "って", "つ", IRU, V5),
        rule("-te", "って", "る", IRU, V5),
        rule("-te", "んで", "ぬ", IRU, V5),
        rule("-te", "んで", "ぶ", IRU, V5),
        rule("-te", "んで", "む", IRU, V5),
        rule("-te", "して", "する", IRU, VS),
        rule("-te", "きて", "くる", IRU, VK),
        // -zu
        rule("-zu", "ず", "る", 0, V1),
        rule("-zu", "かず", "く", 0, V5),
        rule("-zu", "がず", "ぐ", 0, V5),
        rule("-zu", "さず", "す", 0, V5),
        rule("-zu", "たず", "つ", 0, V5),
        rule("-zu", "なず", "ぬ", 0, V5),
        rule("-zu", "ばず", "ぶ", 0, V5),
        rule("-zu", "まず", "む", 0, V5),
        rule("-zu", "らず", "る", 0, V5),
        rule("-zu", "わず", "う", 0, V5),
        rule("-zu", "せず", "する", 0, VS),
        rule("-zu", "こず", "くる", 0, VK),
        // -nu
        rule("-nu", "ぬ", "る", 0, V1),
        rule("-nu", "かぬ", "く", 0, V5),
        rule("-nu", "がぬ", "ぐ", 0, V5),
        rule("-nu", "さぬ", "す", 0, V5),
        rule("-nu", "たぬ", "つ", 0, V5),
        rule("-nu", "なぬ", "ぬ", 0, V5),
        rule("-nu", "ばぬ", "ぶ", 0, V5),
        rule("-nu", "まぬ", "む", 0, V5),
        rule("-nu", "らぬ", "る", 0, V5),
        rule("-nu", "わぬ", "う", 0, V5),
        rule("-nu", "せぬ", "する", 0, VS),
        rule("-nu", "こぬ", "くる", 0, VK),
        // adv
        rule("adv", "く", "い", 0, ADJ),
        // causative
        rule("causative", "させる", "る", V1, V1),
        rule("causative", "かせる", "く", V1, V5),
        rule("causative", "がせる", "ぐ", V1, V5),
        rule("causative", "させる", "す", V1, V5),
        rule("causative", "たせる", "つ", V1, V5),
        rule("causative", "なせる", "ぬ", V1, V5),
        rule("causative", "ばせる", "ぶ", V1, V5),
        rule("causative", "ませる", "む", V1, V5),
        rule("causative", "らせる", "る", V1, V5),
        rule("causative", "わせる", "う", V1, V5),
        rule("causative", "させる", "する", V1, VS),
        rule("causative", "こさせる", "くる", V1, VK),
        // imperative
        rule("imperative", "ろ", "る", 0, V1),
        rule("imperative", "よ", "る", 0, V1),
        rule("imperative", "え", "う", 0, V5),
        rule("imperative", "け", "く", 0, V5),
        rule("imperative", "げ", "ぐ", 0, V5),
        rule("imperative", "せ", "す", 0, V5),
        rule("imperative", "て", "つ", 0, V5),
        rule("imperative", "ね", "ぬ", 0, V5),
        rule("imperative", "べ", "ぶ", 0, V5),
        rule("imperative", "め", "む", 0, V5),
        rule("imperative", "れ", "る", 0, V5),
        rule("imperative", "しろ", "する", 0, VS),
        rule("imperative", "せよ", "する", 0, VS),
        rule("imperative", "こい", "くる", 0, VK),
        // imperative negative
        rule("imperative negative", "な", "る", 0, VERB),
        // masu stem
        rule("masu stem", "い", "いる", 0, V1),
        rule("masu stem", "き", "きる", 0, V1),
        rule("masu stem", "ぎ", "ぎる", 0, V1),
        rule("masu stem", "じ", "じる", 0, V1),
        rule("masu stem", "ち", "ちる", 0, V1),
        rule("masu stem", "に", "にる", 0, V1),
        rule("masu stem", "び", "びる", 0, V1),
        rule("masu stem", "み", "みる", 0, V1),
        rule("masu stem", "り", "りる", 0, V1),
        rule("masu stem", "え", "える", 0, V1),
        rule("masu stem", "け", "ける", 0, V1),
        rule("masu stem", "げ", "げる", 0, V1),
        rule("masu stem", "せ", "せる", 0, V1),
        rule("masu stem", "て", "てる", 0, V1),
        rule("masu stem", "ね", "ねる", 0, V1),
        rule("masu stem", "べ", "べる", 0, V1),
        rule("masu stem", "め", "める", 0, V1),
        rule("masu stem", "れ", "れる", 0, V1),
        rule("masu stem", "い", "う", 0, V5),
        rule("masu stem", "き", "く", 0, V5),
        rule("masu stem", "ぎ", "ぐ", 0, V5),
        rule("masu stem", "し", "す", 0, V5),
        rule("masu stem", "ち", "つ", 0, V5),
        rule("masu stem", "に", "ぬ", 0, V5),
        rule("masu stem", "び", "ぶ", 0, V5),
        rule("masu stem", "み", "む", 0, V5),
        rule("masu stem", "り", "る", 0, V5),
        rule("masu stem", "き", "くる", 0, VK),
        // negative
        rule("negative", "ない", "る", ADJ, V1),
        rule("negative", "かない", "く", ADJ, V5),
        rule("negative", "がない", "ぐ", ADJ, V5),
        rule("negative", "さない", "す", ADJ, V5),
        rule("negative", "たない", "つ", ADJ, V5),
        rule("negative", "なない", "ぬ", ADJ, V5),
        rule("negative", "ばない", "ぶ", ADJ, V5),
        rule("negative", "まない", "む", ADJ, V5),
        rule("negative", "らない", "る", ADJ, V5),
        rule("negative", "わない", "う", ADJ, V5),
        rule("negative", "くない", "い", ADJ, ADJ),
        rule("negative", "しない", "する", ADJ, VS),
        rule("negative", "こない", "くる", ADJ, VK),
        // noun
        rule("noun", "さ", "い", 0, ADJ),
        // passive
        rule("passive", "かれる", "く", V1, V5),
        rule("passive", "がれる", "ぐ", V1, V5),
        rule("passive", "される", "す", V1, V5),
        rule("passive", "たれる", "つ", V1, V5),
        rule("passive", "なれる", "ぬ", V1, V5),
        rule("passive", "ばれる", "ぶ", V1, V5),
        rule("passive", "まれる", "む", V1, V5),
        rule("passive", "られる", "る", V1, V5),
        rule("passive", "われる", "う", V1, V5),
        rule("passive", "される", "する", V1, VS),
        // past
        rule("past", "た", "る", 0, V1),
        rule("past", "いた", "く", 0, V5),
        rule("past", "いだ", "ぐ", 0, V5),
        rule("past", "した", "す", 0, V5),
        rule("past", "った", "う", 0, V5),
        rule("past", "った", "つ", 0, V5),
        rule("past", "った", "る", 0, V5),
        rule("past", "んだ", "ぬ", 0, V5),
        rule("past", "んだ", "ぶ", 0, V5),
        rule("past", "んだ", "む", 0, V5),
        rule("past", "かった", "い", 0, ADJ),
        rule("past", "した", "する", 0, VS),
        rule("past", "きた", "くる", 0, VK),
        // polite
        rule("polite", "ます", "る", 0, V1),
        rule("polite", "います", "う", 0, V5),
        rule("polite", "きます", "く", 0, V5),
        rule("polite", "ぎます", "ぐ", 0, V5),
        rule("polite", "します", "す", 0, V5),
        rule("polite", "ちます", "つ", 0, V5),
        rule("polite", "にます", "ぬ", 0, V5),
        rule("polite", "びます", "ぶ", 0, V5),
        rule("polite", "みます", "む", 0, V5),
        rule("polite", "ります", "る", 0, V5),
        rule("polite", "します", "する", 0, VS),
        rule("polite", "きます", "くる", 0, VK),
        // polite negative
        rule("polite negative", "ません", "る", 0, V1),
        rule("polite negative", "いません", "う", 0, V5),
        rule("polite negative", "きません", "く", 0, V5),
        rule("polite negative", "ぎません", "ぐ", 0, V5),
        rule("polite negative", "しません", "す", 0, V5),
        rule("polite negative", "ちません", "つ", 0, V5),
        rule("polite negative", "にません", "ぬ", 0, V5),
        rule("polite negative", "びません", "ぶ", 0, V5),
        rule("polite negative", "みません", "む", 0, V5),
        rule("polite negative", "りません", "る", 0, V5),
        rule("polite negative", "くありません", "い", 0, ADJ),
        rule("polite negative", "しません", "する", 0, VS),
        rule("polite negative", "きません", "くる", 0, VK),
        // polite past
        rule("polite past", "ました", "る", 0, V1),
        rule("polite past", "いました", "う", 0, V5),
        rule("polite past", "きました", "く", 0, V5),
        rule("polite past", "ぎました", "ぐ", 0, V5),
        rule("polite past", "しました", "す", 0, V5),
        rule("polite past", "ちました", "つ", 0, V5),
        rule("polite past", "にました", "ぬ", 0, V5),
        rule("polite past", "びました", "ぶ", 0, V5),
        rule("polite past", "みました", "む", 0, V5),
        rule("polite past", "りました", "る", 0, V5),
        rule("polite past", "しました", "する", 0, VS),
        rule("polite past", "きました", "くる", 0, VK),
        // polite past negative
        rule("polite past negative", "ませんでした", "る", 0, V1),
        rule("polite past negative", "いませんでした", "う", 0, V5),
        rule("polite past negative", "きませんでした", "く", 0, V5),
        rule("polite past negative", "ぎませんでした", "ぐ", 0, V5),
        rule("polite past negative", "しませんでした", "す", 0, V5),
        rule("polite past negative", "ちませんでした", "つ", 0, V5),
        rule("polite past negative", "にませんでした", "ぬ", 0, V5),
        rule("polite past negative", "びませんでした", "ぶ", 0, V5),
        rule("polite past negative", "みませんでした", "む", 0, V5),
        rule("polite past negative", "りませんでした", "る", 0, V5),
        rule("polite past negative", "くありませんでした", "い", 0, ADJ),
        rule("polite past negative", "しませんでした", "する", 0, VS),
        rule("polite past negative", "きませんでした", "くる", 0, VK),
        // polite volitional
        rule("polite volitional", "ましょう", "る", 0, V1),
        rule("polite volitional", "いましょう", "う", 0, V5),
        rule("polite volitional", "きましょう", "く", 0, V5),
        rule("polite volitional", "ぎましょう", "ぐ", 0, V5),
        rule("polite volitional", "しましょう", "す", 0, V5),
        rule("polite volitional", "ちましょう", "つ", 0, V5),
        rule("polite volitional", "にましょう", "ぬ", 0, V5),
        rule("polite volitional", "びましょう", "ぶ", 0, V5),
        rule("polite volitional", "みましょう", "む", 0, V5),
        rule("polite volitional", "りましょう", "る", 0, V5),
        rule("polite volitional", "しましょう", "する", 0, VS),
        rule("polite volitional", "きましょう", "くる", 0, VK),
        // potential
        rule("potential", "れる", "る", V1, V1 | V5),
        rule("potential", "える", "う", V1, V5),
        rule("potential", "ける", "く", V1, V5),
        rule("potential", "げる", "ぐ", V1, V5),
        rule("potential", "せる", "す", V1, V5),
        rule("potential", "てる", "つ", V1, V5),
        rule("potential", "ねる", "ぬ", V1, V5),
        rule("potential", "べる", "ぶ", V1, V5),
        rule("potential", "める", "む", V1, V5),
        rule("potential", "できる", "する", V1, VS),
        rule("potential", "出来る", "する", V1, VS),
        rule("potential", "こられる", "くる", V1, VK),
        // potential or passive
        rule("potential or passive", "られる", "る", V1, V1),
        // progressive or perfect
        rule("progressive or perfect", "ている", "て", V1, IRU),
        rule("progressive or perfect", "ておる", "て", V5, IRU),
        rule("progressive or perfect", "てる", "て", V1, IRU),
        rule("progressive or perfect", "でいる", "で", V1, IRU),
        rule("progressive or perfect", "でおる", "で", V5, IRU),
        rule("progressive or perfect", "でる", "で", V1, IRU),
        rule("progressive or perfect", "とる", "て", V5, IRU),
        rule("progressive or perfect", "ないでいる", "ない", V1, ADJ),
        // -toku
        rule("-toku", "とく", "る", V5, V1),
        rule("-toku", "いとく", "く", V5, V5),
        rule("-toku", "いどく", "ぐ", V5, V5),
        rule("-toku", "しとく", "す", V5, V5),
        rule("-toku", "っとく", "う", V5, V5),
        rule("-toku", "っとく", "つ", V5, V5),
        rule("-toku", "っとく", "る", V5, V5),
        rule("-toku", "んどく", "ぬ", V5, V5),
        rule("-toku", "んどく", "ぶ", V5, V5),
        rule("-toku", "んどく", "む", V5, V5),
        rule("-toku", "しとく", "する", V5, VS),
        rule("-toku", "きとく", "くる", V5, VK),
        // volitional
        rule("volitional", "よう", "る", 0, V1),
        rule("volitional", "おう", "う", 0, V5),
        rule("volitional", "こう", "く", 0, V5),
        rule("volitional", "ごう", "ぐ", 0, V5),
        rule("volitional", "そう", "す", 0, V5),
        rule("volitional", "とう", "つ", 0, V5),
        rule("volitional", "のう", "ぬ", 0, V5),
        rule("volitional", "ぼう", "ぶ", 0, V5),
        rule("volitional", "もう", "む", 0, V5),
        rule("volitional", "ろう", "る", 0, V5),
        rule("volitional", "しよう", "する", 0, VS),
        rule("volitional", "こよう", "くる", 0, VK),
        // -zaru
        rule("-zaru", "ざる", "る", 0, V1),
        rule("-zaru", "かざる", "く", 0, V5),
        rule("-zaru", "がざる", "ぐ", 0, V5),
        rule("-zaru", "さざる", "す", 0, V5),
        rule("-zaru", "たざる", "つ", 0, V5),
        rule("-zaru", "なざる", "ぬ", 0, V5),
        rule("-zaru", "ばざる", "ぶ", 0, V5),
        rule("-zaru", "まざる", "む", 0, V5),
        rule("-zaru", "らざる", "る", 0, V5),
        rule("-zaru", "わざる", "う", 0, V5),
        rule("-zaru", "せざる", "する", 0, VS),
        rule("-zaru", "こざる", "くる", 0, VK),
        // -neba
        rule("-neba", "ねば", "る", 0, V1),
        rule("-neba", "かねば", "く", 0, V5),
        rule("-neba", "がねば", "ぐ", 0, V5),
        rule("-neba", "さねば", "す", 0, V5),
        rule("-neba", "たねば", "つ", 0, V5),
        rule("-neba", "なねば", "ぬ", 0, V5),
        rule("-neba", "ばねば", "ぶ", 0, V5),
        rule("-neba", "まねば", "む", 0, V5),
        rule("-neba", "らねば", "る", 0, V5),
        rule("-neba", "わねば", "う", 0, V5),
        rule("-neba", "せねば", "する", 0, VS),
        rule("-neba", "こねば", "くる", 0, VK),
    ]
});
