use indexmap::IndexSet;

/// Bit layout of the grammatical rule vocabulary, shared by the deinflector
/// and by word classes on database entries.
pub mod rule_flags {
    /// v1: ichidan verb
    pub const ICHIDAN: u32 = 1 << 0;
    /// v5: godan verb
    pub const GODAN: u32 = 1 << 1;
    /// vs: suru verb
    pub const SURU: u32 = 1 << 2;
    /// vk: kuru verb
    pub const KURU: u32 = 1 << 3;
    /// adj-i: i-adjective
    pub const ADJ_I: u32 = 1 << 4;
    /// auxiliary class produced by progressive/perfect contractions
    pub const IRU: u32 = 1 << 5;
}

/// Converts the space-separated rule identifiers carried by dictionary
/// entries into a rule mask. Unknown identifiers are ignored.
pub fn rule_flags_from_word_classes<T: AsRef<str>>(word_classes: &[T]) -> u32 {
    let mut flags = 0;
    for word_class in word_classes {
        flags |= match word_class.as_ref() {
            "v1" => rule_flags::ICHIDAN,
            "v5" => rule_flags::GODAN,
            "vs" => rule_flags::SURU,
            "vk" => rule_flags::KURU,
            "adj-i" => rule_flags::ADJ_I,
            _ => 0,
        };
    }
    flags
}

/// Whether a deinflected candidate is morphologically compatible with an
/// entry's word classes. An unconstrained candidate fits everything.
pub fn rules_fit(candidate_rules: u32, entry_rules: u32) -> bool {
    candidate_rules == 0 || (candidate_rules & entry_rules) != 0
}

/// A single suffix rewrite. `suffix_in` is matched against the end of the
/// surface form and replaced by `suffix_out`; `rules_in` gates which
/// candidates the rule may extend and `rules_out` classifies the result.
#[derive(Clone, Copy, Debug)]
pub struct DeinflectionRule {
    pub name: &'static str,
    pub rules_in: u32,
    pub rules_out: u32,
    pub suffix_in: &'static str,
    pub suffix_out: &'static str,
}

/// A candidate lemma together with the chain of rule names that was unwound
/// to reach it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deinflection {
    pub term: String,
    pub rules: u32,
    pub reasons: Vec<&'static str>,
}

/// Breadth-first suffix rewriter over a static rule table.
#[derive(Clone, Copy, Debug)]
pub struct Deinflector {
    rules: &'static [DeinflectionRule],
}

impl Deinflector {
    pub fn new(rules: &'static [DeinflectionRule]) -> Self {
        Self { rules }
    }

    /// Produces every candidate lemma reachable from `source`, the unchanged
    /// source first. Duplicate `(term, rules)` pairs are pruned, which
    /// together with the shrinking suffix space bounds the search.
    pub fn deinflect(&self, source: &str) -> Vec<Deinflection> {
        let mut results = vec![Deinflection {
            term: source.to_string(),
            rules: 0,
            reasons: Vec::new(),
        }];
        let mut seen: IndexSet<(String, u32)> = IndexSet::new();
        seen.insert((source.to_string(), 0));
        let mut i = 0;
        while i < results.len() {
            let Deinflection {
                term,
                rules,
                reasons,
            } = results[i].clone();
            for rule in self.rules {
                if !(rule.rules_in == 0 || rules == 0 || (rules & rule.rules_in) != 0) {
                    continue;
                }
                let Some(stem) = term.strip_suffix(rule.suffix_in) else {
                    continue;
                };
                if stem.is_empty() && rule.suffix_out.is_empty() {
                    continue;
                }
                let candidate = format!("{}{}", stem, rule.suffix_out);
                if !seen.insert((candidate.clone(), rule.rules_out)) {
                    continue;
                }
                let mut chain = reasons.clone();
                chain.push(rule.name);
                results.push(Deinflection {
                    term: candidate,
                    rules: rule.rules_out,
                    reasons: chain,
                });
            }
            i += 1;
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::ja::deinflect::JAPANESE_DEINFLECTION_RULES;
    use pretty_assertions::assert_eq;

    fn deinflector() -> Deinflector {
        Deinflector::new(JAPANESE_DEINFLECTION_RULES.as_slice())
    }

    fn find<'a>(results: &'a [Deinflection], term: &str) -> Vec<&'a Deinflection> {
        results.iter().filter(|d| d.term == term).collect()
    }

    #[test]
    fn source_is_emitted_unchanged_first() {
        let results = deinflector().deinflect("食べた");
        assert_eq!(results[0].term, "食べた");
        assert_eq!(results[0].rules, 0);
        assert!(results[0].reasons.is_empty());
    }

    #[test]
    fn past_tense_ichidan() {
        let results = deinflector().deinflect("食べた");
        let candidates = find(&results, "食べる");
        assert!(candidates
            .iter()
            .any(|d| d.reasons == ["past"] && d.rules == rule_flags::ICHIDAN));
    }

    #[test]
    fn past_tense_godan() {
        let results = deinflector().deinflect("書いた");
        assert!(find(&results, "書く")
            .iter()
            .any(|d| d.reasons == ["past"] && d.rules == rule_flags::GODAN));
    }

    #[test]
    fn chained_rules_accumulate_reasons_in_application_order() {
        // 食べさせられた: causative + passive + past
        let results = deinflector().deinflect("食べさせられた");
        assert!(find(&results, "食べる")
            .iter()
            .any(|d| d.reasons == ["past", "potential or passive", "causative"]));
    }

    #[test]
    fn progressive_contraction() {
        let results = deinflector().deinflect("食べてる");
        assert!(find(&results, "食べる")
            .iter()
            .any(|d| d.reasons.contains(&"-te") && d.rules == rule_flags::ICHIDAN));
    }

    #[test]
    fn adjective_negative_past() {
        let results = deinflector().deinflect("高くなかった");
        assert!(find(&results, "高い")
            .iter()
            .any(|d| d.reasons == ["past", "negative"] && d.rules == rule_flags::ADJ_I));
    }

    #[test]
    fn polite_form() {
        let results = deinflector().deinflect("行きます");
        assert!(find(&results, "行く")
            .iter()
            .any(|d| d.reasons == ["polite"] && d.rules == rule_flags::GODAN));
    }

    #[test]
    fn suru_and_kuru() {
        let results = deinflector().deinflect("勉強した");
        assert!(find(&results, "勉強する")
            .iter()
            .any(|d| d.reasons == ["past"] && d.rules == rule_flags::SURU));
        let results = deinflector().deinflect("きた");
        assert!(find(&results, "くる")
            .iter()
            .any(|d| d.reasons == ["past"] && d.rules == rule_flags::KURU));
    }

    #[test]
    fn duplicate_candidates_are_pruned() {
        let results = deinflector().deinflect("した");
        let suru: Vec<_> = results
            .iter()
            .filter(|d| d.term == "する" && d.rules == rule_flags::SURU)
            .collect();
        assert_eq!(suru.len(), 1);
    }

    #[test]
    fn rules_fit_semantics() {
        assert!(rules_fit(0, rule_flags::ICHIDAN));
        assert!(rules_fit(rule_flags::ICHIDAN, rule_flags::ICHIDAN));
        assert!(!rules_fit(rule_flags::GODAN, rule_flags::ICHIDAN));
        assert!(rules_fit(
            rule_flags::GODAN | rule_flags::ICHIDAN,
            rule_flags::ICHIDAN
        ));
    }
}
