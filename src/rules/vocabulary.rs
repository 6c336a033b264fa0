//! Rule name synonyms and language name lookup

use crate::models::rule::RuleName;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Loose rule names accepted from extraction oracles, keyed lower-case
static SYNONYMS: Lazy<HashMap<&'static str, RuleName>> = Lazy::new(|| {
    let mut map: HashMap<&'static str, RuleName> = RuleName::ALL
        .into_iter()
        .map(|name| (name.as_str(), name))
        .collect();

    map.extend([
        ("english text", RuleName::Language),
        ("lang", RuleName::Language),
        ("disallowed_language", RuleName::ExcludedLanguage),
        ("wordcount", RuleName::MinLength),
        ("word count", RuleName::MinLength),
        ("min_words", RuleName::MinLength),
        ("length", RuleName::MinLength),
        ("max_words", RuleName::MaxLength),
        ("toxic", RuleName::Toxicity),
        ("banned_keywords", RuleName::ProhibitedKeywords),
        ("banned words", RuleName::ProhibitedKeywords),
    ]);
    map
});

/// ISO 639-1 codes for language names the detectors report
static LANGUAGE_CODES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("english", "en"),
        ("french", "fr"),
        ("spanish", "es"),
        ("german", "de"),
        ("italian", "it"),
        ("portuguese", "pt"),
        ("dutch", "nl"),
        ("russian", "ru"),
        ("chinese", "zh"),
        ("japanese", "ja"),
        ("korean", "ko"),
        ("arabic", "ar"),
        ("hindi", "hi"),
        ("turkish", "tr"),
        ("polish", "pl"),
        ("swedish", "sv"),
        ("greek", "el"),
        ("vietnamese", "vi"),
        ("thai", "th"),
        ("bulgarian", "bg"),
        ("swahili", "sw"),
        ("urdu", "ur"),
    ])
});

/// Resolve a loose rule name (already trimmed and lower-cased)
pub fn resolve_rule_name(name: &str) -> Option<RuleName> {
    SYNONYMS.get(name).copied()
}

/// Expected detector code for a language rule value.
///
/// Two-letter values are taken as codes; known names map through the table;
/// anything else is compared lower-cased as-is.
pub fn language_code(value: &str) -> String {
    let lowered = value.trim().to_lowercase();
    if lowered.len() == 2 && lowered.chars().all(|c| c.is_ascii_alphabetic()) {
        return lowered;
    }
    LANGUAGE_CODES
        .get(lowered.as_str())
        .map(|code| code.to_string())
        .unwrap_or(lowered)
}

/// Reduce a detector label such as `en-US` or `EN` to its bare code
pub fn detected_code(label: &str) -> String {
    let lowered = label.trim().to_lowercase();
    lowered
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_string()
}
