//! Rule normalization onto the fixed vocabulary

use crate::evaluation::scoring::round2;
use crate::models::rule::{RawRule, Rule, RuleName};
use crate::oracles::{NormalizationOracle, OracleGuard, RULE_NORMALIZER};
use crate::rules::parser::{coerce_value, coerce_weight, value_to_string};
use crate::rules::vocabulary::resolve_rule_name;
use std::sync::Arc;
use tracing::{debug, warn};

/// Turns loosely-specified rules into a weighted, typed rule set.
///
/// Names that cannot be mapped onto the vocabulary are dropped, not
/// defaulted: a rule the evaluator cannot check is lost here on purpose.
pub struct RuleNormalizer {
    oracle: Option<Arc<dyn NormalizationOracle>>,
    guard: OracleGuard,
}

impl RuleNormalizer {
    /// Deterministic normalizer without an oracle pass
    pub fn new() -> Self {
        Self {
            oracle: None,
            guard: OracleGuard::default(),
        }
    }

    /// Normalizer that asks `oracle` first and falls back to the local mapping
    pub fn with_oracle(oracle: Arc<dyn NormalizationOracle>, guard: OracleGuard) -> Self {
        Self {
            oracle: Some(oracle),
            guard,
        }
    }

    /// Normalize rules, never failing
    pub async fn normalize(&self, rules: &[RawRule]) -> Vec<Rule> {
        if rules.is_empty() {
            return Vec::new();
        }

        if let Some(oracle) = &self.oracle {
            let mapped = self
                .guard
                .call(RULE_NORMALIZER, || oracle.normalize(rules))
                .await;
            match mapped {
                Ok(candidates) => match Self::accept_oracle_rules(&candidates) {
                    Some(normalized) => return normalized,
                    None => warn!(
                        returned = candidates.len(),
                        "Normalization oracle output unusable, falling back to local mapping"
                    ),
                },
                Err(err) => warn!(
                    error = %err,
                    "Normalization oracle failed, falling back to local mapping"
                ),
            }
        }

        Self::normalize_locally(rules)
    }

    /// Synonym-table mapping, value coercion and weight renormalization
    pub fn normalize_locally(rules: &[RawRule]) -> Vec<Rule> {
        let kept: Vec<Rule> = rules
            .iter()
            .filter_map(|raw| {
                let name = value_to_string(&raw.name).trim().to_lowercase();
                match resolve_rule_name(&name) {
                    Some(rule_name) => Some(Self::coerce(rule_name, raw)),
                    None => {
                        debug!(rule = %name, "Dropping rule outside the vocabulary");
                        None
                    }
                }
            })
            .collect();

        Self::renormalize(kept)
    }

    /// Oracle output is trusted only if every name is an exact vocabulary name
    fn accept_oracle_rules(candidates: &[RawRule]) -> Option<Vec<Rule>> {
        if candidates.is_empty() {
            return None;
        }
        let rules = candidates
            .iter()
            .map(|raw| {
                let name: RuleName = raw.name.as_str()?.trim().parse().ok()?;
                Some(Self::coerce(name, raw))
            })
            .collect::<Option<Vec<Rule>>>()?;
        Some(Self::renormalize(rules))
    }

    fn coerce(name: RuleName, raw: &RawRule) -> Rule {
        Rule::new(name, coerce_value(name, &raw.value), coerce_weight(&raw.weight))
    }

    /// Rescale weights to sum to 1 (2-decimal rounding).
    ///
    /// All-zero weights become an equal split.
    pub fn renormalize(mut rules: Vec<Rule>) -> Vec<Rule> {
        if rules.is_empty() {
            return rules;
        }

        let total: f64 = rules.iter().map(|rule| rule.weight).sum();
        if total <= 0.0 {
            let equal = round2(1.0 / rules.len() as f64);
            for rule in &mut rules {
                rule.weight = equal;
            }
        } else {
            for rule in &mut rules {
                rule.weight = round2(rule.weight / total);
            }
        }
        rules
    }
}

impl Default for RuleNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
