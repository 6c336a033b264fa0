use crate::models::rule::{RuleName, RuleValue, ToxicityTolerance};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid digit pattern"));

/// Plain-text rendering of a loose JSON value (`null` renders empty)
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Upper-case the first character, lower-case the rest
pub fn capitalize(text: &str) -> String {
    let mut chars = text.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// First run of digits in the value; 0 when there is none
pub fn first_integer(value: &Value) -> u64 {
    if is_empty_value(value) {
        return 0;
    }
    let text = value_to_string(value);
    DIGITS
        .find(&text)
        .map(|m| m.as_str().parse::<u64>().unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Map free text such as "no toxicity" or "High" onto a tolerance
pub fn toxicity_tolerance(value: &Value) -> ToxicityTolerance {
    let text = value_to_string(value).to_lowercase();
    if text.contains("no") || text.contains("low") {
        ToxicityTolerance::Low
    } else if text.contains("medium") {
        ToxicityTolerance::Medium
    } else if text.contains("high") {
        ToxicityTolerance::High
    } else {
        ToxicityTolerance::Low
    }
}

/// Keyword list from a JSON array or a comma-separated string
pub fn keyword_list(value: &Value) -> Vec<String> {
    let raw: Vec<String> = match value {
        Value::Array(items) => items.iter().map(value_to_string).collect(),
        other => value_to_string(other)
            .split(',')
            .map(str::to_string)
            .collect(),
    };
    raw.into_iter()
        .map(|keyword| keyword.trim().to_lowercase())
        .filter(|keyword| !keyword.is_empty())
        .collect()
}

/// Weight as a non-negative float; missing, non-numeric or non-positive is 0.0
pub fn coerce_weight(value: &Value) -> f64 {
    let weight = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        0.0
    }
}

/// Coerce a loose value into the type the rule declares
pub fn coerce_value(name: RuleName, value: &Value) -> RuleValue {
    match name {
        RuleName::Language | RuleName::ExcludedLanguage => {
            RuleValue::Text(capitalize(&value_to_string(value)))
        }
        RuleName::MinLength | RuleName::MaxLength => RuleValue::Count(first_integer(value)),
        RuleName::Toxicity => RuleValue::Text(toxicity_tolerance(value).as_str().to_string()),
        RuleName::ProhibitedKeywords => RuleValue::Keywords(keyword_list(value)),
    }
}
