pub mod normalizer;
pub mod parser;
pub mod vocabulary;

pub use normalizer::RuleNormalizer;
pub use parser::*;
pub use vocabulary::{detected_code, language_code, resolve_rule_name};
