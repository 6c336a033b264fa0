use praxis::evaluation::ScoreFuser;
use praxis::models::{FusionPolicy, LabelScores, QualityLabel, RuleEvaluationResult};

fn rule_result(score: f64) -> RuleEvaluationResult {
    RuleEvaluationResult {
        weighted_score: score,
        ..RuleEvaluationResult::empty()
    }
}

fn ml(scores: &[(&str, f64)]) -> LabelScores {
    scores
        .iter()
        .map(|(label, score)| (label.to_string(), *score))
        .collect()
}

fn labels(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("label-{i}")).collect()
}

#[test]
fn equal_weight_averages_rule_and_model_scores() {
    let fused = ScoreFuser::default().fuse(
        rule_result(1.0),
        ml(&[("toxic", 0.2), ("english", 0.6)]),
        &labels(2),
    );
    assert_eq!(fused.combined_score, 0.7);
    assert_eq!(fused.label, QualityLabel::Medium);
    assert!(fused.weights.is_none());
}

#[test]
fn missing_model_scores_count_as_zero() {
    let fused = ScoreFuser::default().fuse(rule_result(0.8), LabelScores::new(), &[]);
    assert_eq!(fused.combined_score, 0.4);
    assert_eq!(fused.label, QualityLabel::Low);
}

#[test]
fn dynamic_weights_for_five_labels() {
    let weights = ScoreFuser::dynamic_weights(5);
    assert_eq!(weights.rule_weight, 0.55);
    assert_eq!(weights.ml_weight, 0.45);

    let fused = ScoreFuser::new(FusionPolicy::DynamicWeight).fuse(
        rule_result(1.0),
        ml(&[("a", 0.0)]),
        &labels(5),
    );
    assert_eq!(fused.combined_score, 0.55);
    assert_eq!(fused.weights, Some(weights));
}

#[test]
fn combined_score_is_clamped() {
    let fused = ScoreFuser::default().fuse(rule_result(1.0), ml(&[("a", 7.0)]), &labels(1));
    assert_eq!(fused.combined_score, 1.0);
    assert_eq!(fused.label, QualityLabel::High);

    let fused = ScoreFuser::default().fuse(rule_result(f64::NAN), ml(&[("a", 0.5)]), &labels(1));
    assert_eq!(fused.combined_score, 0.0);
    assert_eq!(fused.label, QualityLabel::VeryLow);
}

#[test]
fn label_buckets_cover_unit_interval() {
    assert_eq!(QualityLabel::from_score(0.0), QualityLabel::VeryLow);
    assert_eq!(QualityLabel::from_score(0.25), QualityLabel::VeryLow);
    assert_eq!(QualityLabel::from_score(0.26), QualityLabel::Low);
    assert_eq!(QualityLabel::from_score(0.5), QualityLabel::Low);
    assert_eq!(QualityLabel::from_score(0.75), QualityLabel::Medium);
    assert_eq!(QualityLabel::from_score(0.76), QualityLabel::High);
    assert_eq!(QualityLabel::from_score(1.0), QualityLabel::High);
    assert_eq!(QualityLabel::VeryLow.as_str(), "Very Low");
}
