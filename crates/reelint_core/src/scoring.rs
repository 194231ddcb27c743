//! Score aggregation.
//!
//! Every category starts at [`BASELINE_SCORE`] and loses the points of each
//! violation filed under it. Category scores are clamped to `0..=100`; the
//! overall score is their weighted mean.

use serde::{Deserialize, Serialize};

use crate::format::Category;
use crate::result::Violation;

/// Score of a category with no violations.
pub const BASELINE_SCORE: i32 = 100;

/// Relative weight of each category in the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub hook_strength: f64,
    pub structure_pacing: f64,
    pub delivery_performance: f64,
    pub value_clarity: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            hook_strength: 1.0,
            structure_pacing: 1.0,
            delivery_performance: 1.0,
            value_clarity: 1.0,
        }
    }
}

impl ScoreWeights {
    pub fn weight(&self, category: Category) -> f64 {
        match category {
            Category::HookStrength => self.hook_strength,
            Category::StructurePacing => self.structure_pacing,
            Category::DeliveryPerformance => self.delivery_performance,
            Category::ValueClarity => self.value_clarity,
        }
    }

    pub fn total(&self) -> f64 {
        Category::ALL.iter().map(|c| self.weight(*c)).sum()
    }
}

/// Category and overall scores, each in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub hook_strength: u8,
    pub structure_pacing: u8,
    pub delivery_performance: u8,
    pub value_clarity: u8,
    /// Weighted mean of the four category scores.
    pub overall: u8,
}

impl Default for Scores {
    fn default() -> Self {
        Self {
            hook_strength: 100,
            structure_pacing: 100,
            delivery_performance: 100,
            value_clarity: 100,
            overall: 100,
        }
    }
}

impl Scores {
    pub fn category(&self, category: Category) -> u8 {
        match category {
            Category::HookStrength => self.hook_strength,
            Category::StructurePacing => self.structure_pacing,
            Category::DeliveryPerformance => self.delivery_performance,
            Category::ValueClarity => self.value_clarity,
        }
    }

    fn category_mut(&mut self, category: Category) -> &mut u8 {
        match category {
            Category::HookStrength => &mut self.hook_strength,
            Category::StructurePacing => &mut self.structure_pacing,
            Category::DeliveryPerformance => &mut self.delivery_performance,
            Category::ValueClarity => &mut self.value_clarity,
        }
    }
}

/// Computes scores from resolved violations.
pub fn compute_scores(violations: &[Violation], weights: &ScoreWeights) -> Scores {
    let mut scores = Scores::default();

    for category in Category::ALL {
        let deduction: i32 = violations
            .iter()
            .filter(|v| v.category == category)
            .map(|v| v.severity.points())
            .sum();
        *scores.category_mut(category) = clamp_score(BASELINE_SCORE + deduction);
    }

    scores.overall = overall_score(&scores, weights);
    scores
}

fn clamp_score(value: i32) -> u8 {
    // Clamped into 0..=100, so the cast cannot truncate.
    value.clamp(0, 100) as u8
}

fn overall_score(scores: &Scores, weights: &ScoreWeights) -> u8 {
    let total = weights.total();
    if total <= 0.0 {
        // Unreachable with a validated config; fall back to the plain mean.
        return overall_score(scores, &ScoreWeights::default());
    }

    let weighted: f64 = Category::ALL
        .iter()
        .map(|c| f64::from(scores.category(*c)) * weights.weight(*c))
        .sum();
    clamp_score((weighted / total).round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue_key::IssueKey;
    use crate::severity::Severity;
    use pretty_assertions::assert_eq;

    fn violation(category: Category, severity: Severity) -> Violation {
        Violation {
            rule_id: None,
            issue_key: IssueKey::from("test"),
            message: "test".to_string(),
            evidence: String::new(),
            severity,
            original_severity: severity,
            category,
        }
    }

    #[test]
    fn test_no_violations_is_perfect() {
        let scores = compute_scores(&[], &ScoreWeights::default());
        assert_eq!(scores, Scores::default());
    }

    #[test]
    fn test_deductions_per_category() {
        let violations = vec![
            violation(Category::HookStrength, Severity::Critical),
            violation(Category::HookStrength, Severity::Minor),
            violation(Category::ValueClarity, Severity::Moderate),
            violation(Category::DeliveryPerformance, Severity::Ignored),
        ];

        let scores = compute_scores(&violations, &ScoreWeights::default());

        assert_eq!(scores.hook_strength, 88);
        assert_eq!(scores.structure_pacing, 100);
        assert_eq!(scores.delivery_performance, 100);
        assert_eq!(scores.value_clarity, 95);
        // (88 + 100 + 100 + 95) / 4 = 95.75
        assert_eq!(scores.overall, 96);
    }

    #[test]
    fn test_category_floor_is_zero() {
        let violations: Vec<_> = (0..15)
            .map(|_| violation(Category::StructurePacing, Severity::Critical))
            .collect();

        let scores = compute_scores(&violations, &ScoreWeights::default());

        assert_eq!(scores.structure_pacing, 0);
        assert_eq!(scores.overall, 75);
    }

    #[test]
    fn test_weights_change_overall() {
        let violations = vec![violation(Category::HookStrength, Severity::Critical)];
        let weights = ScoreWeights {
            hook_strength: 3.0,
            ..ScoreWeights::default()
        };

        let equal = compute_scores(&violations, &ScoreWeights::default());
        let weighted = compute_scores(&violations, &weights);

        // (90 + 100 * 3) / 4 = 97.5
        assert_eq!(equal.overall, 98);
        // (90 * 3 + 100 * 3) / 6 = 95
        assert_eq!(weighted.overall, 95);
    }

    #[test]
    fn test_zero_weight_category_is_excluded() {
        let violations = vec![violation(Category::ValueClarity, Severity::Critical)];
        let weights = ScoreWeights {
            value_clarity: 0.0,
            ..ScoreWeights::default()
        };

        let scores = compute_scores(&violations, &weights);

        assert_eq!(scores.value_clarity, 90);
        assert_eq!(scores.overall, 100);
    }

    #[test]
    fn test_all_zero_weights_fall_back_to_mean() {
        let violations = vec![violation(Category::HookStrength, Severity::Moderate)];
        let weights = ScoreWeights {
            hook_strength: 0.0,
            structure_pacing: 0.0,
            delivery_performance: 0.0,
            value_clarity: 0.0,
        };

        // (95 + 300) / 4 = 98.75
        assert_eq!(compute_scores(&violations, &weights).overall, 99);
    }
}
