// riskgate-core/src/core/risk.rs
// ============================================================================
// Module: riskgate Risk Scorer
// Description: Component risk signals and the renormalized composite score.
// Purpose: Turn answer/context/tool signals into one policy-ready score.
// Dependencies: regex, serde
// ============================================================================

//! ## Overview
//! Each risk component is independently absent: a signal that was never
//! observed is dropped from both the numerator and the denominator of the
//! composite rather than imputed. A request with no observable signals scores
//! as [`Composite::Undefined`], which the policy engine treats on its own row
//! of the matrix.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::hashing::normalize_text;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Markers indicating the tool reported a failure.
const FAILURE_MARKERS: [&str; 5] = ["fail", "error", "declined", "denied", "timeout"];
/// Markers indicating the answer claims success.
const SUCCESS_MARKERS: [&str; 5] = ["success", "completed", "done", "sent", "processed"];

#[allow(clippy::expect_used, reason = "Pattern is a compile-time constant.")]
static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+").expect("word pattern compiles"));

#[allow(clippy::expect_used, reason = "Pattern is a compile-time constant.")]
static SIGNED_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-+]?\d*\.?\d+").expect("number pattern compiles"));

// ============================================================================
// SECTION: Risk Level
// ============================================================================

/// Coarse level derived from the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// Composite below the low threshold.
    Low,
    /// Composite between the low and medium thresholds.
    Medium,
    /// Composite at or above the medium threshold.
    High,
}

/// Score cutoffs mapping a composite to a [`RiskLevel`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    /// Scores strictly below this value are low risk.
    pub low: f64,
    /// Scores strictly below this value (and at or above `low`) are medium risk.
    pub medium: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            low: 0.20,
            medium: 0.35,
        }
    }
}

impl RiskThresholds {
    /// Maps a composite score to its level.
    #[must_use]
    pub fn level(&self, score: f64) -> RiskLevel {
        if score < self.low {
            RiskLevel::Low
        } else if score < self.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    /// Validates threshold ordering.
    ///
    /// # Errors
    ///
    /// Returns [`RiskConfigError`] when cutoffs are not strictly increasing in (0, 1].
    pub fn validate(&self) -> Result<(), RiskConfigError> {
        if !(self.low > 0.0 && self.low < self.medium && self.medium <= 1.0) {
            return Err(RiskConfigError::InvalidThresholds {
                low: self.low,
                medium: self.medium,
            });
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Risk Weights
// ============================================================================

/// Component weights for the composite score.
///
/// The composite renormalizes over present components, so weights need not
/// sum to one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskWeights {
    /// Weight of the grounding component.
    pub grounding: f64,
    /// Weight of the self-consistency component.
    pub self_consistency: f64,
    /// Weight of the verifier component.
    pub verifier: f64,
    /// Weight of the numeric-instability component.
    pub numeric: f64,
    /// Weight of the tool-mismatch component.
    pub tool_mismatch: f64,
    /// Weight of the drift component.
    pub drift: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            grounding: 0.30,
            self_consistency: 0.25,
            verifier: 0.25,
            numeric: 0.10,
            tool_mismatch: 0.10,
            drift: 0.10,
        }
    }
}

impl RiskWeights {
    /// Validates that weights are non-negative and not all zero.
    ///
    /// # Errors
    ///
    /// Returns [`RiskConfigError`] when a weight is negative or all are zero.
    pub fn validate(&self) -> Result<(), RiskConfigError> {
        let all = [
            self.grounding,
            self.self_consistency,
            self.verifier,
            self.numeric,
            self.tool_mismatch,
            self.drift,
        ];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(RiskConfigError::NegativeWeight);
        }
        if all.iter().sum::<f64>() <= 0.0 {
            return Err(RiskConfigError::ZeroWeightSum);
        }
        Ok(())
    }
}

/// Risk configuration errors.
#[derive(Debug, Error)]
pub enum RiskConfigError {
    /// Threshold cutoffs are not strictly increasing in (0, 1].
    #[error("risk thresholds must satisfy 0 < low < medium <= 1 (low={low}, medium={medium})")]
    InvalidThresholds {
        /// Configured low cutoff.
        low: f64,
        /// Configured medium cutoff.
        medium: f64,
    },
    /// A component weight is negative or non-finite.
    #[error("risk weights must be finite and non-negative")]
    NegativeWeight,
    /// All component weights are zero.
    #[error("risk weights must not all be zero")]
    ZeroWeightSum,
}

// ============================================================================
// SECTION: Risk Vector
// ============================================================================

/// Component risks for one proposal. Absent components were never observed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskVector {
    /// Normalized prompt hash used for drift comparison.
    pub normalized_prompt_hash: String,
    /// `1 - jaccard(answer, retrieved_context)`.
    pub grounding_risk: Option<f64>,
    /// `1 - jaccard(answer, secondary_answer)`.
    pub self_consistency_risk: Option<f64>,
    /// `1 - verifier_score`.
    pub verifier_risk: Option<f64>,
    /// Coefficient of variation of numbers in the answer(s), clipped to [0, 1].
    pub numeric_instability_risk: Option<f64>,
    /// 1.0 iff the tool reported failure while the answer claims success.
    pub tool_mismatch_risk: Option<f64>,
    /// 1.0 iff the normalized prompt hash differs from the stored baseline.
    pub drift_risk: Option<f64>,
}

/// Composite risk derived from present components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Composite {
    /// Weighted renormalized mean over present components.
    Scored {
        /// Composite score in [0, 1].
        score: f64,
        /// Level derived from the configured thresholds.
        level: RiskLevel,
    },
    /// No components were present; the score is undefined, not zero.
    Undefined,
}

impl Composite {
    /// Returns the score when defined.
    #[must_use]
    pub const fn score(&self) -> Option<f64> {
        match self {
            Self::Scored {
                score, ..
            } => Some(*score),
            Self::Undefined => None,
        }
    }

    /// Returns the level when defined.
    #[must_use]
    pub const fn level(&self) -> Option<RiskLevel> {
        match self {
            Self::Scored {
                level, ..
            } => Some(*level),
            Self::Undefined => None,
        }
    }
}

// ============================================================================
// SECTION: Signals
// ============================================================================

/// Loosely typed optional inputs observed for one proposal.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskSignals<'a> {
    /// Primary model answer.
    pub answer: &'a str,
    /// Secondary answer sampled for self-consistency, when available.
    pub secondary_answer: Option<&'a str>,
    /// Retrieved context the answer should be grounded in, when available.
    pub retrieved_context: Option<&'a str>,
    /// Summary of the tool result the answer describes, when available.
    pub tool_result_summary: Option<&'a str>,
    /// External verifier score in [0, 1], when available.
    pub verifier_score: Option<f64>,
    /// Stored baseline normalized prompt hash for the tool, when available.
    pub baseline_prompt_hash: Option<&'a str>,
}

// ============================================================================
// SECTION: Signal Primitives
// ============================================================================

/// Clamps a value into [0, 1].
#[must_use]
pub fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Extracts the case-folded word-token set of a text.
fn tokenize(text: &str) -> BTreeSet<String> {
    WORD_RE
        .find_iter(&normalize_text(text))
        .map(|token| token.as_str().to_string())
        .collect()
}

/// Jaccard similarity over token sets. Two empty sets are identical.
#[allow(clippy::cast_precision_loss, reason = "Token counts are far below 2^52.")]
fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let union = a.union(b).count();
    if union == 0 {
        return 1.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f64 / union as f64
}

/// Extracts signed decimal literals from a text.
fn extract_numbers(text: &str) -> Vec<f64> {
    SIGNED_NUMBER_RE
        .find_iter(text)
        .filter_map(|token| token.as_str().parse::<f64>().ok())
        .collect()
}

/// Grounding risk: token divergence between answer and retrieved context.
#[must_use]
pub fn grounding_risk(answer: &str, retrieved_context: Option<&str>) -> Option<f64> {
    let context = retrieved_context?;
    Some(clamp01(1.0 - jaccard(&tokenize(answer), &tokenize(context))))
}

/// Self-consistency risk: token divergence between primary and secondary answers.
#[must_use]
pub fn self_consistency_risk(answer: &str, secondary_answer: Option<&str>) -> Option<f64> {
    let secondary = secondary_answer?;
    Some(clamp01(1.0 - jaccard(&tokenize(answer), &tokenize(secondary))))
}

/// Verifier risk: complement of an external verifier score.
#[must_use]
pub fn verifier_risk(verifier_score: Option<f64>) -> Option<f64> {
    verifier_score.map(|score| clamp01(1.0 - clamp01(score)))
}

/// Numeric instability: coefficient of variation of numbers in the answer(s).
///
/// Numbers from the primary and secondary answers are pooled. Fewer than two
/// numbers, or a zero mean, yields 0.0. No numbers in the primary answer
/// yields an absent component.
#[must_use]
pub fn numeric_instability_risk(answer: &str, secondary_answer: Option<&str>) -> Option<f64> {
    let mut numbers = extract_numbers(answer);
    if numbers.is_empty() {
        return None;
    }
    if let Some(secondary) = secondary_answer {
        numbers.extend(extract_numbers(secondary));
    }
    if numbers.len() < 2 {
        return Some(0.0);
    }
    #[allow(clippy::cast_precision_loss, reason = "Sample counts are far below 2^52.")]
    let n = numbers.len() as f64;
    let mean = numbers.iter().sum::<f64>() / n;
    if mean.abs() < f64::EPSILON {
        return Some(0.0);
    }
    let variance = numbers.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(clamp01(variance.sqrt() / mean.abs()))
}

/// Tool mismatch: the tool reported failure but the answer claims success.
#[must_use]
pub fn tool_mismatch_risk(answer: &str, tool_result_summary: Option<&str>) -> Option<f64> {
    let summary = tool_result_summary?;
    let answer_n = normalize_text(answer);
    let summary_n = normalize_text(summary);
    let tool_failed = FAILURE_MARKERS.iter().any(|marker| summary_n.contains(marker));
    let answer_claims_success = SUCCESS_MARKERS.iter().any(|marker| answer_n.contains(marker));
    Some(if tool_failed && answer_claims_success {
        1.0
    } else {
        0.0
    })
}

/// Drift: the normalized prompt hash no longer matches the stored baseline.
#[must_use]
pub fn drift_risk(current_prompt_hash: &str, baseline_prompt_hash: Option<&str>) -> Option<f64> {
    let baseline = baseline_prompt_hash?;
    Some(if baseline == current_prompt_hash {
        0.0
    } else {
        1.0
    })
}

// ============================================================================
// SECTION: Scorer
// ============================================================================

/// Computes risk vectors and composites under configured weights.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskScorer {
    /// Component weights.
    pub weights: RiskWeights,
    /// Level thresholds.
    pub thresholds: RiskThresholds,
}

impl RiskScorer {
    /// Creates a scorer with explicit weights and thresholds.
    #[must_use]
    pub const fn new(weights: RiskWeights, thresholds: RiskThresholds) -> Self {
        Self {
            weights,
            thresholds,
        }
    }

    /// Scores one proposal's signals.
    #[must_use]
    pub fn score(&self, normalized_prompt_hash: &str, signals: &RiskSignals<'_>) -> (RiskVector, Composite) {
        let vector = RiskVector {
            normalized_prompt_hash: normalized_prompt_hash.to_string(),
            grounding_risk: grounding_risk(signals.answer, signals.retrieved_context),
            self_consistency_risk: self_consistency_risk(signals.answer, signals.secondary_answer),
            verifier_risk: verifier_risk(signals.verifier_score),
            numeric_instability_risk: numeric_instability_risk(
                signals.answer,
                signals.secondary_answer,
            ),
            tool_mismatch_risk: tool_mismatch_risk(signals.answer, signals.tool_result_summary),
            drift_risk: drift_risk(normalized_prompt_hash, signals.baseline_prompt_hash),
        };
        let composite = self.composite(&vector);
        (vector, composite)
    }

    /// Computes the renormalized weighted composite over present components.
    #[must_use]
    pub fn composite(&self, vector: &RiskVector) -> Composite {
        let components = [
            (vector.grounding_risk, self.weights.grounding),
            (vector.self_consistency_risk, self.weights.self_consistency),
            (vector.verifier_risk, self.weights.verifier),
            (vector.numeric_instability_risk, self.weights.numeric),
            (vector.tool_mismatch_risk, self.weights.tool_mismatch),
            (vector.drift_risk, self.weights.drift),
        ];
        let mut weighted_sum = 0.0;
        let mut total_weight = 0.0;
        for (value, weight) in components {
            let Some(value) = value else {
                continue;
            };
            weighted_sum += clamp01(value) * weight;
            total_weight += weight;
        }
        if total_weight <= 0.0 {
            return Composite::Undefined;
        }
        let score = clamp01(weighted_sum / total_weight);
        Composite::Scored {
            score,
            level: self.thresholds.level(score),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::jaccard;
    use super::tokenize;

    #[test]
    fn jaccard_of_identical_texts_is_one() {
        let a = tokenize("Transfer 100 to acct_123");
        let b = tokenize("transfer 100 to ACCT_123");
        assert!((jaccard(&a, &b) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn jaccard_with_one_empty_side_is_zero() {
        let a = tokenize("transfer funds");
        let b = tokenize("");
        assert!(jaccard(&a, &b).abs() < f64::EPSILON);
    }
}
