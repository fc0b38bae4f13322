use std::fmt::{self, Display};

/// Probabilities strictly above this count as positive when scoring accuracy
pub const DECISION_THRESHOLD: f32 = 0.5;

const EPSILON: f64 = 1e-7;

/// A 2x2 confusion matrix, rows are actual labels and columns predicted labels
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct ConfusionMatrix {
    /// Actual 0, predicted 0
    pub true_negatives: usize,

    /// Actual 0, predicted 1
    pub false_positives: usize,

    /// Actual 1, predicted 0
    pub false_negatives: usize,

    /// Actual 1, predicted 1
    pub true_positives: usize,
}

impl ConfusionMatrix {
    /// Tally predicted labels against the actual ones
    pub fn from_labels(predicted: &[u8], actual: &[u8]) -> Self {
        let mut matrix = Self::default();

        for (predicted, actual) in predicted.iter().zip(actual) {
            match (actual, predicted) {
                (0, 0) => matrix.true_negatives += 1,
                (0, _) => matrix.false_positives += 1,
                (_, 0) => matrix.false_negatives += 1,
                _ => matrix.true_positives += 1,
            }
        }

        matrix
    }
}

impl Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[[{} {}]\n [{} {}]]",
            self.true_negatives, self.false_positives, self.false_negatives, self.true_positives
        )
    }
}

/// Loss, accuracy and confusion matrix of a set of predictions
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    /// Mean binary cross-entropy
    pub loss: f64,

    /// Fraction of rows where `p > 0.5` matches the label
    pub accuracy: f64,

    /// Confusion matrix of `p >= 0.5` labels
    pub confusion: ConfusionMatrix,
}

impl Score {
    /// Score predicted probabilities against binary labels. An empty set scores zero.
    pub fn from_probabilities(probabilities: &[f32], labels: &[u8]) -> Self {
        let total = probabilities.len().min(labels.len());

        if total == 0 {
            return Self {
                loss: 0.0,
                accuracy: 0.0,
                confusion: ConfusionMatrix::default(),
            };
        }

        let mut loss = 0.0;
        let mut correct = 0;

        for (p, label) in probabilities.iter().zip(labels) {
            let p = (*p as f64).clamp(EPSILON, 1.0 - EPSILON);

            loss -= if *label == 1 { p.ln() } else { (1.0 - p).ln() };

            if u8::from(p > DECISION_THRESHOLD as f64) == *label {
                correct += 1;
            }
        }

        let predicted: Vec<u8> = probabilities
            .iter()
            .map(|p| u8::from(*p >= DECISION_THRESHOLD))
            .collect();

        Self {
            loss: loss / total as f64,
            accuracy: correct as f64 / total as f64,
            confusion: ConfusionMatrix::from_labels(&predicted, labels),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn accuracy_and_confusion_use_different_boundaries() {
        let score = Score::from_probabilities(&[0.9, 0.5, 0.2, 0.7], &[1, 1, 0, 0]);

        assert_eq!(score.accuracy, 0.5);
        assert_eq!(
            score.confusion,
            ConfusionMatrix {
                true_negatives: 1,
                false_positives: 1,
                false_negatives: 0,
                true_positives: 2,
            }
        );
    }

    #[test]
    fn confident_correct_predictions_have_near_zero_loss() {
        let score = Score::from_probabilities(&[1.0, 0.0], &[1, 0]);

        assert!(score.loss < 1e-6);
        assert_eq!(score.accuracy, 1.0);
    }

    #[test]
    fn empty_predictions_score_zero() {
        let score = Score::from_probabilities(&[], &[]);

        assert_eq!(score.accuracy, 0.0);
        assert_eq!(score.confusion, ConfusionMatrix::default());
    }

    #[test]
    fn renders_like_a_matrix() {
        let matrix = ConfusionMatrix::from_labels(&[0, 1, 1], &[0, 0, 1]);

        assert_eq!(matrix.to_string(), "[[1 1]\n [0 1]]");
    }
}
