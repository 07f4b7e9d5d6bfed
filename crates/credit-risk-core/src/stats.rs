use serde::{Deserialize, Serialize};

/// Binary confusion counts with class 1 as the positive class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionCounts {
    pub true_positive: usize,
    pub false_positive: usize,
    pub true_negative: usize,
    pub false_negative: usize,
}

impl ConfusionCounts {
    /// Count agreements between `y_true` and `y_pred`.
    ///
    /// # Panics
    ///
    /// Panics if the slices differ in length.
    pub fn from_labels(y_true: &[usize], y_pred: &[usize]) -> Self {
        assert_eq!(
            y_true.len(),
            y_pred.len(),
            "y_true and y_pred must have equal length"
        );
        let mut counts = ConfusionCounts::default();
        for (&t, &p) in y_true.iter().zip(y_pred) {
            match (t == 1, p == 1) {
                (true, true) => counts.true_positive += 1,
                (false, true) => counts.false_positive += 1,
                (false, false) => counts.true_negative += 1,
                (true, false) => counts.false_negative += 1,
            }
        }
        counts
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_positive)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positive, self.true_positive + self.false_negative)
    }

    pub fn accuracy(&self) -> f64 {
        ratio(
            self.true_positive + self.true_negative,
            self.true_positive + self.true_negative + self.false_positive + self.false_negative,
        )
    }

    /// `2tp / (2tp + fp + fn)`; zero when there are no positives at all.
    pub fn f1(&self) -> f64 {
        ratio(
            2 * self.true_positive,
            2 * self.true_positive + self.false_positive + self.false_negative,
        )
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// F1 score of the positive class 1.
pub fn f1_score(y_true: &[usize], y_pred: &[usize]) -> f64 {
    ConfusionCounts::from_labels(y_true, y_pred).f1()
}

/// Mean of the finite values, `None` if there are none.
pub fn mean(values: &[f64]) -> Option<f64> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        None
    } else {
        Some(finite.iter().sum::<f64>() / finite.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn f1_matches_hand_computation() {
        // tp=2, fp=1, fn=1 -> 4 / (4 + 2)
        let y_true = [1, 1, 1, 0, 0, 0];
        let y_pred = [1, 1, 0, 1, 0, 0];
        assert!((f1_score(&y_true, &y_pred) - 4.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn f1_is_zero_without_positives() {
        assert_eq!(f1_score(&[0, 0], &[0, 0]), 0.0);
        assert_eq!(f1_score(&[1, 1], &[0, 0]), 0.0);
    }

    #[test]
    fn precision_recall_accuracy() {
        let c = ConfusionCounts::from_labels(&[1, 0, 1, 0], &[1, 1, 0, 0]);
        assert_eq!(c.precision(), 0.5);
        assert_eq!(c.recall(), 0.5);
        assert_eq!(c.accuracy(), 0.5);
    }

    #[test]
    fn mean_skips_non_finite() {
        assert_eq!(mean(&[1.0, f64::NAN, 3.0]), Some(2.0));
        assert_eq!(mean(&[]), None);
    }
}
