use crate::constants::DECISION_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Weighted share of rows whose thresholded probability matches the label.
pub fn accuracy(y: &[f64], yhat: &[f64], sample_weight: &[f64]) -> f64 {
    let mut w_sum = 0.;
    let res = y
        .iter()
        .zip(yhat)
        .zip(sample_weight)
        .map(|((y_, yhat_), w_)| {
            w_sum += *w_;
            let label = if *yhat_ > DECISION_THRESHOLD { 1.0 } else { 0.0 };
            if label == *y_ {
                *w_
            } else {
                0.0
            }
        })
        .sum::<f64>();
    res / w_sum
}

/// Log loss of predicted probabilities, clipped away from 0 and 1.
pub fn log_loss(y: &[f64], yhat: &[f64], sample_weight: &[f64]) -> f64 {
    let eps = 1e-15;
    let mut w_sum = 0.;
    let res = y
        .iter()
        .zip(yhat)
        .zip(sample_weight)
        .map(|((y_, yhat_), w_)| {
            w_sum += *w_;
            let p = yhat_.clamp(eps, 1.0 - eps);
            -(*y_ * p.ln() + (1.0 - *y_) * (1.0 - p).ln()) * *w_
        })
        .sum::<f64>();
    res / w_sum
}

fn trapezoid_area(x0: f64, x1: f64, y0: f64, y1: f64) -> f64 {
    (x0 - x1).abs() * (y0 + y1) * 0.5
}

/// Area under the ROC curve. NaN when only one class is present.
pub fn roc_auc_score(y: &[f64], yhat: &[f64], sample_weight: &[f64]) -> f64 {
    if y.is_empty() {
        return f64::NAN;
    }
    let mut indices = (0..y.len()).collect::<Vec<_>>();
    indices.sort_unstable_by(|&a, &b| yhat[b].total_cmp(&yhat[a]));
    let mut auc: f64 = 0.0;

    let mut label = y[indices[0]];
    let mut w = sample_weight[indices[0]];
    let mut fp = (1.0 - label) * w;
    let mut tp: f64 = label * w;
    let mut tp_prev: f64 = 0.0;
    let mut fp_prev: f64 = 0.0;

    for i in 1..indices.len() {
        if yhat[indices[i]] != yhat[indices[i - 1]] {
            auc += trapezoid_area(fp_prev, fp, tp_prev, tp);
            tp_prev = tp;
            fp_prev = fp;
        }
        label = y[indices[i]];
        w = sample_weight[indices[i]];
        fp += (1.0 - label) * w;
        tp += label * w;
    }

    auc += trapezoid_area(fp_prev, fp, tp_prev, tp);
    if fp <= 0.0 || tp <= 0.0 {
        return f64::NAN;
    }

    auc / (tp * fp)
}

/// Scores of the classifier on the held-out rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub n_rows: usize,
    pub cancellation_rate: f64,
    pub accuracy: f64,
    pub roc_auc: f64,
    pub log_loss: f64,
}

impl Evaluation {
    /// * `y` - Observed labels.
    /// * `yhat` - Predicted cancellation probabilities.
    pub fn from_predictions(y: &[f64], yhat: &[f64]) -> Self {
        if y.is_empty() {
            return Evaluation {
                n_rows: 0,
                cancellation_rate: f64::NAN,
                accuracy: f64::NAN,
                roc_auc: f64::NAN,
                log_loss: f64::NAN,
            };
        }
        let w = vec![1.0; y.len()];
        Evaluation {
            n_rows: y.len(),
            cancellation_rate: y.iter().sum::<f64>() / y.len() as f64,
            accuracy: accuracy(y, yhat, &w),
            roc_auc: roc_auc_score(y, yhat, &w),
            log_loss: log_loss(y, yhat, &w),
        }
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "rows={}, cancellation_rate={:.4}, accuracy={:.4}, roc_auc={:.4}, log_loss={:.4}",
            self.n_rows, self.cancellation_rate, self.accuracy, self.roc_auc, self.log_loss
        )
    }
}
