//! Gradient-boosted regression on calendar features
//!
//! Derives three features per historical day (day-of-month, month,
//! day-of-week) and fits squared-error gradient boosting with shallow
//! regression trees from features to aggregated value. Forecasting
//! computes the same features for the day after the last historical date
//! and predicts a single value; the model is horizon-1 only.

use chrono::{Datelike, Duration, NaiveDate};

use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};
use crate::series::DailySeries;

/// Number of calendar features per day
const FEATURES: usize = 3;

/// Residual sum of squares below which boosting stops early
const SSE_FLOOR: f64 = 1e-12;

/// Calendar features for one day: day-of-month, month, day-of-week
/// (Monday = 0)
fn calendar_features(date: NaiveDate) -> [f64; FEATURES] {
    [
        date.day() as f64,
        date.month() as f64,
        date.weekday().num_days_from_monday() as f64,
    ]
}

/// Gradient-boosted regression tree model
#[derive(Debug, Clone)]
pub struct GradientBoost {
    /// Name of the model
    name: String,
    /// Number of boosting rounds
    rounds: usize,
    /// Shrinkage applied to each tree's contribution
    learning_rate: f64,
    /// Maximum depth of each regression tree
    max_depth: usize,
}

/// Trained gradient-boosted model
#[derive(Debug, Clone)]
pub struct TrainedGradientBoost {
    /// Name of the model
    name: String,
    /// Base prediction (mean of the training targets)
    base: f64,
    /// Fitted trees, applied with shrinkage
    trees: Vec<RegressionTree>,
    /// Shrinkage applied to each tree's contribution
    learning_rate: f64,
    /// Last date of the training series
    last_date: NaiveDate,
}

impl GradientBoost {
    /// Create a model with explicit boosting parameters
    pub fn new(rounds: usize, learning_rate: f64, max_depth: usize) -> Result<Self> {
        if rounds == 0 {
            return Err(ForecastError::InvalidParameter(
                "Boosting rounds must be at least 1".to_string(),
            ));
        }
        if learning_rate <= 0.0 || learning_rate > 1.0 {
            return Err(ForecastError::InvalidParameter(
                "Learning rate must be in (0, 1]".to_string(),
            ));
        }
        if max_depth == 0 {
            return Err(ForecastError::InvalidParameter(
                "Tree depth must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            name: format!("GradientBoost ({} rounds)", rounds),
            rounds,
            learning_rate,
            max_depth,
        })
    }

    /// Default configuration: 100 rounds, shrinkage 0.1, depth-3 trees
    pub fn standard() -> Self {
        Self {
            name: "GradientBoost (100 rounds)".to_string(),
            rounds: 100,
            learning_rate: 0.1,
            max_depth: 3,
        }
    }
}

impl ForecastModel for GradientBoost {
    type Trained = TrainedGradientBoost;

    fn train(&self, series: &DailySeries) -> Result<TrainedGradientBoost> {
        let Some(last_date) = series.last_date() else {
            return Err(ForecastError::DataError(
                "Cannot train on an empty series".to_string(),
            ));
        };

        let features: Vec<[f64; FEATURES]> = series
            .dates()
            .into_iter()
            .map(calendar_features)
            .collect();
        let targets = series.values();

        let base = targets.iter().sum::<f64>() / targets.len() as f64;
        let mut residuals: Vec<f64> = targets.iter().map(|y| y - base).collect();
        let mut trees = Vec::with_capacity(self.rounds);

        for _ in 0..self.rounds {
            if residuals.iter().map(|r| r * r).sum::<f64>() < SSE_FLOOR {
                break;
            }

            let tree = RegressionTree::fit(&features, &residuals, self.max_depth);
            for (residual, x) in residuals.iter_mut().zip(features.iter()) {
                *residual -= self.learning_rate * tree.predict(x);
            }
            trees.push(tree);
        }

        Ok(TrainedGradientBoost {
            name: self.name.clone(),
            base,
            trees,
            learning_rate: self.learning_rate,
            last_date,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedForecastModel for TrainedGradientBoost {
    fn forecast(&self, horizons: usize) -> Result<ForecastResult> {
        if horizons != 1 {
            return Err(ForecastError::ModelError(format!(
                "Calendar-feature regression supports a horizon of 1 only, got {}",
                horizons
            )));
        }

        let next_day = self.last_date + Duration::days(1);
        let x = calendar_features(next_day);
        let boost: f64 = self.trees.iter().map(|tree| tree.predict(&x)).sum();
        let value = self.base + self.learning_rate * boost;

        ForecastResult::new(vec![value], 1)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A binary regression tree fit to squared error
#[derive(Debug, Clone)]
struct RegressionTree {
    root: Node,
}

#[derive(Debug, Clone)]
enum Node {
    Leaf(f64),
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl RegressionTree {
    fn fit(features: &[[f64; FEATURES]], targets: &[f64], max_depth: usize) -> Self {
        let indices: Vec<usize> = (0..targets.len()).collect();
        Self {
            root: build_node(features, targets, &indices, max_depth),
        }
    }

    fn predict(&self, x: &[f64; FEATURES]) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf(value) => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if x[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

fn mean_of(targets: &[f64], indices: &[usize]) -> f64 {
    indices.iter().map(|&i| targets[i]).sum::<f64>() / indices.len() as f64
}

fn build_node(
    features: &[[f64; FEATURES]],
    targets: &[f64],
    indices: &[usize],
    depth: usize,
) -> Node {
    if depth == 0 || indices.len() < 2 {
        return Node::Leaf(mean_of(targets, indices));
    }

    let Some((feature, threshold)) = best_split(features, targets, indices) else {
        return Node::Leaf(mean_of(targets, indices));
    };

    let (left, right): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .copied()
        .partition(|&i| features[i][feature] <= threshold);

    Node::Split {
        feature,
        threshold,
        left: Box::new(build_node(features, targets, &left, depth - 1)),
        right: Box::new(build_node(features, targets, &right, depth - 1)),
    }
}

/// Best (feature, threshold) by squared-error reduction, or None when no
/// split improves on the parent node
fn best_split(
    features: &[[f64; FEATURES]],
    targets: &[f64],
    indices: &[usize],
) -> Option<(usize, f64)> {
    let total_sum: f64 = indices.iter().map(|&i| targets[i]).sum();
    let total_sq: f64 = indices.iter().map(|&i| targets[i] * targets[i]).sum();
    let n = indices.len() as f64;
    let parent_sse = total_sq - total_sum * total_sum / n;

    let mut best: Option<(usize, f64, f64)> = None;

    for feature in 0..FEATURES {
        let mut ordered: Vec<(f64, f64)> = indices
            .iter()
            .map(|&i| (features[i][feature], targets[i]))
            .collect();
        ordered.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for split_at in 1..ordered.len() {
            let (x_prev, y_prev) = ordered[split_at - 1];
            left_sum += y_prev;
            left_sq += y_prev * y_prev;

            let x_here = ordered[split_at].0;
            if x_here <= x_prev {
                continue;
            }

            let left_n = split_at as f64;
            let right_n = n - left_n;
            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;

            let sse = (left_sq - left_sum * left_sum / left_n)
                + (right_sq - right_sum * right_sum / right_n);
            let gain = parent_sse - sse;

            if gain > 1e-12 && best.map_or(true, |(_, _, g)| gain > g) {
                best = Some((feature, (x_prev + x_here) / 2.0, gain));
            }
        }
    }

    best.map(|(feature, threshold, _)| (feature, threshold))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series_of(values: Vec<f64>) -> DailySeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        DailySeries::from_parts(start, values).unwrap()
    }

    #[test]
    fn constant_series_forecasts_the_constant() {
        let series = series_of(vec![100.0; 30]);
        let trained = GradientBoost::standard().train(&series).unwrap();
        let forecast = trained.forecast(1).unwrap();

        assert!((forecast.values()[0] - 100.0).abs() < 1e-9);
    }

    #[test]
    fn works_with_very_short_series() {
        let series = series_of(vec![10.0, 30.0, 20.0]);
        let trained = GradientBoost::standard().train(&series).unwrap();
        let forecast = trained.forecast(1).unwrap();

        assert_eq!(forecast.horizons(), 1);
        assert!(forecast.values()[0].is_finite());
    }

    #[test]
    fn learns_weekday_effect() {
        // Mondays are worth 500, every other day 100
        let values: Vec<f64> = (0..35)
            .map(|i| {
                let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(i);
                if date.weekday().num_days_from_monday() == 0 {
                    500.0
                } else {
                    100.0
                }
            })
            .collect();
        let series = series_of(values);
        let trained = GradientBoost::standard().train(&series).unwrap();

        // 2024-01-01 + 35 days = 2024-02-05, a Monday
        let forecast = trained.forecast(1).unwrap();
        assert!(forecast.values()[0] > 300.0);
    }

    #[test]
    fn multi_day_horizon_is_rejected() {
        let series = series_of(vec![50.0; 10]);
        let trained = GradientBoost::standard().train(&series).unwrap();
        assert!(matches!(
            trained.forecast(2),
            Err(ForecastError::ModelError(_))
        ));
    }

    #[test]
    fn validates_parameters() {
        assert!(GradientBoost::new(0, 0.1, 3).is_err());
        assert!(GradientBoost::new(100, 0.0, 3).is_err());
        assert!(GradientBoost::new(100, 1.5, 3).is_err());
        assert!(GradientBoost::new(100, 0.1, 0).is_err());
        assert!(GradientBoost::new(50, 0.3, 2).is_ok());
    }
}
