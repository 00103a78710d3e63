use super::{CheckResult, Metric};

/// Output of a predictive level comparison, forwarded unchanged by the checker.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictiveOutcome {
    pub result: CheckResult,
    /// The checked value with its predicted levels.
    pub metric: Metric,
    /// Reference curve metrics, e.g. the prediction itself.
    pub reference_curve: Vec<Metric>,
}

/// Compares a value against levels derived from its own history.
///
/// The checker does not interpret predictive level configurations; they are passed to the
/// comparator as configured.
pub trait PredictiveComparator {
    /// Checks `value` of metric `metric_name`. `label` prefixes the result text and
    /// `render` formats values in it.
    fn compare(
        &self,
        value: f64,
        config: &serde_json::Value,
        metric_name: &str,
        label: &str,
        render: fn(f64) -> String,
    ) -> PredictiveOutcome;
}
