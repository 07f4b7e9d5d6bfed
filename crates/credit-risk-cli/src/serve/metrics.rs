//! Request and prediction metrics in the Prometheus text exposition format.
use std::collections::BTreeMap;
use std::sync::RwLock;
use std::time::Duration;

const N_BUCKETS: usize = 11;

/// Upper bounds (seconds) of the latency histogram buckets.
const LATENCY_BUCKETS: [f64; N_BUCKETS] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Prediction outcomes that are always exported, even at zero.
const PREDICTION_OUTCOMES: [&str; 3] = ["approved", "declined", "error"];

#[derive(Debug, Default, Clone)]
struct Latency {
    /// Observations per bucket, not cumulative.
    buckets: [u64; N_BUCKETS],
    sum: f64,
    count: u64,
}

impl Latency {
    fn observe(&mut self, seconds: f64) {
        if let Some(idx) = LATENCY_BUCKETS.iter().position(|&le| seconds <= le) {
            self.buckets[idx] += 1;
        }
        self.sum += seconds;
        self.count += 1;
    }
}

#[derive(Debug, Default)]
struct Registry {
    /// (method, route, status) -> count
    requests: BTreeMap<(String, String, u16), u64>,
    /// (method, route) -> latency
    latency: BTreeMap<(String, String), Latency>,
    predictions: BTreeMap<String, u64>,
}

/// Counters shared by every request handler. Export order is stable.
#[derive(Debug)]
pub struct ServerMetrics {
    registry: RwLock<Registry>,
}

impl ServerMetrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();
        for outcome in PREDICTION_OUTCOMES {
            registry.predictions.insert(outcome.to_string(), 0);
        }
        Self {
            registry: RwLock::new(registry),
        }
    }

    pub fn record_request(&self, method: &str, route: &str, status: u16, elapsed: Duration) {
        if let Ok(mut registry) = self.registry.write() {
            *registry
                .requests
                .entry((method.to_string(), route.to_string(), status))
                .or_default() += 1;
            registry
                .latency
                .entry((method.to_string(), route.to_string()))
                .or_default()
                .observe(elapsed.as_secs_f64());
        }
    }

    /// `outcome` is a decision (`approved`, `declined`) or `error`.
    pub fn record_prediction(&self, outcome: &str) {
        if let Ok(mut registry) = self.registry.write() {
            *registry.predictions.entry(outcome.to_string()).or_default() += 1;
        }
    }

    pub fn prediction_count(&self, outcome: &str) -> u64 {
        self.registry
            .read()
            .ok()
            .and_then(|registry| registry.predictions.get(outcome).copied())
            .unwrap_or(0)
    }

    pub fn export(&self) -> String {
        let mut output = String::new();
        let registry = match self.registry.read() {
            Ok(r) => r,
            Err(_) => return output,
        };

        output.push_str(
            "# HELP credit_risk_http_requests_total HTTP requests by method, route and status.\n",
        );
        output.push_str("# TYPE credit_risk_http_requests_total counter\n");
        for ((method, route, status), count) in &registry.requests {
            output.push_str(&format!(
                "credit_risk_http_requests_total{{method=\"{}\",route=\"{}\",status=\"{}\"}} {}\n",
                escape_label_value(method),
                escape_label_value(route),
                status,
                count
            ));
        }

        output.push_str(
            "# HELP credit_risk_http_request_duration_seconds HTTP request latency by method and route.\n",
        );
        output.push_str("# TYPE credit_risk_http_request_duration_seconds histogram\n");
        for ((method, route), latency) in &registry.latency {
            let labels = format!(
                "method=\"{}\",route=\"{}\"",
                escape_label_value(method),
                escape_label_value(route)
            );
            let mut cumulative = 0;
            for (le, n) in LATENCY_BUCKETS.iter().zip(latency.buckets.iter()) {
                cumulative += n;
                output.push_str(&format!(
                    "credit_risk_http_request_duration_seconds_bucket{{{},le=\"{}\"}} {}\n",
                    labels, le, cumulative
                ));
            }
            output.push_str(&format!(
                "credit_risk_http_request_duration_seconds_bucket{{{},le=\"+Inf\"}} {}\n",
                labels, latency.count
            ));
            output.push_str(&format!(
                "credit_risk_http_request_duration_seconds_sum{{{}}} {}\n",
                labels, latency.sum
            ));
            output.push_str(&format!(
                "credit_risk_http_request_duration_seconds_count{{{}}} {}\n",
                labels, latency.count
            ));
        }

        output.push_str("# HELP credit_risk_predictions_total Prediction requests by outcome.\n");
        output.push_str("# TYPE credit_risk_predictions_total counter\n");
        for (outcome, count) in &registry.predictions {
            output.push_str(&format!(
                "credit_risk_predictions_total{{outcome=\"{}\"}} {}\n",
                escape_label_value(outcome),
                count
            ));
        }

        output
    }
}

impl Default for ServerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn escape_label_value(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_metrics_export_zero_predictions() {
        let text = ServerMetrics::new().export();
        assert!(text.contains("# TYPE credit_risk_predictions_total counter"));
        assert!(text.contains("credit_risk_predictions_total{outcome=\"approved\"} 0"));
        assert!(text.contains("credit_risk_predictions_total{outcome=\"declined\"} 0"));
        assert!(text.contains("credit_risk_predictions_total{outcome=\"error\"} 0"));
    }

    #[test]
    fn latency_buckets_are_cumulative() {
        let metrics = ServerMetrics::new();
        metrics.record_request("GET", "/", 200, Duration::from_millis(2));
        metrics.record_request("GET", "/", 200, Duration::from_millis(300));
        metrics.record_request("GET", "/", 404, Duration::from_secs(20));

        let text = metrics.export();
        assert!(text.contains(
            "credit_risk_http_requests_total{method=\"GET\",route=\"/\",status=\"200\"} 2"
        ));
        assert!(text.contains(
            "credit_risk_http_requests_total{method=\"GET\",route=\"/\",status=\"404\"} 1"
        ));
        let prefix = "credit_risk_http_request_duration_seconds";
        assert!(text.contains(&format!("{}_bucket{{method=\"GET\",route=\"/\",le=\"0.005\"}} 1", prefix)));
        assert!(text.contains(&format!("{}_bucket{{method=\"GET\",route=\"/\",le=\"0.5\"}} 2", prefix)));
        assert!(text.contains(&format!("{}_bucket{{method=\"GET\",route=\"/\",le=\"10\"}} 2", prefix)));
        assert!(text.contains(&format!("{}_bucket{{method=\"GET\",route=\"/\",le=\"+Inf\"}} 3", prefix)));
        assert!(text.contains(&format!("{}_count{{method=\"GET\",route=\"/\"}} 3", prefix)));
    }

    #[test]
    fn predictions_are_counted_per_outcome() {
        let metrics = ServerMetrics::new();
        metrics.record_prediction("declined");
        metrics.record_prediction("declined");
        metrics.record_prediction("error");
        assert_eq!(metrics.prediction_count("declined"), 2);
        assert_eq!(metrics.prediction_count("error"), 1);
        assert_eq!(metrics.prediction_count("approved"), 0);
        assert!(metrics
            .export()
            .contains("credit_risk_predictions_total{outcome=\"declined\"} 2"));
    }
}
