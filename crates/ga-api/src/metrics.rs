//! Prometheus registry behind `/metrics`.
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

/// Tool invocations by tool name and outcome (`success` / `failure`).
#[derive(Clone)]
pub struct ToolMetrics {
    registry: Registry,
    invocations: IntCounterVec,
}

impl ToolMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let invocations = IntCounterVec::new(
            Opts::new("ga_tool_invocations_total", "Tool invocations by tool and outcome"),
            &["tool", "outcome"],
        )?;
        registry.register(Box::new(invocations.clone()))?;
        Ok(Self { registry, invocations })
    }

    pub fn record(&self, tool: &str, success: bool) {
        let outcome = if success { "success" } else { "failure" };
        self.invocations.with_label_values(&[tool, outcome]).inc();
    }

    pub fn count(&self, tool: &str, outcome: &str) -> u64 {
        self.invocations.with_label_values(&[tool, outcome]).get()
    }

    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_by_outcome() {
        let metrics = ToolMetrics::new().unwrap();
        metrics.record("analytics-data", true);
        metrics.record("analytics-data", false);
        metrics.record("analytics-data", false);
        assert_eq!(metrics.count("analytics-data", "success"), 1);
        assert_eq!(metrics.count("analytics-data", "failure"), 2);

        let text = metrics.encode().unwrap();
        assert!(text.contains("ga_tool_invocations_total{outcome=\"failure\",tool=\"analytics-data\"} 2"));
    }
}
