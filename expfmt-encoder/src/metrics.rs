use expfmt_core::config::SelfMetricsConfig;
use expfmt_core::format::ExpositionFormat;
use prometheus::proto::MetricFamily;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};

/// Scrape self-metrics. All counters are gated behind `enabled`.
///
/// When disabled no registry is created and recording is a no-op.
pub struct ScrapeMetrics {
    enabled: bool,
    registry: Option<Registry>,
    pub negotiations_total: Option<IntCounterVec>,
    pub encode_errors_total: Option<IntCounterVec>,
    pub render_duration: Option<HistogramVec>,
}

impl ScrapeMetrics {
    /// Create from config. When `enabled = false`, everything is None.
    pub fn new(config: &SelfMetricsConfig) -> anyhow::Result<Self> {
        if !config.enabled {
            return Ok(Self::disabled());
        }

        let registry = Registry::new();

        let negotiations_total = IntCounterVec::new(
            Opts::new("expfmt_negotiations_total", "Scrapes by negotiated exposition format"),
            &["format"],
        )?;

        let encode_errors_total = IntCounterVec::new(
            Opts::new("expfmt_encode_errors_total", "Scrapes that failed while encoding"),
            &["format"],
        )?;

        let render_duration = HistogramVec::new(
            HistogramOpts::new("expfmt_render_duration_seconds", "Time spent encoding a scrape")
                .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]),
            &["format"],
        )?;

        registry.register(Box::new(negotiations_total.clone()))?;
        registry.register(Box::new(encode_errors_total.clone()))?;
        registry.register(Box::new(render_duration.clone()))?;

        Ok(Self {
            enabled: true,
            registry: Some(registry),
            negotiations_total: Some(negotiations_total),
            encode_errors_total: Some(encode_errors_total),
            render_duration: Some(render_duration),
        })
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            registry: None,
            negotiations_total: None,
            encode_errors_total: None,
            render_duration: None,
        }
    }

    /// Record one rendered scrape (no-op when disabled).
    #[inline]
    pub fn record_render(&self, format: ExpositionFormat, duration_secs: f64, ok: bool) {
        if !self.enabled {
            return;
        }
        let label = [format.name()];
        if let Some(ref counter) = self.negotiations_total {
            counter.with_label_values(&label).inc();
        }
        if !ok {
            if let Some(ref counter) = self.encode_errors_total {
                counter.with_label_values(&label).inc();
            }
        }
        if let Some(ref hist) = self.render_duration {
            hist.with_label_values(&label).observe(duration_secs);
        }
    }

    /// Current self-metric families, empty when disabled.
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry
            .as_ref()
            .map(Registry::gather)
            .unwrap_or_default()
    }

    pub fn registry(&self) -> Option<&Registry> {
        self.registry.as_ref()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(enabled: bool) -> SelfMetricsConfig {
        SelfMetricsConfig { enabled }
    }

    // ── Disabled collector ───────────────────────────────────────

    #[test]
    fn disabled_metrics_have_no_fields() {
        let m = ScrapeMetrics::new(&config(false)).unwrap();
        assert!(!m.is_enabled());
        assert!(m.registry().is_none());
        assert!(m.negotiations_total.is_none());
        assert!(m.encode_errors_total.is_none());
        assert!(m.render_duration.is_none());
    }

    #[test]
    fn disabled_metrics_gather_is_empty() {
        let m = ScrapeMetrics::disabled();
        m.record_render(ExpositionFormat::Text, 0.001, true);
        assert!(m.gather().is_empty());
    }

    // ── Enabled collector ────────────────────────────────────────

    #[test]
    fn enabled_metrics_have_all_fields() {
        let m = ScrapeMetrics::new(&config(true)).unwrap();
        assert!(m.is_enabled());
        assert!(m.registry().is_some());
        assert!(m.negotiations_total.is_some());
        assert!(m.encode_errors_total.is_some());
        assert!(m.render_duration.is_some());
    }

    #[test]
    fn record_render_counts_by_format() {
        let m = ScrapeMetrics::new(&config(true)).unwrap();
        m.record_render(ExpositionFormat::Text, 0.001, true);
        m.record_render(ExpositionFormat::Text, 0.002, true);
        m.record_render(ExpositionFormat::ProtoDelimited, 0.003, true);

        let counter = m.negotiations_total.as_ref().unwrap();
        assert_eq!(counter.with_label_values(&["text"]).get(), 2);
        assert_eq!(counter.with_label_values(&["protobuf-delimited"]).get(), 1);
    }

    #[test]
    fn record_render_failure_increments_errors() {
        let m = ScrapeMetrics::new(&config(true)).unwrap();
        m.record_render(ExpositionFormat::ProtoText, 0.001, false);
        m.record_render(ExpositionFormat::ProtoText, 0.001, true);

        let errors = m.encode_errors_total.as_ref().unwrap();
        assert_eq!(errors.with_label_values(&["protobuf-text"]).get(), 1);
    }

    #[test]
    fn gather_includes_recorded_families() {
        let m = ScrapeMetrics::new(&config(true)).unwrap();
        m.record_render(ExpositionFormat::ProtoCompactText, 0.01, true);
        let names: Vec<String> = m.gather().iter().map(|f| f.get_name().to_string()).collect();
        assert!(names.contains(&"expfmt_negotiations_total".to_string()));
        assert!(names.contains(&"expfmt_render_duration_seconds".to_string()));
    }
}
