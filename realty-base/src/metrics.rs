// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Helper utilities used with the collection of metrics.

use std::time::Instant;

use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

#[cfg(test)]
#[path = "unit_tests/metrics.rs"]
mod tests;

/// Creates a [`HistogramVec`] and registers it with the default registry.
///
/// Without `buckets`, the default Prometheus buckets are used.
pub fn register_histogram_vec(
    name: &str,
    description: &str,
    label_names: &[&str],
    buckets: Option<Vec<f64>>,
) -> Result<HistogramVec, prometheus::Error> {
    let mut options = HistogramOpts::new(name, description);
    if let Some(buckets) = buckets {
        options = options.buckets(buckets);
    }
    let histogram = HistogramVec::new(options, label_names)?;
    prometheus::register(Box::new(histogram.clone()))?;
    Ok(histogram)
}

/// Creates an [`IntCounterVec`] and registers it with the default registry.
pub fn register_int_counter_vec(
    name: &str,
    description: &str,
    label_names: &[&str],
) -> Result<IntCounterVec, prometheus::Error> {
    let counter = IntCounterVec::new(Opts::new(name, description), label_names)?;
    prometheus::register(Box::new(counter.clone()))?;
    Ok(counter)
}

/// A guard for an active latency measurement.
///
/// Finishes the measurement when dropped, and then updates the `Metric`.
pub struct ActiveMeasurementGuard<'metric, Metric>
where
    Metric: MeasureLatency,
{
    start: Instant,
    labels: Vec<&'static str>,
    metric: Option<&'metric Metric>,
}

impl<Metric> ActiveMeasurementGuard<'_, Metric>
where
    Metric: MeasureLatency,
{
    /// Finishes the measurement, updates the `Metric` and returns the measured latency in
    /// milliseconds.
    pub fn finish(mut self) -> f64 {
        self.finish_by_ref()
    }

    fn finish_by_ref(&mut self) -> f64 {
        match self.metric.take() {
            Some(metric) => {
                let latency = self.start.elapsed().as_secs_f64() * 1000.0;
                metric.finish_measurement(&self.labels, latency);
                latency
            }
            // Already finished before being dropped.
            None => f64::NAN,
        }
    }
}

impl<Metric> Drop for ActiveMeasurementGuard<'_, Metric>
where
    Metric: MeasureLatency,
{
    fn drop(&mut self) {
        self.finish_by_ref();
    }
}

/// An extension trait for metrics that can be used to measure latencies.
pub trait MeasureLatency: Sized {
    /// Starts measuring the latency for the metric with `labels`, finishing when the returned
    /// [`ActiveMeasurementGuard`] is dropped.
    fn measure_latency(&self, labels: &[&'static str]) -> ActiveMeasurementGuard<'_, Self>;

    /// Updates the metric with measured latency in `milliseconds`.
    fn finish_measurement(&self, labels: &[&'static str], milliseconds: f64);
}

impl MeasureLatency for HistogramVec {
    fn measure_latency(&self, labels: &[&'static str]) -> ActiveMeasurementGuard<'_, Self> {
        ActiveMeasurementGuard {
            start: Instant::now(),
            labels: labels.to_vec(),
            metric: Some(self),
        }
    }

    fn finish_measurement(&self, labels: &[&'static str], milliseconds: f64) {
        self.with_label_values(labels).observe(milliseconds);
    }
}
