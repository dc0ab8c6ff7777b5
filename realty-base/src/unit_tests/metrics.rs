// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use super::*;

#[test]
fn dropped_guards_observe_one_sample() -> Result<(), prometheus::Error> {
    let histogram = register_histogram_vec(
        "realty_test_guard_latency_ms",
        "Latency recorded by a dropped guard",
        &["operation"],
        Some(vec![1.0, 10.0]),
    )?;

    drop(histogram.measure_latency(&["read"]));
    let latency = histogram.measure_latency(&["write"]).finish();

    assert!(latency >= 0.0);
    assert_eq!(histogram.with_label_values(&["read"]).get_sample_count(), 1);
    assert_eq!(histogram.with_label_values(&["write"]).get_sample_count(), 1);
    Ok(())
}

#[test]
fn metrics_are_registered_once() -> Result<(), prometheus::Error> {
    let counter = register_int_counter_vec(
        "realty_test_registrations",
        "Counter registered twice",
        &["outcome"],
    )?;
    counter.with_label_values(&["confirmed"]).inc();

    assert!(register_int_counter_vec(
        "realty_test_registrations",
        "Counter registered twice",
        &["outcome"],
    )
    .is_err());
    assert_eq!(counter.with_label_values(&["confirmed"]).get(), 1);
    Ok(())
}
