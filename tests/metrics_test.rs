use std::sync::Arc;
use zfs_exporter::metrics::{MetricDesc, MetricSink, Observation};

#[test]
fn test_fresh_sink_renders_empty() {
    // Scrape gauges only appear once a collector has reported
    let sink = MetricSink::new().expect("Failed to create metric sink");
    let rendered = sink.render().expect("Failed to render metrics");
    assert!(!rendered.contains("zfs_scrape_collector_success{"));
}

#[test]
fn test_collector_result_rendering() {
    let sink = MetricSink::new().expect("Failed to create metric sink");

    sink.set_collector_result("pool", 0.25, true);
    sink.set_collector_result("pool-disks", 0.0, false);

    let rendered = sink.render().unwrap();
    assert!(rendered.contains("# TYPE zfs_scrape_collector_success gauge"));
    assert!(rendered.contains("zfs_scrape_collector_success{collector=\"pool\"} 1"));
    assert!(rendered.contains("zfs_scrape_collector_success{collector=\"pool-disks\"} 0"));
    assert!(rendered.contains("zfs_scrape_collector_duration_seconds{collector=\"pool\"} 0.25"));
}

#[test]
fn test_publish_all_renders_help_and_values() {
    let sink = MetricSink::new().unwrap();
    let desc = Arc::new(MetricDesc::new(
        "pool",
        "free_bytes",
        "The amount of free space in bytes available in the pool.",
        &["pool"],
    ));
    let observations = vec![
        Observation::new(&desc, &["tank"], 1024.0),
        Observation::new(&desc, &["backup"], 0.0),
    ];

    sink.publish_all(&observations).unwrap();

    let rendered = sink.render().unwrap();
    assert!(rendered.contains(
        "# HELP zfs_pool_free_bytes The amount of free space in bytes available in the pool."
    ));
    assert!(rendered.contains("zfs_pool_free_bytes{pool=\"tank\"} 1024"));
    assert!(rendered.contains("zfs_pool_free_bytes{pool=\"backup\"} 0"));
}

#[test]
fn test_rendering_is_stable() {
    let sink = MetricSink::new().unwrap();
    sink.set_collector_result("pool", 0.5, true);

    let render1 = sink.render().expect("First render failed");
    let render2 = sink.render().expect("Second render failed");
    assert_eq!(render1, render2, "Metrics rendering is not stable");
}
