use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

lazy_static! {
    pub static ref ENTITY_OPERATIONS: IntCounterVec = register_int_counter_vec!(
        "kyc_entity_operations_total",
        "Entity operations handled by the service layer",
        &["entity", "operation", "outcome"]
    )
    .expect("metric can be created");

    pub static ref REPOSITORY_QUERY_DURATION: HistogramVec = register_histogram_vec!(
        "kyc_repository_query_duration_seconds",
        "Repository query duration in seconds",
        &["table", "operation"],
        vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]
    )
    .expect("metric can be created");

    pub static ref PRIMARY_DEMOTIONS: IntCounterVec = register_int_counter_vec!(
        "kyc_primary_demotions_total",
        "Records un-flagged as primary because another record of the party became primary",
        &["entity"]
    )
    .expect("metric can be created");
}

pub fn record_operation<T, E>(entity: &str, operation: &str, result: &Result<T, E>) {
    let outcome = if result.is_ok() { "ok" } else { "error" };
    ENTITY_OPERATIONS
        .with_label_values(&[entity, operation, outcome])
        .inc();
}

pub fn record_demotions(entity: &str, count: usize) {
    if count > 0 {
        PRIMARY_DEMOTIONS
            .with_label_values(&[entity])
            .inc_by(count as u64);
    }
}

/// Render the default registry in Prometheus text format
pub fn metrics_handler() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = vec![];
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
