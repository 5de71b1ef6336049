/// Metrics and telemetry for the Pinory share server
///
/// Prometheus counters for the social access control surface:
/// - share link creation and views
/// - access denials by reason
/// - friend requests

use lazy_static::lazy_static;
use prometheus::{
    register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec,
    TextEncoder,
};

lazy_static! {
    /// Total share links created
    pub static ref SHARES_CREATED_TOTAL: IntCounter = register_int_counter!(
        "pinory_shares_created_total",
        "Total number of share links created"
    )
    .unwrap();

    /// Total counted share views
    pub static ref SHARE_VIEWS_TOTAL: IntCounter = register_int_counter!(
        "pinory_share_views_total",
        "Total number of counted share views"
    )
    .unwrap();

    /// Access denials by reason
    pub static ref ACCESS_DENIALS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "pinory_access_denials_total",
        "Total number of share access denials",
        &["reason"]
    )
    .unwrap();

    /// Total friend requests created
    pub static ref FRIEND_REQUESTS_TOTAL: IntCounter = register_int_counter!(
        "pinory_friend_requests_total",
        "Total number of friend requests created"
    )
    .unwrap();
}

/// Count one access denial
pub fn record_denial(reason: &str) {
    ACCESS_DENIALS_TOTAL.with_label_values(&[reason]).inc();
}

/// Render all registered metrics in Prometheus text format
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&families, &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
        return String::new();
    }

    String::from_utf8(buffer).unwrap_or_default()
}
