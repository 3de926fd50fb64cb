use std::net::SocketAddr;

use crate::sql::Command;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: total queries executed. Labels: command, status.
pub const QUERIES_TOTAL: &str = "cancha_queries_total";

/// Histogram: query latency in seconds. Labels: command.
pub const QUERY_DURATION_SECONDS: &str = "cancha_query_duration_seconds";

// ── USE metrics (resource utilization) ──────────────────────────

/// Gauge: active TCP connections.
pub const CONNECTIONS_ACTIVE: &str = "cancha_connections_active";

/// Counter: total connections accepted.
pub const CONNECTIONS_TOTAL: &str = "cancha_connections_total";

/// Counter: connections rejected due to limit.
pub const CONNECTIONS_REJECTED_TOTAL: &str = "cancha_connections_rejected_total";

/// Gauge: number of venues with a loaded store.
pub const VENUES_ACTIVE: &str = "cancha_venues_active";

// ── Data health ─────────────────────────────────────────────────

/// Counter: hours found claimed more than once while building a grid.
pub const OCCUPANCY_CONFLICTS_TOTAL: &str = "cancha_occupancy_conflicts_total";

/// Counter: writes refused by the store (conflict, bad transition, limits).
pub const WRITES_REJECTED_TOTAL: &str = "cancha_writes_rejected_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}

/// Map a Command variant to a short label for metrics.
pub fn command_label(cmd: &Command) -> &'static str {
    match cmd {
        Command::SelectSlots { .. } => "select_slots",
        Command::SelectOccupancy { .. } => "select_occupancy",
        Command::SelectPrice { .. } => "select_price",
        Command::SelectQuote { .. } => "select_quote",
        Command::SelectTimeBands => "select_time_bands",
        Command::SelectReservations { .. } => "select_reservations",
        Command::SelectRecurring { .. } => "select_recurring",
        Command::SelectRevenue { .. } => "select_revenue",
        Command::SelectMonthTotal { .. } => "select_month_total",
        Command::SelectDaySummary { .. } => "select_day_summary",
        Command::SelectOperatingHours => "select_operating_hours",
        Command::InsertReservation { .. } => "insert_reservation",
        Command::UpdateReservation { .. } => "update_reservation",
        Command::DeleteReservation { .. } => "delete_reservation",
        Command::InsertRecurring { .. } => "insert_recurring",
        Command::UpdateRecurring { .. } => "update_recurring",
        Command::InsertTimeBand { .. } => "insert_time_band",
        Command::UpdateTimeBand { .. } => "update_time_band",
        Command::InsertProductSale { .. } => "insert_product_sale",
        Command::UpsertOperatingHours { .. } => "upsert_operating_hours",
    }
}
