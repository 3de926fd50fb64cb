use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::info;

use cancha::model::OperatingHours;
use cancha::seed::VenueSeed;
use cancha::tenant::VenueManager;
use cancha::wire;

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let metrics_port: Option<u16> = env_parse("CANCHA_METRICS_PORT");
    cancha::observability::init(metrics_port);

    let port = std::env::var("CANCHA_PORT").unwrap_or_else(|_| "5433".into());
    let bind = std::env::var("CANCHA_BIND").unwrap_or_else(|_| "0.0.0.0".into());
    let max_connections: usize = env_parse("CANCHA_MAX_CONNECTIONS").unwrap_or(256);
    let default_hours = OperatingHours::new(
        env_parse("CANCHA_OPEN_HOUR").unwrap_or(OperatingHours::DEFAULT.start),
        env_parse("CANCHA_CLOSE_HOUR").unwrap_or(OperatingHours::DEFAULT.end),
    )?;

    let seed_file = std::env::var("CANCHA_SEED_FILE").ok().map(PathBuf::from);
    let seed = match &seed_file {
        Some(path) => Some(VenueSeed::load(path)?),
        None => None,
    };

    let venue_manager = Arc::new(VenueManager::new(default_hours, seed));
    let semaphore = Arc::new(Semaphore::new(max_connections));

    let addr = format!("{bind}:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!("cancha listening on {addr}");
    info!("  max_connections: {max_connections}");
    info!("  default hours: {:02}:00-{:02}:00", default_hours.start, default_hours.end);
    info!("  seed: {}", seed_file.as_ref().map_or("none".to_string(), |p| p.display().to_string()));
    info!("  metrics: {}", metrics_port.map_or("disabled".to_string(), |p| format!("http://0.0.0.0:{p}/metrics")));

    // Graceful shutdown: stop accepting on SIGTERM/ctrl-c, drain in-flight connections
    let shutdown = async {
        let ctrl_c = tokio::signal::ctrl_c();
        #[cfg(unix)]
        {
            let mut sigterm =
                tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                    .expect("failed to register SIGTERM handler");
            tokio::select! {
                _ = ctrl_c => {}
                _ = sigterm.recv() => {}
            }
        }
        #[cfg(not(unix))]
        {
            ctrl_c.await.ok();
        }
    };
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (socket, peer) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        tracing::error!("accept error: {e}");
                        continue;
                    }
                };

                let permit = match semaphore.clone().try_acquire_owned() {
                    Ok(permit) => permit,
                    Err(_) => {
                        tracing::warn!("connection limit reached, rejecting {peer}");
                        metrics::counter!(cancha::observability::CONNECTIONS_REJECTED_TOTAL).increment(1);
                        drop(socket);
                        continue;
                    }
                };

                info!("connection from {peer}");
                metrics::counter!(cancha::observability::CONNECTIONS_TOTAL).increment(1);
                metrics::gauge!(cancha::observability::CONNECTIONS_ACTIVE).increment(1.0);
                let vm = venue_manager.clone();

                tokio::spawn(async move {
                    let _permit = permit; // held until connection closes
                    if let Err(e) = wire::process_connection(socket, vm).await {
                        tracing::error!("connection error from {peer}: {e}");
                    }
                    metrics::gauge!(cancha::observability::CONNECTIONS_ACTIVE).decrement(1.0);
                });
            }
            _ = &mut shutdown => {
                info!("shutdown signal received, stopping accept loop");
                break;
            }
        }
    }

    // Wait for in-flight connections to finish (up to 10s)
    info!("draining connections...");
    let drain_deadline = tokio::time::sleep(std::time::Duration::from_secs(10));
    tokio::pin!(drain_deadline);

    loop {
        if semaphore.available_permits() == max_connections {
            info!("all connections drained");
            break;
        }
        tokio::select! {
            _ = &mut drain_deadline => {
                let remaining = max_connections - semaphore.available_permits();
                tracing::warn!("drain timeout, {remaining} connections still open");
                break;
            }
            _ = tokio::time::sleep(std::time::Duration::from_millis(100)) => {}
        }
    }

    info!("cancha stopped");
    Ok(())
}
