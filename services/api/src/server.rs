use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryRequestRepository, InMemorySessionStore};
use crate::routes::with_request_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};
use veridaq::config::{AppConfig, AppEnvironment};
use veridaq::error::AppError;
use veridaq::requests::{IndividualRequestService, RequestApiState};
use veridaq::session::{SessionData, SessionOptions};
use veridaq::telemetry;

const DEVELOPMENT_SESSION_TOKEN: &str = "dev-issuer";

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let session_options = SessionOptions::from_config(&config.session, config.environment);
    let sessions = Arc::new(InMemorySessionStore::default());
    if config.environment == AppEnvironment::Development {
        sessions.insert(
            DEVELOPMENT_SESSION_TOKEN,
            SessionData::logged_in("dev-user", "issuer@veridaq.local"),
        );
        warn!(
            cookie = %session_options.set_cookie_header(DEVELOPMENT_SESSION_TOKEN),
            "development session seeded"
        );
    }

    let repository = Arc::new(InMemoryRequestRepository::default());
    let api_state = Arc::new(RequestApiState {
        service: Arc::new(IndividualRequestService::new(repository)),
        sessions,
        session_options,
    });

    let app = with_request_routes(api_state)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "veridaq request intake ready");

    axum::serve(listener, app).await?;
    Ok(())
}
