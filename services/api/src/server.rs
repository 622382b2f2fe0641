use crate::cli::ServeArgs;
use crate::infra::{AppState, EngineState};
use crate::routes::router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use partner_plan::config::AppConfig;
use partner_plan::error::AppError;
use partner_plan::optimizer::{OptimizeError, StructureOptimizer};
use partner_plan::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, config.environment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let optimizer =
        StructureOptimizer::new(config.plan.clone()).map_err(OptimizeError::from)?;
    let engine = EngineState(Arc::new(optimizer));

    let app = router(engine)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "structure optimization service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
