use metrics_exporter_prometheus::PrometheusHandle;
use partner_plan::optimizer::StructureOptimizer;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Operational state shared with the health/metrics endpoints.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// The optimization engine shared by the API handlers. The engine is pure and
/// stateless, so one instance serves all requests concurrently.
#[derive(Clone)]
pub(crate) struct EngineState(pub(crate) Arc<StructureOptimizer>);
