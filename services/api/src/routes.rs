use crate::infra::{AppState, EngineState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use partner_plan::error::AppError;
use partner_plan::plan::{
    partners_from_reader, OptimizationRequest, OptimizationResult, Partner, PlayerProfile,
    QualificationRank, StructureAssessment,
};
use partner_plan::scenarios::{self, ScenarioReport};
use serde::Deserialize;
use serde_json::json;
use std::io::Cursor;

#[derive(Debug, Deserialize)]
pub(crate) struct OptimizeApiRequest {
    pub(crate) profile: PlayerProfile,
    #[serde(default)]
    pub(crate) target_qualification: Option<QualificationRank>,
    #[serde(default)]
    pub(crate) partner_count: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssessApiRequest {
    pub(crate) profile: PlayerProfile,
    /// Inline partner roster; ignored when `roster_csv` is present.
    #[serde(default)]
    pub(crate) partners: Vec<Partner>,
    /// CSV roster with a `volume,qualification,active,region` header.
    #[serde(default)]
    pub(crate) roster_csv: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScenariosApiRequest {
    pub(crate) profile: PlayerProfile,
    /// Target rank to size scenarios for; defaults to the plan's flagship B3.
    #[serde(default)]
    pub(crate) target_qualification: Option<QualificationRank>,
}

pub(crate) fn router(engine: EngineState) -> axum::Router {
    axum::Router::new()
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/optimize", axum::routing::post(optimize_endpoint))
        .route("/api/v1/assess", axum::routing::post(assess_endpoint))
        .route("/api/v1/scenarios", axum::routing::post(scenarios_endpoint))
        .layer(Extension(engine))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn optimize_endpoint(
    Extension(engine): Extension<EngineState>,
    Json(payload): Json<OptimizeApiRequest>,
) -> Result<Json<OptimizationResult>, AppError> {
    let request = OptimizationRequest {
        profile: payload.profile,
        target_qualification: payload.target_qualification,
        partner_count: payload.partner_count,
    };
    let result = engine.0.optimize(&request)?;
    Ok(Json(result))
}

pub(crate) async fn assess_endpoint(
    Extension(engine): Extension<EngineState>,
    Json(payload): Json<AssessApiRequest>,
) -> Result<Json<StructureAssessment>, AppError> {
    let partners = match payload.roster_csv {
        Some(csv) => partners_from_reader(Cursor::new(csv.into_bytes()))?,
        None => payload.partners,
    };
    let assessment = engine.0.assess(&payload.profile, &partners)?;
    Ok(Json(assessment))
}

pub(crate) async fn scenarios_endpoint(
    Extension(engine): Extension<EngineState>,
    Json(payload): Json<ScenariosApiRequest>,
) -> Result<Json<Vec<ScenarioReport>>, AppError> {
    let target = payload
        .target_qualification
        .unwrap_or(QualificationRank::B3);
    let reports = scenarios::generate(&engine.0, &payload.profile, target)?;
    Ok(Json(reports))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use partner_plan::optimizer::StructureOptimizer;
    use partner_plan::plan::{PlanConfig, Region};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn engine() -> EngineState {
        EngineState(Arc::new(
            StructureOptimizer::new(PlanConfig::default()).expect("plan valid"),
        ))
    }

    fn profile() -> PlayerProfile {
        PlayerProfile {
            personal_volume: 200.0,
            qualification: QualificationRank::M1,
            target_income: 5_000.0,
            region: Region::Ru,
        }
    }

    #[tokio::test]
    async fn optimize_endpoint_returns_a_structure() {
        let request = OptimizeApiRequest {
            profile: profile(),
            target_qualification: None,
            partner_count: Some(10),
        };
        let Json(body) = optimize_endpoint(Extension(engine()), Json(request))
            .await
            .expect("optimization succeeds");

        assert_eq!(body.partners.len(), 10);
        assert!(body.expected_income.total > 0.0);
    }

    #[tokio::test]
    async fn assess_endpoint_accepts_a_csv_roster() {
        let request = AssessApiRequest {
            profile: profile(),
            partners: Vec::new(),
            roster_csv: Some(
                "volume,qualification,active,region\n4000,M3,true,RU\n3000,M3,true,RU\n"
                    .to_string(),
            ),
        };
        let Json(body) = assess_endpoint(Extension(engine()), Json(request))
            .await
            .expect("assessment succeeds");

        assert!((body.group_volume - 7_200.0).abs() < 1e-9);
        assert_eq!(body.qualification, QualificationRank::B1);
    }

    #[tokio::test]
    async fn scenarios_endpoint_defaults_the_target_rank() {
        let request = ScenariosApiRequest {
            profile: profile(),
            target_qualification: None,
        };
        let Json(body) = scenarios_endpoint(Extension(engine()), Json(request))
            .await
            .expect("scenarios build");

        assert_eq!(body.len(), 3);
    }

    #[tokio::test]
    async fn invalid_income_maps_to_bad_request() {
        let mut bad_profile = profile();
        bad_profile.target_income = 0.0;
        let payload =
            serde_json::to_string(&json!({ "profile": bad_profile })).expect("serializes");

        let response = router(engine())
            .oneshot(
                Request::post("/api/v1/optimize")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn healthcheck_reports_ok_through_the_router() {
        let response = router(engine())
            .oneshot(
                Request::get("/health")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
    }
}
