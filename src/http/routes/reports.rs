// Report endpoints. Every route needs a bearer token.

use crate::core::reports::{
    Acknowledgement, ModeratedReport, ModerationDecision, ModerationReport, NewReport, OwnReport,
    ReportStatus, ReportTargetKind, SubmittedReport,
};
use crate::http::auth::AuthUser;
use crate::http::error::{ApiError, ApiJson, ApiQuery};
use crate::http::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reports/users/:userId", post(report_user))
        .route("/reports/resources/:resourceId", post(report_resource))
        .route(
            "/reports/resource-versions/:versionId",
            post(report_resource_version),
        )
        .route(
            "/reports/resource-comments/:commentId",
            post(report_resource_comment),
        )
        .route("/reports/showcase-posts/:postId", post(report_showcase_post))
        .route(
            "/reports/showcase-comments/:commentId",
            post(report_showcase_comment),
        )
        .route("/reports/servers/:serverId", post(report_server))
        .route("/reports/me", get(my_reports))
        .route("/reports/:reportId", get(my_report).delete(cancel_report))
        .route("/reports/moderation/all", get(all_reports))
        .route(
            "/reports/moderation/:reportId",
            get(report_for_moderation)
                .patch(moderate_report)
                .delete(delete_report),
        )
}

type Created<T> = (StatusCode, Json<T>);

async fn submit(
    state: AppState,
    user: AuthUser,
    kind: ReportTargetKind,
    target_id: String,
    body: NewReport,
) -> Result<Created<SubmittedReport>, ApiError> {
    let report = state
        .reports
        .report_target(&user.user_id, kind, &target_id, body)
        .await?;
    Ok((StatusCode::CREATED, Json(report)))
}

async fn report_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<String>,
    ApiJson(body): ApiJson<NewReport>,
) -> Result<Created<SubmittedReport>, ApiError> {
    let report = state
        .reports
        .report_user(&user.user_id, &user_id, body)
        .await?;
    Ok((StatusCode::CREATED, Json(report)))
}

async fn report_resource(
    State(state): State<AppState>,
    user: AuthUser,
    Path(resource_id): Path<String>,
    ApiJson(body): ApiJson<NewReport>,
) -> Result<Created<SubmittedReport>, ApiError> {
    submit(state, user, ReportTargetKind::Resource, resource_id, body).await
}

async fn report_resource_version(
    State(state): State<AppState>,
    user: AuthUser,
    Path(version_id): Path<String>,
    ApiJson(body): ApiJson<NewReport>,
) -> Result<Created<SubmittedReport>, ApiError> {
    submit(state, user, ReportTargetKind::ResourceVersion, version_id, body).await
}

async fn report_resource_comment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(comment_id): Path<String>,
    ApiJson(body): ApiJson<NewReport>,
) -> Result<Created<SubmittedReport>, ApiError> {
    submit(state, user, ReportTargetKind::ResourceComment, comment_id, body).await
}

async fn report_showcase_post(
    State(state): State<AppState>,
    user: AuthUser,
    Path(post_id): Path<String>,
    ApiJson(body): ApiJson<NewReport>,
) -> Result<Created<SubmittedReport>, ApiError> {
    submit(state, user, ReportTargetKind::ShowcasePost, post_id, body).await
}

async fn report_showcase_comment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(comment_id): Path<String>,
    ApiJson(body): ApiJson<NewReport>,
) -> Result<Created<SubmittedReport>, ApiError> {
    submit(
        state,
        user,
        ReportTargetKind::ShowcasePostComment,
        comment_id,
        body,
    )
    .await
}

async fn report_server(
    State(state): State<AppState>,
    user: AuthUser,
    Path(server_id): Path<String>,
    ApiJson(body): ApiJson<NewReport>,
) -> Result<Created<SubmittedReport>, ApiError> {
    submit(state, user, ReportTargetKind::Server, server_id, body).await
}

async fn my_reports(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<OwnReport>>, ApiError> {
    Ok(Json(state.reports.get_my_reports(&user.user_id).await?))
}

async fn my_report(
    State(state): State<AppState>,
    user: AuthUser,
    Path(report_id): Path<String>,
) -> Result<Json<OwnReport>, ApiError> {
    Ok(Json(
        state.reports.get_my_report(&user.user_id, &report_id).await?,
    ))
}

async fn cancel_report(
    State(state): State<AppState>,
    user: AuthUser,
    Path(report_id): Path<String>,
) -> Result<Json<Acknowledgement>, ApiError> {
    Ok(Json(
        state.reports.cancel_report(&user.user_id, &report_id).await?,
    ))
}

#[derive(Debug, Deserialize)]
struct StatusFilter {
    status: Option<String>,
}

async fn all_reports(
    State(state): State<AppState>,
    user: AuthUser,
    ApiQuery(filter): ApiQuery<StatusFilter>,
) -> Result<Json<Vec<ModerationReport>>, ApiError> {
    let status = match filter.status.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(
            ReportStatus::parse(raw)
                .ok_or_else(|| ApiError::BadRequest(format!("Invalid status: {}", raw)))?,
        ),
    };

    Ok(Json(
        state.reports.get_all_reports(&user.user_id, status).await?,
    ))
}

async fn report_for_moderation(
    State(state): State<AppState>,
    user: AuthUser,
    Path(report_id): Path<String>,
) -> Result<Json<ModerationReport>, ApiError> {
    Ok(Json(
        state
            .reports
            .get_report_by_id(&user.user_id, &report_id)
            .await?,
    ))
}

async fn moderate_report(
    State(state): State<AppState>,
    user: AuthUser,
    Path(report_id): Path<String>,
    ApiJson(decision): ApiJson<ModerationDecision>,
) -> Result<Json<ModeratedReport>, ApiError> {
    Ok(Json(
        state
            .reports
            .moderate_report(&user.user_id, &report_id, decision)
            .await?,
    ))
}

async fn delete_report(
    State(state): State<AppState>,
    user: AuthUser,
    Path(report_id): Path<String>,
) -> Result<Json<Acknowledgement>, ApiError> {
    Ok(Json(
        state.reports.delete_report(&user.user_id, &report_id).await?,
    ))
}
