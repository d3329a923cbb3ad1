// Badge endpoints. Reads are public; writes need a bearer token.

use crate::core::badges::{
    AwardRequest, AwardedBadge, Badge, BadgeUpdate, BadgeWithCount, NewBadge, UserBadge,
    UserBadgeEntry,
};
use crate::http::auth::AuthUser;
use crate::http::error::{ApiError, ApiJson, ApiQuery};
use crate::http::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/badges", get(list_badges).post(create_badge))
        .route("/badges/award", get(badge_named_award).post(award_badge))
        .route("/badges/slug/:slug", get(badge_by_slug))
        .route("/badges/users/:userId", get(user_badges))
        .route(
            "/badges/:badgeId",
            get(get_badge).patch(update_badge).delete(delete_badge),
        )
        .route("/badges/:badgeId/users/:userId", delete(revoke_badge))
}

#[derive(Debug, Deserialize)]
struct ActiveFilter {
    #[serde(rename = "isActive")]
    is_active: Option<String>,
}

impl ActiveFilter {
    /// Only the literal strings filter; anything else lists everything.
    fn as_bool(&self) -> Option<bool> {
        match self.is_active.as_deref() {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        }
    }
}

async fn list_badges(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<ActiveFilter>,
) -> Result<Json<Vec<BadgeWithCount>>, ApiError> {
    Ok(Json(state.badges.list_badges(filter.as_bool()).await?))
}

async fn get_badge(
    State(state): State<AppState>,
    Path(badge_id): Path<String>,
) -> Result<Json<BadgeWithCount>, ApiError> {
    Ok(Json(state.badges.get_badge(&badge_id).await?))
}

/// `/badges/award` shadows `/badges/:badgeId`, so GET still resolves it as an id.
async fn badge_named_award(
    State(state): State<AppState>,
) -> Result<Json<BadgeWithCount>, ApiError> {
    Ok(Json(state.badges.get_badge("award").await?))
}

async fn badge_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<BadgeWithCount>, ApiError> {
    Ok(Json(state.badges.get_badge_by_slug(&slug).await?))
}

async fn user_badges(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<UserBadgeEntry>>, ApiError> {
    Ok(Json(state.badges.get_user_badges(&user_id).await?))
}

async fn create_badge(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(body): ApiJson<NewBadge>,
) -> Result<(StatusCode, Json<Badge>), ApiError> {
    let badge = state.badges.create_badge(&user.user_id, body).await?;
    Ok((StatusCode::CREATED, Json(badge)))
}

async fn update_badge(
    State(state): State<AppState>,
    user: AuthUser,
    Path(badge_id): Path<String>,
    ApiJson(body): ApiJson<BadgeUpdate>,
) -> Result<Json<Badge>, ApiError> {
    Ok(Json(
        state
            .badges
            .update_badge(&user.user_id, &badge_id, body)
            .await?,
    ))
}

async fn delete_badge(
    State(state): State<AppState>,
    user: AuthUser,
    Path(badge_id): Path<String>,
) -> Result<Json<Badge>, ApiError> {
    Ok(Json(
        state.badges.delete_badge(&user.user_id, &badge_id).await?,
    ))
}

async fn award_badge(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(body): ApiJson<AwardRequest>,
) -> Result<(StatusCode, Json<AwardedBadge>), ApiError> {
    let awarded = state.badges.award_badge(&user.user_id, body).await?;
    Ok((StatusCode::CREATED, Json(awarded)))
}

async fn revoke_badge(
    State(state): State<AppState>,
    user: AuthUser,
    Path((badge_id, user_id)): Path<(String, String)>,
) -> Result<Json<UserBadge>, ApiError> {
    Ok(Json(
        state
            .badges
            .revoke_badge(&user.user_id, &badge_id, &user_id)
            .await?,
    ))
}
