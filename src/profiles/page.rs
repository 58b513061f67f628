use axum::{debug_handler, extract::{Path, Query, State}, Json};
use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    db::{models::{Profile, ProfileAggregate, Visibility}, profiles},
    policy::{self, Action},
    principal::Principal,
    required, AppError, AppResult, AppState, Payload,
};

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn index(
    State(db_pool): State<SqlitePool>,
    Query(SearchQuery { query }): Query<SearchQuery>,
) -> AppResult<Json<Vec<Profile>>> {
    Ok(Json(profiles::search_public(&db_pool, query.trim()).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn view(
    State(db_pool): State<SqlitePool>,
    principal: Option<Principal>,
    Path(profile_id): Path<Uuid>,
) -> AppResult<Json<ProfileAggregate>> {
    let profile = profiles::find_by_id(&db_pool, profile_id)
        .await?
        .ok_or_else(|| AppError::not_found("profile"))?;

    let resource = super::as_resource(&db_pool, principal.as_ref(), &profile).await?;
    policy::evaluate(principal.as_ref(), resource, Action::View).require()?;

    let mut aggregate = profiles::load_aggregate(&db_pool, profile.id)
        .await?
        .ok_or_else(|| AppError::not_found("profile"))?;

    if principal.as_ref().is_none_or(|p| p.user_id != profile.user_id) {
        aggregate.hide_unapproved_comments();
    }
    Ok(Json(aggregate))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfile {
    pub name: String,
    #[serde(default)]
    pub visibility: Visibility,
}

#[debug_handler(state = AppState)]
pub(crate) async fn update(
    State(db_pool): State<SqlitePool>,
    principal: Principal,
    Payload(form): Payload<UpdateProfile>,
) -> AppResult<Json<Profile>> {
    let mut profile = super::own_profile(&db_pool, &principal).await?;
    let resource = super::as_resource(&db_pool, Some(&principal), &profile).await?;
    policy::evaluate(Some(&principal), resource, Action::Edit).require()?;

    profile.name = required(&form.name, "name")?.to_owned();
    profile.visibility = form.visibility;
    profiles::update(&db_pool, profile.id, &profile.name, profile.visibility).await?;

    tracing::info!(profile_id = %profile.id, visibility = ?profile.visibility, "profile updated");
    Ok(Json(profile))
}
