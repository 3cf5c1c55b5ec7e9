//! Profile handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    response::Json,
    routing::{get, patch, post},
    Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::{AdminLevel, ContactUpdate, ProfileResponse, Role, RoleDetails};
use crate::errors::AppResult;
use crate::types::{Paginated, PaginationParams};

/// Contact fields update; omitted fields are left untouched
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateContactRequest {
    pub avatar: Option<String>,
    #[validate(length(max = 32, message = "Phone number is too long"))]
    pub phone: Option<String>,
    #[validate(length(max = 1000, message = "Bio is too long"))]
    pub bio: Option<String>,
}

/// Admin promotion request
#[derive(Debug, Deserialize, ToSchema)]
pub struct PromoteRequest {
    pub admin_level: AdminLevel,
}

/// Role filter for the admin listing
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListProfilesQuery {
    pub role: Role,
}

/// Create profile routes (all require authentication)
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_my_profile).patch(update_my_contact))
        .route("/me/details", patch(update_my_details))
        .route("/", get(list_profiles))
        .route("/:id", get(get_profile).delete(deactivate_profile))
        .route("/:id/promote", post(promote_profile))
}

/// Get the caller's own profile
#[utoipa::path(
    get,
    path = "/profiles/me",
    tag = "Profiles",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's profile", body = ProfileResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_my_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<ProfileResponse>> {
    let profile = state.profile_service.get_by_account(user.id).await?;
    Ok(Json(ProfileResponse::from(profile)))
}

/// Update the caller's contact fields
#[utoipa::path(
    patch,
    path = "/profiles/me",
    tag = "Profiles",
    security(("bearer_auth" = [])),
    request_body = UpdateContactRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 400, description = "Validation error")
    )
)]
pub async fn update_my_contact(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<UpdateContactRequest>,
) -> AppResult<Json<ProfileResponse>> {
    let profile = state.profile_service.get_by_account(user.id).await?;
    let updated = state
        .profile_service
        .update_contact(
            profile.id,
            ContactUpdate {
                avatar: payload.avatar,
                phone: payload.phone,
                bio: payload.bio,
            },
        )
        .await?;
    Ok(Json(ProfileResponse::from(updated)))
}

/// Replace the caller's role-specific fields.
///
/// The submitted variant must match the caller's role; anything else is
/// rejected, which is what keeps teacher fields out of student profiles.
#[utoipa::path(
    patch,
    path = "/profiles/me/details",
    tag = "Profiles",
    security(("bearer_auth" = [])),
    request_body = RoleDetails,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 400, description = "Variant does not match the profile's role")
    )
)]
pub async fn update_my_details(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(details): Json<RoleDetails>,
) -> AppResult<Json<ProfileResponse>> {
    let profile = state.profile_service.get_by_account(user.id).await?;
    let updated = state
        .profile_service
        .update_details(profile.id, details)
        .await?;
    Ok(Json(ProfileResponse::from(updated)))
}

/// List profiles of a role (admin only)
#[utoipa::path(
    get,
    path = "/profiles",
    tag = "Profiles",
    security(("bearer_auth" = [])),
    params(ListProfilesQuery, PaginationParams),
    responses(
        (status = 200, description = "Profiles of the requested role"),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn list_profiles(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(filter): Query<ListProfilesQuery>,
    Query(pagination): Query<PaginationParams>,
) -> AppResult<Json<Paginated<ProfileResponse>>> {
    require_admin(&user)?;

    let page = pagination.page;
    let per_page = pagination.limit();
    let (profiles, total) = state
        .profile_service
        .list_by_role(filter.role, pagination)
        .await?;

    let data = profiles.into_iter().map(ProfileResponse::from).collect();
    Ok(Json(Paginated::new(data, page, per_page, total)))
}

/// Get a profile by id (self or admin)
#[utoipa::path(
    get,
    path = "/profiles/{id}",
    tag = "Profiles",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Profile id")),
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 404, description = "No such profile")
    )
)]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ProfileResponse>> {
    let profile = state.profile_service.get_profile(id).await?;
    if profile.account_id != user.id {
        require_admin(&user)?;
    }
    Ok(Json(ProfileResponse::from(profile)))
}

/// Promote a profile to admin (admin only)
#[utoipa::path(
    post,
    path = "/profiles/{id}/promote",
    tag = "Profiles",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Profile id")),
    request_body = PromoteRequest,
    responses(
        (status = 200, description = "Promoted profile", body = ProfileResponse),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No such profile")
    )
)]
pub async fn promote_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PromoteRequest>,
) -> AppResult<Json<ProfileResponse>> {
    require_admin(&user)?;
    let profile = state
        .profile_service
        .promote_to_admin(id, payload.admin_level)
        .await?;
    Ok(Json(ProfileResponse::from(profile)))
}

/// Deactivate a profile (admin only)
#[utoipa::path(
    delete,
    path = "/profiles/{id}",
    tag = "Profiles",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Profile id")),
    responses(
        (status = 200, description = "Deactivated profile", body = ProfileResponse),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn deactivate_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ProfileResponse>> {
    require_admin(&user)?;
    let profile = state.profile_service.deactivate(id).await?;
    Ok(Json(ProfileResponse::from(profile)))
}
