use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use base64ct::{Base64, Encoding};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{ChangePasswordRequest, LoginRequest, LoginResponse, SessionResponse},
        error::SessionError,
        extractors::CurrentIdentity,
        identity::{Identity, ProfileUpdate},
    },
    state::AppState,
};

pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;
const PHOTO_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/webp", "image/gif"];

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/session", get(get_session))
        .route("/session/login", post(login))
        .route("/session/logout", post(logout))
}

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/session/profile", get(get_profile).patch(update_profile))
        .route("/session/profile/password", post(change_password))
        .route(
            "/session/profile/photo",
            post(upload_photo).layer(DefaultBodyLimit::max(MAX_PHOTO_BYTES + 64 * 1024)),
        )
}

#[instrument(skip(state))]
pub async fn get_session(State(state): State<AppState>) -> Json<SessionResponse> {
    Json(SessionResponse {
        state: state.session.state().await,
        durable: state.session.is_durable(),
    })
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, String)> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Email and password are required".into(),
        ));
    }

    if !state.session.login(&payload.email, &payload.password).await {
        return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
    }

    let identity = state
        .session
        .current()
        .await
        .ok_or((StatusCode::UNAUTHORIZED, "Invalid credentials".to_string()))?;
    Ok(Json(LoginResponse { identity }))
}

#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>) -> StatusCode {
    state.session.logout().await;
    StatusCode::NO_CONTENT
}

#[instrument(skip_all)]
pub async fn get_profile(CurrentIdentity(identity): CurrentIdentity) -> Json<Identity> {
    Json(identity)
}

#[instrument(skip(state, update))]
pub async fn update_profile(
    State(state): State<AppState>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<Identity>, (StatusCode, String)> {
    validate_update(&update).map_err(|e| {
        warn!(error = %e, "profile update rejected");
        <(StatusCode, String)>::from(e)
    })?;
    let identity = state.session.update_profile(update).await?;
    Ok(Json(identity))
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .session
        .change_password(
            &payload.current_password,
            &payload.new_password,
            &payload.confirm_password,
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Multipart field `photo`; stored on the identity as a data URL.
#[instrument(skip(state, mp))]
pub async fn upload_photo(
    State(state): State<AppState>,
    mut mp: Multipart,
) -> Result<Json<Identity>, (StatusCode, String)> {
    let mut photo = None;
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| (e.status(), e.body_text()))?
    {
        if field.name() != Some("photo") {
            continue;
        }
        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".into());
        let data = field
            .bytes()
            .await
            .map_err(|e| (e.status(), e.body_text()))?;
        photo = Some((content_type, data));
        break;
    }

    let (content_type, data) =
        photo.ok_or((StatusCode::BAD_REQUEST, "photo is required".to_string()))?;
    let data_url = photo_data_url(&content_type, &data)?;

    let identity = state
        .session
        .update_profile(ProfileUpdate {
            profile_photo: Some(data_url),
            ..Default::default()
        })
        .await?;
    info!(identity_id = %identity.id, content_type = %content_type, bytes = data.len(), "profile photo replaced");
    Ok(Json(identity))
}

fn photo_data_url(content_type: &str, data: &[u8]) -> Result<String, (StatusCode, String)> {
    if !PHOTO_TYPES.contains(&content_type) {
        return Err((
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Please upload a JPEG, PNG, WebP, or GIF file".into(),
        ));
    }
    if data.len() > MAX_PHOTO_BYTES {
        return Err((
            StatusCode::PAYLOAD_TOO_LARGE,
            "Please upload an image smaller than 5MB".into(),
        ));
    }
    Ok(format!(
        "data:{content_type};base64,{}",
        Base64::encode_string(data)
    ))
}

fn validate_update(update: &ProfileUpdate) -> Result<(), SessionError> {
    if update.is_empty() {
        return Err(SessionError::Invalid("nothing to update".into()));
    }
    if let Some(name) = &update.name {
        if name.trim().is_empty() {
            return Err(SessionError::Invalid("Name is required".into()));
        }
    }
    if let Some(email) = &update.email {
        if !is_valid_email(email) {
            return Err(SessionError::Invalid("Invalid email".into()));
        }
    }
    Ok(())
}
