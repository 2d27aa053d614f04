use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};

use super::identity::Identity;
use crate::state::AppState;

/// Resolves the signed-in identity, rejecting the request otherwise.
pub struct CurrentIdentity(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for CurrentIdentity {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if state.session.is_initializing().await {
            return Err((
                StatusCode::SERVICE_UNAVAILABLE,
                "session store is still initializing".into(),
            ));
        }
        state
            .session
            .current()
            .await
            .map(CurrentIdentity)
            .ok_or((StatusCode::UNAUTHORIZED, "not logged in".into()))
    }
}
