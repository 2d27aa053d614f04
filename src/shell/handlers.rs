use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::view::ShellView;
use crate::state::AppState;

pub fn shell_routes() -> Router<AppState> {
    Router::new()
        .route("/shell", get(render_root))
        .route("/shell/*path", get(render_path))
}

#[instrument(skip(state))]
pub async fn render_root(State(state): State<AppState>) -> (StatusCode, Json<ShellView>) {
    render(&state, "/").await
}

#[instrument(skip(state))]
pub async fn render_path(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> (StatusCode, Json<ShellView>) {
    render(&state, &format!("/{}", path.trim_start_matches('/'))).await
}

async fn render(state: &AppState, path: &str) -> (StatusCode, Json<ShellView>) {
    let session = state.session.state().await;
    let view = state.shell.render(&session, path);
    let status = match view {
        ShellView::NotFound { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::OK,
    };
    (status, Json(view))
}

#[cfg(test)]
mod tests {
    use crate::app::build_app;
    use crate::state::AppState;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    async fn get(state: &AppState, uri: &str) -> (StatusCode, Value) {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let res = build_app(state.clone()).oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn shell_follows_session_lifecycle() {
        let state = AppState::fake();

        let (_, body) = get(&state, "/api/v1/shell/admin/dashboard").await;
        assert_eq!(body["view"], "loading");

        state.session.initialize().await;
        let (_, body) = get(&state, "/api/v1/shell/admin/dashboard").await;
        assert_eq!(body["view"], "login");

        assert!(state.session.login("admin@grademe.com", "password123").await);
        let (_, body) = get(&state, "/api/v1/shell").await;
        assert_eq!(body["view"], "redirect");
        assert_eq!(body["to"], "/admin/dashboard");

        let (status, body) = get(&state, "/api/v1/shell/admin/dashboard").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["view"], "page");
        assert_eq!(body["user"]["name"], "Admin User");
        assert_eq!(body["content"]["kind"], "admin_dashboard");
        assert_eq!(body["content"]["recent_exams"][0]["title"], "Mathematics Final");

        state.session.logout().await;
        let (_, body) = get(&state, "/api/v1/shell/admin/dashboard").await;
        assert_eq!(body["view"], "login");
    }

    #[tokio::test]
    async fn admin_cannot_open_student_pages() {
        let state = AppState::fake();
        state.session.initialize().await;
        assert!(state.session.login("admin@grademe.com", "password123").await);

        let (_, body) = get(&state, "/api/v1/shell/student/history").await;
        assert_eq!(body["view"], "redirect");
        assert_eq!(body["to"], "/admin/dashboard");
    }

    #[tokio::test]
    async fn unknown_page_is_not_found() {
        let state = AppState::fake();
        state.session.initialize().await;
        assert!(state.session.login("kasun@student.com", "password123").await);

        let (status, body) = get(&state, "/api/v1/shell/student/grades").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["view"], "not_found");
        assert_eq!(body["navigation"].as_array().unwrap().len(), 4);
    }
}
