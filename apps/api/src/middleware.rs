use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use opsdash_core::{AppError, UserIdentity};
use tower_sessions::Session;

use crate::auth::SESSION_USER_KEY;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn require_auth(
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let identity = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

pub async fn require_same_origin_for_mutations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if is_state_changing_method(request.method()) {
        let headers = request.headers();

        if headers
            .get("sec-fetch-site")
            .is_some_and(|fetch_site| fetch_site == HeaderValue::from_static("cross-site"))
        {
            return Err(AppError::Unauthorized("cross-site request blocked".to_owned()).into());
        }

        let origin = headers
            .get(header::ORIGIN)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        let referer = headers
            .get(header::REFERER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        if !origin_is_allowed(&state.frontend_url, origin, referer) {
            return Err(AppError::Unauthorized("origin validation failed".to_owned()).into());
        }
    }

    Ok(next.run(request).await)
}

fn is_state_changing_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

fn origin_is_allowed(frontend_url: &str, origin: &str, referer: &str) -> bool {
    let allowed_origin = frontend_url.trim_end_matches('/');
    if origin == allowed_origin {
        return true;
    }

    referer
        .strip_prefix(allowed_origin)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use axum::http::Method;

    use super::{is_state_changing_method, origin_is_allowed};

    #[test]
    fn reads_are_not_origin_checked() {
        assert!(!is_state_changing_method(&Method::GET));
        assert!(is_state_changing_method(&Method::PATCH));
    }

    #[test]
    fn matching_origin_or_referer_is_allowed() {
        let frontend = "https://dash.example.se";
        assert!(origin_is_allowed(frontend, "https://dash.example.se", ""));
        assert!(origin_is_allowed(
            frontend,
            "",
            "https://dash.example.se/holidays"
        ));
    }

    #[test]
    fn lookalike_hosts_are_rejected() {
        let frontend = "https://dash.example.se";
        assert!(!origin_is_allowed(frontend, "https://evil.example.se", ""));
        assert!(!origin_is_allowed(
            frontend,
            "",
            "https://dash.example.se.evil.test/"
        ));
    }
}
