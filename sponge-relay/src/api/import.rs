//! Contact import endpoints
//!
//! - `GET  /import/start/:provider`   begin an OAuth-consent import
//! - `GET  /import/progress/:import_id` poll the upstream job
//! - `GET  /import/final/:import_id`    fetch imported contacts
//! - `POST /import/:stage/:provider`  begin a direct-login import
//!   (form fields `username`, `password`)
//!
//! Successful responses are the upstream body verbatim, as JSON.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use tracing::{debug, warn};

use crate::error::ApiResult;
use crate::models::{ImportRequest, ImportStage, LoginForm, UpstreamBody};
use crate::AppState;

const ERROR_PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Contact import unavailable</title>
</head>
<body>
    <h1>Something went wrong</h1>
    <p>The contact import request could not be understood. Please start the import again.</p>
</body>
</html>
"#;

/// GET /import/:stage/:param
pub async fn get_import(
    State(state): State<AppState>,
    Path((stage, param)): Path<(String, String)>,
) -> ApiResult<Response> {
    let stage = match stage.parse::<ImportStage>() {
        Ok(stage) => stage,
        Err(unrecognized) => {
            warn!(stage = %unrecognized.0, "Unrecognized import stage");
            return Ok(unknown_stage_response(state.unknown_stage_redirect.as_deref()));
        }
    };

    let request = ImportRequest::from_path(stage, param)?;
    let body = state.relay.dispatch(&request).await?;
    Ok(body.into_response())
}

/// POST /import/:stage/:provider
///
/// Always begins an import; the stage segment is accepted for path
/// compatibility but not used. A form with neither field falls back to the
/// OAuth flow, a form with only one of them is rejected. A body that is not
/// a readable form (wrong content type, undecodable) is treated as no login.
pub async fn post_import(
    State(state): State<AppState>,
    Path((stage, provider)): Path<(String, String)>,
    form: Option<Form<LoginForm>>,
) -> ApiResult<UpstreamBody> {
    if stage != "start" {
        debug!(stage = %stage, "POST import ignores stage segment");
    }

    let login = form
        .map(|Form(form)| form)
        .unwrap_or_default()
        .into_login()?;

    let request = ImportRequest::start(provider, login)?;
    Ok(state.relay.dispatch(&request).await?)
}

/// Generic error page, or a redirect when one is configured
pub fn unknown_stage_response(redirect: Option<&str>) -> Response {
    match redirect {
        Some(target) => Redirect::to(target).into_response(),
        None => (StatusCode::NOT_FOUND, Html(ERROR_PAGE_HTML)).into_response(),
    }
}

/// Build import routes
pub fn import_routes() -> Router<AppState> {
    Router::new().route("/import/:stage/:param", get(get_import).post(post_import))
}
