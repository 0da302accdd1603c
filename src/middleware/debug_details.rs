use axum::{
    Json,
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{config::Environment, error::RenderedError, state::AppState};

/// Outside production, re-render error bodies with the error's debug text.
pub async fn debug_details(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let Some(rendered) = response.extensions_mut().remove::<RenderedError>() else {
        return response;
    };
    if state.environment == Environment::Production {
        return response;
    }

    let RenderedError { mut body, debug } = rendered;
    if let Some(data) = body.data.as_mut() {
        data.debug = Some(debug);
    }
    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Json(body).into_response().into_body())
}
