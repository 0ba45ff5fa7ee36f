//! Interactive API documentation. Both routes are unauthenticated.

use crate::error::AppError;
use crate::extractors::RequestContext;
use crate::openapi::{self, ApiInfo, OPENAPI_VERSION};
use crate::state::AppState;
use axum::{extract::State, response::Html, Json};
use serde_json::Value;

const SWAGGER_UI_VERSION: &str = "5.11.0";

/// Swagger UI page that loads `{api_root}/docs/openapi.json`.
pub fn swagger_page(api_root: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="UTF-8">
    <title>Zero Code REST API</title>
    <link rel="stylesheet" type="text/css" href="https://cdnjs.cloudflare.com/ajax/libs/swagger-ui/{v}/swagger-ui.css" />
  </head>
  <body>
    <div id="swagger-ui"></div>
    <script src="https://cdnjs.cloudflare.com/ajax/libs/swagger-ui/{v}/swagger-ui-bundle.js" charset="UTF-8"></script>
    <script>
    window.onload = function() {{
      window.ui = SwaggerUIBundle({{
        url: "{root}/docs/openapi.json",
        dom_id: '#swagger-ui',
        deepLinking: true,
        persistAuthorization: true
      }});
    }};
    </script>
  </body>
</html>
"#,
        v = SWAGGER_UI_VERSION,
        root = api_root
    )
}

pub async fn swagger_ui(State(state): State<AppState>) -> Html<String> {
    Html(swagger_page(&state.settings.api_root))
}

/// Document of the snapshot the current routes were registered from.
pub async fn openapi_json(State(state): State<AppState>, ctx: RequestContext) -> Result<Json<Value>, AppError> {
    state.settings.database_client.ensure_supported()?;
    let snapshot = state.cache.load();
    let server_url = format!("{}{}", ctx.host_base(), state.settings.api_root);
    let info = ApiInfo::from_settings(&state.settings);
    Ok(Json(openapi::generate(&info, &snapshot, &server_url, OPENAPI_VERSION)))
}
