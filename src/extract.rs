use axum::extract::FromRequest;

use crate::error::AppError;

/// JSON body extractor whose rejection renders as an [`AppError`].
///
/// ```rust,ignore
/// async fn route(JsonBody(input): JsonBody<Input>) { /* ... */ }
/// ```
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);
