use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use accountsync_core::account::AccountNumber;

use crate::{handlers::AppError, state::AppState};

/// Resolve an account by number (GET /api/accounts/{number}).
pub async fn get_account(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Response, AppError> {
    let number = AccountNumber::new(number)?;

    match state.accounts.get_account(&number).await? {
        Some(account) => Ok(Json(account).into_response()),
        None => {
            tracing::debug!(%number, "Account not found");
            Ok((
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({ "error": "account not found" })),
            )
                .into_response())
        }
    }
}
