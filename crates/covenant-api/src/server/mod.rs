use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use covenant_core::console::{ConsoleError, OperatorConsole};
use covenant_core::identity::demo_directory;
use covenant_model::{
    ApiError, ContractHandle, ContractSnapshot, ContractStatus, ErrorCode, StatusChange,
    SCHEMA_VERSION_V1,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

include!("error.rs");
include!("state.rs");
include!("routes.rs");

pub async fn serve(addr: SocketAddr) -> Result<(), ServerError> {
    let state = AppState::new(OperatorConsole::with_defaults(demo_directory()));
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/v1/contracts",
            post(create_contract).get(list_contracts),
        )
        .route("/api/v1/contracts/{handle}", get(get_contract))
        .route("/api/v1/contracts/{handle}/advance", post(advance_contract))
        .route("/api/v1/changes", get(get_changes))
        .route("/api/v1/presets", get(get_presets))
        .with_state(state)
}
