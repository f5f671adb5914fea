//! Runtime settings endpoint
//!
//! The settings table is the source of truth; an update writes the rows
//! and swaps the engine's live parameters in the same request, so no
//! restart is needed.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use trackelo_common::db::settings::{set_setting, SETTING_K_FACTOR, SETTING_PROPAGATION_THRESHOLD};

use crate::engine::EngineParams;
use crate::error::{Error, Result};
use crate::AppState;

/// Settings payload, both directions
#[derive(Debug, Serialize, Deserialize)]
pub struct SettingsBody {
    pub rating_k_factor: f64,
    pub global_propagation_threshold: i64,
}

/// GET /api/settings
pub async fn get_settings(State(state): State<AppState>) -> Json<SettingsBody> {
    let params = state.engine.params().await;

    Json(SettingsBody {
        rating_k_factor: params.k_factor,
        global_propagation_threshold: params.propagation_threshold,
    })
}

/// PUT /api/settings
///
/// K must be a positive finite number; the threshold must be zero or
/// more (zero turns playlist-to-global propagation off entirely).
pub async fn update_settings(
    State(state): State<AppState>,
    Json(body): Json<SettingsBody>,
) -> Result<Json<SettingsBody>> {
    if !body.rating_k_factor.is_finite() || body.rating_k_factor <= 0.0 {
        return Err(Error::BadRequest(format!(
            "rating_k_factor must be positive, got {}",
            body.rating_k_factor
        )));
    }
    if body.global_propagation_threshold < 0 {
        return Err(Error::BadRequest(format!(
            "global_propagation_threshold must be >= 0, got {}",
            body.global_propagation_threshold
        )));
    }

    set_setting(
        &state.db,
        SETTING_K_FACTOR,
        &body.rating_k_factor.to_string(),
    )
    .await?;
    set_setting(
        &state.db,
        SETTING_PROPAGATION_THRESHOLD,
        &body.global_propagation_threshold.to_string(),
    )
    .await?;

    state
        .engine
        .set_params(EngineParams {
            k_factor: body.rating_k_factor,
            propagation_threshold: body.global_propagation_threshold,
        })
        .await;

    info!(
        "Settings updated: k_factor={}, propagation_threshold={}",
        body.rating_k_factor, body.global_propagation_threshold
    );

    Ok(Json(body))
}
