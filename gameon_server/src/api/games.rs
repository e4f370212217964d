//! Game management API handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gameon::game::models::{
    Game, GameParticipant, GameStatus, GameType, NewGame, TournamentStructure, UserId,
};
use gameon::Cents;

use super::{game_error_response, ApiError, AppState, ErrorResponse};

#[derive(Debug, Deserialize)]
pub struct CreateGamePayload {
    pub name: String,
    pub game_type_id: i64,
    pub structure_id: i64,
    pub location: String,
    pub datetime: DateTime<Utc>,
    pub max_players: i32,
    /// Entry fee in cents.
    pub entry_fee: Cents,
    #[serde(default)]
    pub is_private: bool,
    /// Comma-separated `place:percent` pairs, e.g. `"1:60,2:40"`.
    pub payout_structure: String,
}

#[derive(Debug, Deserialize)]
pub struct ListGamesQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct JoinGamePayload {
    /// Optional user id of whoever referred this player into the game.
    pub referrer_id: Option<UserId>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusPayload {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct CompleteGamePayload {
    /// User ids in finishing order, first place first.
    pub placements: Vec<UserId>,
}

#[derive(Debug, Serialize)]
pub struct PayoutEntry {
    pub user_id: UserId,
    pub amount: Cents,
}

fn bad_request(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
            code: "validation_error".to_string(),
        }),
    )
}

fn parse_status(s: &str) -> Result<GameStatus, ApiError> {
    GameStatus::parse(s).ok_or_else(|| bad_request(&format!("unknown status {s:?}")))
}

/// List all game types.
pub async fn list_game_types(
    State(state): State<AppState>,
) -> Result<Json<Vec<GameType>>, ApiError> {
    let types = state
        .store
        .list_game_types()
        .await
        .map_err(game_error_response)?;
    Ok(Json(types))
}

/// List all tournament structures.
pub async fn list_structures(
    State(state): State<AppState>,
) -> Result<Json<Vec<TournamentStructure>>, ApiError> {
    let structures = state
        .store
        .list_structures()
        .await
        .map_err(game_error_response)?;
    Ok(Json(structures))
}

/// List games, optionally filtered by status (`?status=scheduled`).
pub async fn list_games(
    State(state): State<AppState>,
    Query(query): Query<ListGamesQuery>,
) -> Result<Json<Vec<Game>>, ApiError> {
    let status = match query.status.as_deref() {
        Some(s) => Some(parse_status(s)?),
        None => None,
    };
    let games = state
        .game_manager
        .list_games(status)
        .await
        .map_err(game_error_response)?;
    Ok(Json(games))
}

/// Get a single game by id.
pub async fn get_game(
    State(state): State<AppState>,
    Path(game_id): Path<i64>,
) -> Result<Json<Game>, ApiError> {
    let game = state
        .game_manager
        .get_game(game_id)
        .await
        .map_err(game_error_response)?;
    Ok(Json(game))
}

/// List a game's participants.
pub async fn list_participants(
    State(state): State<AppState>,
    Path(game_id): Path<i64>,
) -> Result<Json<Vec<GameParticipant>>, ApiError> {
    let participants = state
        .game_manager
        .list_participants(game_id)
        .await
        .map_err(game_error_response)?;
    Ok(Json(participants))
}

/// Create a game. The authenticated user becomes its game master.
pub async fn create_game(
    State(state): State<AppState>,
    Extension(user_id): Extension<i64>,
    Json(payload): Json<CreateGamePayload>,
) -> Result<(StatusCode, Json<Game>), ApiError> {
    let game = state
        .game_manager
        .create_game(NewGame {
            name: payload.name,
            game_master_id: user_id,
            game_type_id: payload.game_type_id,
            structure_id: payload.structure_id,
            location: payload.location,
            datetime: payload.datetime,
            max_players: payload.max_players,
            entry_fee: payload.entry_fee,
            is_private: payload.is_private,
            payout_structure: payload.payout_structure,
        })
        .await
        .map_err(game_error_response)?;

    metrics::counter!("games_created_total").increment(1);
    Ok((StatusCode::CREATED, Json(game)))
}

/// Join a game as the authenticated user.
pub async fn join_game(
    State(state): State<AppState>,
    Extension(user_id): Extension<i64>,
    Path(game_id): Path<i64>,
    Json(payload): Json<JoinGamePayload>,
) -> Result<(StatusCode, Json<GameParticipant>), ApiError> {
    let participant = state
        .game_manager
        .join_game(game_id, user_id, payload.referrer_id)
        .await
        .map_err(game_error_response)?;

    metrics::counter!("games_joined_total").increment(1);
    Ok((StatusCode::CREATED, Json(participant)))
}

/// Change a game's status. Game master only.
pub async fn update_status(
    State(state): State<AppState>,
    Extension(user_id): Extension<i64>,
    Path(game_id): Path<i64>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<Json<Game>, ApiError> {
    let to = parse_status(&payload.status)?;
    let game = state
        .game_manager
        .update_status(user_id, game_id, to)
        .await
        .map_err(game_error_response)?;
    Ok(Json(game))
}

/// Settle a completed game's winner payouts. Game master only.
pub async fn complete_game(
    State(state): State<AppState>,
    Extension(user_id): Extension<i64>,
    Path(game_id): Path<i64>,
    Json(payload): Json<CompleteGamePayload>,
) -> Result<Json<Vec<PayoutEntry>>, ApiError> {
    if payload.placements.is_empty() {
        return Err(bad_request("placements must not be empty"));
    }

    let payouts = state
        .settlement
        .settle_completed_game(user_id, game_id, &payload.placements)
        .await
        .map_err(game_error_response)?;

    metrics::counter!("games_settled_total").increment(1);
    Ok(Json(
        payouts
            .into_iter()
            .map(|(user_id, amount)| PayoutEntry { user_id, amount })
            .collect(),
    ))
}

/// Games the authenticated user has joined.
pub async fn my_games(
    State(state): State<AppState>,
    Extension(user_id): Extension<i64>,
) -> Result<Json<Vec<Game>>, ApiError> {
    let games = state
        .game_manager
        .list_games_for_participant(user_id)
        .await
        .map_err(game_error_response)?;
    Ok(Json(games))
}

/// Games the authenticated user created.
pub async fn created_games(
    State(state): State<AppState>,
    Extension(user_id): Extension<i64>,
) -> Result<Json<Vec<Game>>, ApiError> {
    let games = state
        .game_manager
        .list_games_created(user_id)
        .await
        .map_err(game_error_response)?;
    Ok(Json(games))
}
