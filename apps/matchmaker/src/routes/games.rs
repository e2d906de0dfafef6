//! Game-related HTTP routes.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::error::AppError;
use crate::errors::domain::{DomainError, NotFoundKind};
use crate::repos::games::{self, Game};
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct CloseGameRequest {
    #[serde(rename = "gameUUID")]
    pub game_uuid: String,
}

#[derive(Debug, Serialize)]
pub struct GameView {
    #[serde(rename = "gameUUID")]
    pub game_uuid: String,
    pub players: Vec<String>,
    pub winner: Option<String>,
    pub created: String,
    pub finished: Option<String>,
}

fn rfc3339(ts: OffsetDateTime) -> String {
    ts.format(&Rfc3339).unwrap_or_else(|_| ts.to_string())
}

impl From<Game> for GameView {
    fn from(game: Game) -> Self {
        Self {
            game_uuid: game.id,
            players: game.players,
            winner: game.winner,
            created: rfc3339(game.created_at),
            finished: game.finished_at.map(rfc3339),
        }
    }
}

/// POST /games/create
///
/// Creates a game from the idle pool; responds 201 with the game id.
async fn create_game(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let game_id = app_state.matchmaking.create_game().await?;
    Ok(HttpResponse::Created().json(game_id))
}

/// PUT /games/close
///
/// Settles the game named in the body; responds 200 with the winner id.
async fn close_game(
    app_state: web::Data<AppState>,
    body: web::Json<CloseGameRequest>,
) -> Result<HttpResponse, AppError> {
    let winner_id = app_state.matchmaking.close_game(&body.game_uuid).await?;
    Ok(HttpResponse::Ok().json(winner_id))
}

/// GET /games/{game_id}
async fn get_game(
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<web::Json<GameView>, AppError> {
    let game_id = path.into_inner();
    let game = games::find_by_id(app_state.db(), &game_id)
        .await?
        .ok_or_else(|| {
            DomainError::not_found(NotFoundKind::Game, format!("Game {game_id} not found"))
        })?;
    Ok(web::Json(GameView::from(game)))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/create").route(web::post().to(create_game)));
    cfg.service(web::resource("/close").route(web::put().to(close_game)));
    cfg.service(web::resource("/{game_id}").route(web::get().to(get_game)));
}
