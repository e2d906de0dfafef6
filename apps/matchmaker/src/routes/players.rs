//! Player profile HTTP routes.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::entities::players::PlayerStats;
use crate::error::AppError;
use crate::repos::players::Player;
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreatePlayerRequest {
    pub player_name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct PlayerView {
    #[serde(rename = "playerUUID")]
    pub player_uuid: String,
    pub player_name: String,
    pub email: String,
    pub stats: PlayerStats,
    pub current_game: Option<String>,
}

impl From<Player> for PlayerView {
    fn from(player: Player) -> Self {
        Self {
            player_uuid: player.id,
            player_name: player.player_name,
            email: player.email,
            stats: player.stats,
            current_game: player.current_game,
        }
    }
}

/// POST /players
async fn create_player(
    app_state: web::Data<AppState>,
    body: web::Json<CreatePlayerRequest>,
) -> Result<HttpResponse, AppError> {
    let player_id = app_state
        .players
        .create_player(&body.player_name, &body.email)
        .await?;
    Ok(HttpResponse::Created().json(player_id))
}

/// GET /players
async fn list_players(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let ids = app_state.players.list_player_ids().await?;
    Ok(HttpResponse::Ok().json(ids))
}

/// GET /players/{player_id}
async fn get_player(
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<web::Json<PlayerView>, AppError> {
    let player = app_state.players.get_player(&path.into_inner()).await?;
    Ok(web::Json(PlayerView::from(player)))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("")
            .route(web::post().to(create_player))
            .route(web::get().to(list_players)),
    );
    cfg.service(web::resource("/{player_id}").route(web::get().to(get_player)));
}
