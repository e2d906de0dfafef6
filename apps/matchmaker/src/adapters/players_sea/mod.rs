//! SeaORM adapter for the player pool - generic over ConnectionTrait.

use sea_orm::sea_query::{Expr, Order};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entities::players::{self, PlayerStats};

pub mod dto;

pub use dto::{PlayerCreate, PlayerSettle};

// Adapter functions return DbErr; repos layer maps to DomainError via From<DbErr>.

/// Up to `limit` ids of idle players, in random order.
pub async fn sample_idle_ids<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    limit: u64,
) -> Result<Vec<String>, sea_orm::DbErr> {
    players::Entity::find()
        .select_only()
        .column(players::Column::Id)
        .filter(players::Column::CurrentGame.is_null())
        .order_by(Expr::cust("RANDOM()"), Order::Asc)
        .limit(limit)
        .into_tuple::<String>()
        .all(conn)
        .await
}

/// Point `current_game` at `game_id` for every listed player that is still idle.
///
/// Returns rows affected; anything short of `player_ids.len()` means another
/// writer locked one of them first.
pub async fn lock_idle<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
    player_ids: &[String],
) -> Result<u64, sea_orm::DbErr> {
    if player_ids.is_empty() {
        return Ok(0);
    }

    let result = players::Entity::update_many()
        .col_expr(players::Column::CurrentGame, Expr::value(game_id))
        .filter(players::Column::Id.is_in(player_ids.iter().cloned()))
        .filter(players::Column::CurrentGame.is_null())
        .exec(conn)
        .await?;

    Ok(result.rows_affected)
}

pub async fn find_by_ids<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_ids: &[String],
) -> Result<Vec<players::Model>, sea_orm::DbErr> {
    if player_ids.is_empty() {
        return Ok(Vec::new());
    }

    players::Entity::find()
        .filter(players::Column::Id.is_in(player_ids.iter().cloned()))
        .all(conn)
        .await
}

/// Write new counters and release the player, but only while they are still
/// locked to `dto.game_id`. Returns whether the row was updated.
pub async fn settle_player<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: PlayerSettle,
) -> Result<bool, sea_orm::DbErr> {
    let result = players::Entity::update_many()
        .col_expr(players::Column::Stats, Expr::value(dto.stats))
        .col_expr(
            players::Column::CurrentGame,
            Expr::value(Option::<String>::None),
        )
        .filter(players::Column::Id.eq(dto.player_id))
        .filter(players::Column::CurrentGame.eq(dto.game_id))
        .exec(conn)
        .await?;

    Ok(result.rows_affected == 1)
}

pub async fn create_player<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: PlayerCreate,
) -> Result<players::Model, sea_orm::DbErr> {
    let player_active = players::ActiveModel {
        id: Set(dto.id),
        player_name: Set(dto.player_name),
        email: Set(dto.email),
        stats: Set(Some(PlayerStats::default())),
        current_game: Set(None),
        created_at: Set(dto.created_at),
    };

    player_active.insert(conn).await
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: &str,
) -> Result<Option<players::Model>, sea_orm::DbErr> {
    players::Entity::find_by_id(player_id.to_string())
        .one(conn)
        .await
}

/// Player ids in creation order, at most `limit` of them.
pub async fn list_ids<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    limit: u64,
) -> Result<Vec<String>, sea_orm::DbErr> {
    players::Entity::find()
        .select_only()
        .column(players::Column::Id)
        .order_by_asc(players::Column::CreatedAt)
        .order_by_asc(players::Column::Id)
        .limit(limit)
        .into_tuple::<String>()
        .all(conn)
        .await
}
