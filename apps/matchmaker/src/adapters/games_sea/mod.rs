//! SeaORM adapter for game repository - generic over ConnectionTrait.

use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

use crate::entities::games;

pub mod dto;

pub use dto::{GameClose, GameCreate};

// Adapter functions return DbErr; repos layer maps to DomainError via From<DbErr>.

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: &str,
) -> Result<Option<games::Model>, sea_orm::DbErr> {
    games::Entity::find_by_id(game_id.to_string()).one(conn).await
}

/// Insert an open game (`winner` and `finished_at` NULL).
///
/// A colliding id fails with the store's unique-violation error.
pub async fn create_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: GameCreate,
) -> Result<games::Model, sea_orm::DbErr> {
    let game_active = games::ActiveModel {
        id: Set(dto.id),
        players: Set(dto.players.into()),
        winner: Set(None),
        created_at: Set(dto.created_at),
        finished_at: Set(None),
    };

    game_active.insert(conn).await
}

/// Set `winner` and `finished_at` only while `finished_at IS NULL`.
///
/// Returns rows affected: 1 if this call closed the game, 0 if the game is
/// missing or some earlier call already closed it.
pub async fn close_open_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: GameClose,
) -> Result<u64, sea_orm::DbErr> {
    let result = games::Entity::update_many()
        .col_expr(games::Column::Winner, Expr::value(dto.winner))
        .col_expr(games::Column::FinishedAt, Expr::value(dto.finished_at))
        .filter(games::Column::Id.eq(dto.id))
        .filter(games::Column::FinishedAt.is_null())
        .exec(conn)
        .await?;

    Ok(result.rows_affected)
}
