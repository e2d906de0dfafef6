mod common;
mod support;

use matchmaker::entities::players::PlayerStats;
use matchmaker::errors::domain::{ConflictKind, DomainError, NotFoundKind, ValidationKind};
use support::test_state;

#[tokio::test]
async fn created_player_is_idle_with_zero_stats() {
    let state = test_state(100).await;

    let id = state
        .players
        .create_player("  Ada ", "Ada@Example.com")
        .await
        .unwrap();

    let p = state.players.get_player(&id).await.unwrap();
    assert_eq!(p.player_name, "Ada");
    assert_eq!(p.email, "ada@example.com");
    assert_eq!(p.stats, PlayerStats::default());
    assert!(p.current_game.is_none());
}

#[tokio::test]
async fn invalid_input_is_rejected_before_writing() {
    let state = test_state(100).await;

    let err = state.players.create_player("Ada", "not-an-email").await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::InvalidEmail, _)
    ));

    let err = state.players.create_player(" ", "ada@example.com").await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::InvalidPlayerName, _)
    ));

    assert!(state.players.list_player_ids().await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let state = test_state(100).await;
    state
        .players
        .create_player("Ada", "ada@example.com")
        .await
        .unwrap();

    let err = state
        .players
        .create_player("Other Ada", "ADA@example.com")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Conflict(ConflictKind::UniqueEmail, _)
    ));
    assert_eq!(state.players.list_player_ids().await.unwrap().len(), 1);
}

#[tokio::test]
async fn list_returns_every_created_id() {
    let state = test_state(100).await;
    let mut created = Vec::new();
    for i in 0..5 {
        created.push(
            state
                .players
                .create_player(&format!("p{i}"), &format!("p{i}@example.com"))
                .await
                .unwrap(),
        );
    }

    let mut listed = state.players.list_player_ids().await.unwrap();
    listed.sort();
    created.sort();
    assert_eq!(listed, created);
}

#[tokio::test]
async fn unknown_player_is_not_found() {
    let state = test_state(100).await;
    let err = state.players.get_player("nobody").await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound(NotFoundKind::Player, _)));
}

#[tokio::test]
async fn created_players_feed_matchmaking() {
    let state = test_state(100).await;
    let a = state.players.create_player("A", "a@example.com").await.unwrap();
    let b = state.players.create_player("B", "b@example.com").await.unwrap();

    let game_id = state.matchmaking.create_game().await.unwrap();
    for id in [&a, &b] {
        let p = state.players.get_player(id).await.unwrap();
        assert_eq!(p.current_game.as_deref(), Some(game_id.as_str()));
    }

    let winner = state.matchmaking.close_game(&game_id).await.unwrap();
    let w = state.players.get_player(&winner).await.unwrap();
    assert_eq!(
        w.stats,
        PlayerStats {
            games_played: 1,
            games_won: 1
        }
    );
}
