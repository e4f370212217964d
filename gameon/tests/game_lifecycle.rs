//! End-to-end lifecycle tests over the in-memory store.

use std::sync::Arc;

use chrono::{Duration, Utc};

use gameon::auth::{AuthManager, RegisterRequest};
use gameon::game::models::NewGame;
use gameon::{GameError, GameManager, GameStatus, GameStore, MemGameStore};

async fn platform() -> (Arc<MemGameStore>, GameManager, AuthManager) {
    let store = Arc::new(MemGameStore::new());
    store.seed_defaults().await;
    let manager = GameManager::new(store.clone());
    let auth = AuthManager::new(store.clone(), "pepper".into(), "jwt-secret".into());
    (store, manager, auth)
}

async fn register(auth: &AuthManager, username: &str) -> i64 {
    auth.register(RegisterRequest {
        username: username.into(),
        password: "Sup3rSecret".into(),
        email: format!("{username}@example.com"),
        full_name: None,
        avatar_url: None,
    })
    .await
    .unwrap()
    .id
}

fn pickup_game(master: i64, max_players: i32, entry_fee: i64) -> NewGame {
    NewGame {
        name: "Saturday Pickup".into(),
        game_master_id: master,
        game_type_id: 1,
        structure_id: 1,
        location: "Memorial Park".into(),
        datetime: Utc::now() + Duration::days(2),
        max_players,
        entry_fee,
        is_private: false,
        payout_structure: "1:100".into(),
    }
}

#[tokio::test]
async fn full_lifecycle_scheduled_to_completed() {
    let (_store, manager, auth) = platform().await;
    let master = register(&auth, "master").await;
    let game = manager
        .create_game(pickup_game(master, 4, 2_500))
        .await
        .unwrap();
    assert_eq!(game.status, GameStatus::Scheduled);
    assert_eq!(game.prize_pool, 10_000);

    for name in ["player1", "player2", "player3"] {
        let player = register(&auth, name).await;
        manager.join_game(game.id, player, None).await.unwrap();
    }
    let refreshed = manager.get_game(game.id).await.unwrap();
    assert_eq!(refreshed.current_players, 3);

    manager
        .update_status(master, game.id, GameStatus::Active)
        .await
        .unwrap();
    let done = manager
        .update_status(master, game.id, GameStatus::Completed)
        .await
        .unwrap();
    assert_eq!(done.status, GameStatus::Completed);

    // completion is terminal
    let err = manager
        .update_status(master, game.id, GameStatus::Active)
        .await
        .unwrap_err();
    assert!(matches!(err, GameError::InvalidTransition { .. }));
}

#[tokio::test]
async fn postponed_game_resumes_and_accepts_joins() {
    let (_store, manager, auth) = platform().await;
    let master = register(&auth, "master").await;
    let player = register(&auth, "player").await;
    let game = manager
        .create_game(pickup_game(master, 4, 2_500))
        .await
        .unwrap();

    manager
        .update_status(master, game.id, GameStatus::Postponed)
        .await
        .unwrap();
    let err = manager.join_game(game.id, player, None).await.unwrap_err();
    assert!(matches!(err, GameError::GameNotJoinable(_)));

    manager
        .update_status(master, game.id, GameStatus::Scheduled)
        .await
        .unwrap();
    manager.join_game(game.id, player, None).await.unwrap();
}

#[tokio::test]
async fn cancelled_game_is_terminal() {
    let (_store, manager, auth) = platform().await;
    let master = register(&auth, "master").await;
    let game = manager
        .create_game(pickup_game(master, 4, 2_500))
        .await
        .unwrap();

    manager
        .update_status(master, game.id, GameStatus::Cancelled)
        .await
        .unwrap();
    for to in [
        GameStatus::Scheduled,
        GameStatus::Active,
        GameStatus::Completed,
        GameStatus::Postponed,
    ] {
        let err = manager.update_status(master, game.id, to).await.unwrap_err();
        assert!(matches!(err, GameError::InvalidTransition { .. }));
    }
}

#[tokio::test]
async fn player_count_boundaries() {
    let (_store, manager, auth) = platform().await;
    let master = register(&auth, "master").await;

    let mut game = pickup_game(master, 1, 2_500);
    game.max_players = 1;
    assert!(matches!(
        manager.create_game(game).await,
        Err(GameError::Validation(_))
    ));

    let mut game = pickup_game(master, 65, 2_500);
    game.max_players = 65;
    assert!(matches!(
        manager.create_game(game).await,
        Err(GameError::Validation(_))
    ));

    assert!(manager.create_game(pickup_game(master, 2, 2_500)).await.is_ok());
    assert!(manager.create_game(pickup_game(master, 64, 2_500)).await.is_ok());
}

#[tokio::test]
async fn concurrent_joins_never_exceed_capacity() {
    let (_store, manager, auth) = platform().await;
    let master = register(&auth, "master").await;
    let game = manager
        .create_game(pickup_game(master, 4, 2_500))
        .await
        .unwrap();

    let mut players = Vec::new();
    for i in 0..10 {
        players.push(register(&auth, &format!("racer{i}")).await);
    }

    let mut handles = Vec::new();
    for player in players {
        let manager = manager.clone();
        let game_id = game.id;
        handles.push(tokio::spawn(async move {
            manager.join_game(game_id, player, None).await
        }));
    }

    let mut joined = 0;
    let mut full = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => joined += 1,
            Err(GameError::GameFull) => full += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(joined, 4);
    assert_eq!(full, 6);

    let refreshed = manager.get_game(game.id).await.unwrap();
    assert_eq!(refreshed.current_players, 4);
    assert_eq!(manager.list_participants(game.id).await.unwrap().len(), 4);
}

#[tokio::test]
async fn racing_completions_post_one_master_earning() {
    let (store, manager, auth) = platform().await;
    let master = register(&auth, "master").await;
    let game = manager
        .create_game(pickup_game(master, 4, 2_500))
        .await
        .unwrap();
    manager
        .update_status(master, game.id, GameStatus::Active)
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..2 {
        let manager = manager.clone();
        let game_id = game.id;
        handles.push(tokio::spawn(async move {
            manager
                .update_status(master, game_id, GameStatus::Completed)
                .await
        }));
    }

    let mut completed = 0;
    let mut stale = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => completed += 1,
            Err(GameError::InvalidTransition { .. }) => stale += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(completed, 1);
    assert_eq!(stale, 1);

    // only the winning transition credits the game master
    let earnings = store.list_earnings(master).await.unwrap();
    assert_eq!(earnings.len(), 1);
    assert_eq!(earnings[0].amount, 500);
}

#[tokio::test]
async fn listings_filter_by_status_and_role() {
    let (_store, manager, auth) = platform().await;
    let master = register(&auth, "master").await;
    let player = register(&auth, "player").await;

    let g1 = manager
        .create_game(pickup_game(master, 4, 2_500))
        .await
        .unwrap();
    let g2 = manager
        .create_game(pickup_game(master, 4, 2_500))
        .await
        .unwrap();
    manager.join_game(g1.id, player, None).await.unwrap();
    manager
        .update_status(master, g2.id, GameStatus::Cancelled)
        .await
        .unwrap();

    let scheduled = manager.list_games(Some(GameStatus::Scheduled)).await.unwrap();
    assert_eq!(scheduled.len(), 1);
    assert_eq!(scheduled[0].id, g1.id);

    let mine = manager.list_games_for_participant(player).await.unwrap();
    assert_eq!(mine.len(), 1);

    let created = manager.list_games_created(master).await.unwrap();
    assert_eq!(created.len(), 2);
}
