//! Full-pool settlement: every cent of a completed game's pool is
//! accounted for across platform, game master, promoters, and winners.

use std::sync::Arc;

use chrono::{Duration, Utc};

use gameon::auth::{AuthManager, RegisterRequest};
use gameon::game::models::{EarningKind, NewGame};
use gameon::{ledger, GameManager, GameStatus, GameStore, MemGameStore, SettlementManager};

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

#[tokio::test]
async fn completed_tournament_pays_master_and_winners() {
    let store = Arc::new(MemGameStore::new());
    store.seed_defaults().await;
    let manager = GameManager::new(store.clone());
    let auth = AuthManager::new(store.clone(), "pepper".into(), "jwt".into());
    let settlement = SettlementManager::new(store.clone());

    let master = register(&auth, "master").await;
    // eight players at $25.00 each: a $200.00 pool
    let game = manager
        .create_game(NewGame {
            name: "City Cup".into(),
            game_master_id: master,
            game_type_id: 2,
            structure_id: 2,
            location: "Arena".into(),
            datetime: Utc::now() + Duration::days(5),
            max_players: 8,
            entry_fee: 2_500,
            is_private: false,
            payout_structure: "1:50,2:30,3:20".into(),
        })
        .await
        .unwrap();
    assert_eq!(game.prize_pool, 20_000);

    let mut players = Vec::new();
    for i in 0..8 {
        let p = register(&auth, &format!("player{i}")).await;
        manager.join_game(game.id, p, None).await.unwrap();
        players.push(p);
    }

    manager
        .update_status(master, game.id, GameStatus::Active)
        .await
        .unwrap();
    manager
        .update_status(master, game.id, GameStatus::Completed)
        .await
        .unwrap();

    let payouts = settlement
        .settle_completed_game(master, game.id, &players[0..3])
        .await
        .unwrap();

    // winners prize is 75% of the pool; 50/30/20 over 15_000
    assert_eq!(
        payouts,
        vec![
            (players[0], 7_500),
            (players[1], 4_500),
            (players[2], 3_000),
        ]
    );

    let earnings = store.list_game_earnings(game.id).await.unwrap();
    let master_total: i64 = earnings
        .iter()
        .filter(|e| e.kind == EarningKind::GameMaster)
        .map(|e| e.amount)
        .sum();
    let winner_total: i64 = earnings
        .iter()
        .filter(|e| e.kind == EarningKind::Winner)
        .map(|e| e.amount)
        .sum();
    assert_eq!(master_total, 1_000);
    assert_eq!(winner_total, 15_000);

    let split = ledger::distribute(game.prize_pool);
    assert_eq!(split.platform_fee + split.promoters_fee, 4_000);
    assert_eq!(
        master_total + winner_total + split.platform_fee + split.promoters_fee,
        game.prize_pool
    );
}

#[tokio::test]
async fn indivisible_pool_still_sums_exactly() {
    let store = Arc::new(MemGameStore::new());
    store.seed_defaults().await;
    let manager = GameManager::new(store.clone());
    let auth = AuthManager::new(store.clone(), "pepper".into(), "jwt".into());
    let settlement = SettlementManager::new(store.clone());

    let master = register(&auth, "master").await;
    // 3 players at $1.11: a 333-cent pool that no percentage divides evenly
    let game = manager
        .create_game(NewGame {
            name: "Odd Pool".into(),
            game_master_id: master,
            game_type_id: 1,
            structure_id: 3,
            location: "Back lot".into(),
            datetime: Utc::now() + Duration::days(1),
            max_players: 3,
            entry_fee: 111,
            is_private: false,
            payout_structure: "1:67,2:33".into(),
        })
        .await
        .unwrap();
    assert_eq!(game.prize_pool, 333);

    let mut players = Vec::new();
    for i in 0..3 {
        let p = register(&auth, &format!("odd{i}")).await;
        manager.join_game(game.id, p, None).await.unwrap();
        players.push(p);
    }
    manager
        .update_status(master, game.id, GameStatus::Active)
        .await
        .unwrap();
    manager
        .update_status(master, game.id, GameStatus::Completed)
        .await
        .unwrap();

    let payouts = settlement
        .settle_completed_game(master, game.id, &players[0..2])
        .await
        .unwrap();

    let split = ledger::distribute(game.prize_pool);
    let winner_total: i64 = payouts.iter().map(|(_, amount)| amount).sum();
    assert_eq!(winner_total, split.winners_prize);
    assert_eq!(split.total(), game.prize_pool);
}
