//! Table actor integration tests.
//!
//! The clock is set far in the future so every tick is sent explicitly
//! through the handle.

use holdem::{
    HandState, JoinRequest, PokerTable, TableActor, TableConfig, TableEvent, TableHandle,
    TableNotification, TableResponse, WalletManager,
    entities::{PlayerAction, PlayerId},
    export::{CompletedHand, ExportQueue, HandRecord, MemorySink, RetryPolicy},
};
use std::{
    net::{IpAddr, Ipv4Addr},
    sync::Arc,
    time::Duration,
};
use tokio::task::JoinHandle;
use uuid::Uuid;

fn config() -> TableConfig {
    TableConfig {
        intermission_secs: 1,
        tick_millis: 3_600_000,
        ..TableConfig::default()
    }
}

fn request(id: PlayerId, buy_in: u32) -> JoinRequest {
    JoinRequest::new(
        id,
        format!("player{id}"),
        IpAddr::V4(Ipv4Addr::new(10, 0, 3, id as u8)),
        buy_in,
    )
}

async fn start(
    wallets: Arc<WalletManager>,
    exporter: Option<ExportQueue>,
) -> (TableHandle, JoinHandle<()>) {
    let table = PokerTable::with_seed(config(), 3);
    let (actor, handle) = TableActor::with_table(1, table, wallets, exporter);
    (handle, tokio::spawn(actor.run()))
}

async fn tick_until(handle: &TableHandle, state: HandState) {
    for _ in 0..20 {
        let view = handle.view(None).await.expect("table is open");
        if view.state == state {
            return;
        }
        handle.tick().await.expect("table is open");
    }
    panic!("table never reached {state}");
}

#[tokio::test]
async fn test_hand_played_through_actor() {
    let wallets = Arc::new(WalletManager::new());
    wallets.open_account(1, 5000).await;
    wallets.open_account(2, 5000).await;
    let sink = Arc::new(MemorySink::new());
    let (queue, worker) = ExportQueue::spawn(sink.clone(), RetryPolicy::default());
    let (handle, task) = start(wallets.clone(), Some(queue)).await;

    let mut notifications = handle.subscribe(1).await.unwrap();
    assert_eq!(handle.join(request(1, 2000)).await, TableResponse::Success);
    assert_eq!(handle.join(request(2, 2000)).await, TableResponse::Success);
    assert_eq!(wallets.balance(1).await, Ok(3000));

    tick_until(&handle, HandState::PreflopBetting).await;
    let view = handle.view(Some(1)).await.unwrap();
    assert_eq!(view.current_turn, Some(1));
    assert!(view.player(1).unwrap().hole_cards.is_some());
    assert!(view.player(2).unwrap().hole_cards.is_none());

    // Out of turn is accepted and ignored.
    assert_eq!(
        handle.submit(2, PlayerAction::Fold).await,
        TableResponse::Success
    );
    assert!(matches!(
        handle.submit(1, PlayerAction::Check).await,
        TableResponse::InvalidAction(_)
    ));
    assert_eq!(
        handle.submit(1, PlayerAction::Fold).await,
        TableResponse::Success
    );

    let state = handle.state().await.unwrap();
    assert_eq!(state.hands_played, 1);
    assert_eq!(state.phase, "intermission");

    assert_eq!(handle.leave(2).await, TableResponse::Success);
    assert_eq!(wallets.balance(2).await, Ok(5050));

    assert_eq!(handle.close().await, TableResponse::Success);
    task.await.unwrap();
    assert_eq!(wallets.balance(1).await, Ok(4950));
    assert_eq!(wallets.total_balance().await, 10_000);

    let stats = worker.await.unwrap();
    assert_eq!(stats.delivered, 1);
    let hands = sink.hands().await;
    assert_eq!(hands.len(), 1);
    assert_eq!(hands[0].hand.final_pot, 150);

    let mut received = Vec::new();
    while let Some(notification) = notifications.recv().await {
        received.push(notification);
    }
    assert!(received.contains(&TableNotification::ViewChanged));
    assert!(received.iter().any(|n| matches!(
        n,
        TableNotification::Event(TableEvent::Direct { player: 1, text })
            if text.starts_with("You were dealt")
    )));
    assert!(!received.iter().any(|n| matches!(
        n,
        TableNotification::Event(TableEvent::Direct { player: 2, .. })
    )));
    assert!(received.iter().any(|n| matches!(
        n,
        TableNotification::Event(TableEvent::HandFinished { pot: 150, .. })
    )));
}

#[tokio::test]
async fn test_join_failures() {
    let wallets = Arc::new(WalletManager::new());
    wallets.open_account(1, 100).await;
    wallets.open_account(2, 5000).await;
    let (handle, task) = start(wallets.clone(), None).await;

    assert_eq!(
        handle.join(request(1, 2000)).await,
        TableResponse::InsufficientChips {
            required: 2000,
            available: 100
        }
    );
    assert_eq!(
        handle.join(request(3, 2000)).await.error_message().as_deref(),
        Some("Your bank box lacks the funds to join this poker table.")
    );
    assert!(matches!(
        handle.join(request(2, 50)).await,
        TableResponse::JoinDeclined(_)
    ));
    assert_eq!(wallets.balance(2).await, Ok(5000));

    assert_eq!(handle.join(request(2, 2000)).await, TableResponse::Success);
    assert_eq!(handle.leave(2).await, TableResponse::Success);
    assert_eq!(wallets.balance(2).await, Ok(5000));
    let rejoin = handle.join(request(2, 2000)).await;
    assert!(
        rejoin
            .error_message()
            .is_some_and(|m| m.starts_with("You cannot join another poker game for"))
    );

    assert_eq!(handle.leave(9).await, TableResponse::NotAtTable);

    handle.close().await;
    task.await.unwrap();
    assert_eq!(handle.join(request(2, 2000)).await, TableResponse::TableClosed);
}

#[tokio::test]
async fn test_rebuy_between_hands() {
    let wallets = Arc::new(WalletManager::new());
    wallets.open_account(1, 5000).await;
    wallets.open_account(2, 2000).await;
    let (handle, task) = start(wallets.clone(), None).await;

    handle.join(request(1, 2000)).await;
    handle.join(request(2, 2000)).await;

    assert_eq!(handle.rebuy(1, 500).await, TableResponse::Success);
    assert_eq!(wallets.balance(1).await, Ok(2500));
    let view = handle.view(None).await.unwrap();
    assert_eq!(view.player(1).unwrap().stack, 2500);

    // Nothing left in the bank: the request is answered but not credited.
    assert_eq!(handle.rebuy(2, 500).await, TableResponse::Success);
    let view = handle.view(None).await.unwrap();
    assert_eq!(view.player(2).unwrap().stack, 2000);

    assert!(matches!(
        handle.rebuy(1, 0).await,
        TableResponse::InvalidAction(_)
    ));

    handle.close().await;
    task.await.unwrap();
    assert_eq!(wallets.balance(1).await, Ok(5000));
    assert_eq!(wallets.balance(2).await, Ok(2000));
}

#[tokio::test]
async fn test_paused_table_ignores_ticks() {
    let wallets = Arc::new(WalletManager::new());
    wallets.open_account(1, 5000).await;
    wallets.open_account(2, 5000).await;
    let (handle, task) = start(wallets, None).await;

    handle.join(request(1, 2000)).await;
    handle.join(request(2, 2000)).await;
    assert_eq!(handle.pause().await, TableResponse::Success);
    for _ in 0..5 {
        handle.tick().await.unwrap();
    }
    let state = handle.state().await.unwrap();
    assert!(!state.is_active);
    assert_eq!(state.phase, "intermission");

    handle.resume().await;
    tick_until(&handle, HandState::PreflopBetting).await;

    handle.close().await;
    task.await.unwrap();
}

#[tokio::test]
async fn test_dropping_every_handle_closes_table() {
    let wallets = Arc::new(WalletManager::new());
    wallets.open_account(1, 5000).await;
    let (handle, task) = start(wallets.clone(), None).await;

    handle.join(request(1, 2000)).await;
    drop(handle);
    task.await.unwrap();
    assert_eq!(wallets.balance(1).await, Ok(5000));
}

fn completed_hand() -> CompletedHand {
    let now = chrono::Utc::now();
    CompletedHand {
        hand: HandRecord {
            hand_id: Uuid::new_v4(),
            table: "test".to_string(),
            started_at: now,
            ended_at: now,
            final_pot: 300,
            community_cards: "Ah Kd 7c 2s 9h".to_string(),
        },
        actions: Vec::new(),
        players: Vec::new(),
    }
}

#[tokio::test]
async fn test_export_retries_until_sink_recovers() {
    let sink = Arc::new(MemorySink::failing_first(2));
    let policy = RetryPolicy {
        max_attempts: Some(5),
        initial_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(5),
    };
    let (queue, worker) = ExportQueue::spawn(sink.clone(), policy);

    let hand = completed_hand();
    queue.enqueue(hand.clone()).unwrap();
    drop(queue);

    let stats = worker.await.unwrap();
    assert_eq!(stats.delivered, 1);
    assert_eq!(stats.retries, 2);
    assert_eq!(sink.attempts(), 3);
    assert_eq!(sink.hands().await, vec![hand]);
}

#[tokio::test]
async fn test_export_gives_up_after_max_attempts() {
    let sink = Arc::new(MemorySink::failing_first(10));
    let policy = RetryPolicy {
        max_attempts: Some(3),
        initial_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(2),
    };
    let (queue, worker) = ExportQueue::spawn(sink.clone(), policy);
    queue.enqueue(completed_hand()).unwrap();
    queue.enqueue(completed_hand()).unwrap();
    drop(queue);

    let stats = worker.await.unwrap();
    assert_eq!(stats.dropped, 2);
    assert_eq!(stats.delivered, 0);
    assert_eq!(sink.attempts(), 6);
    assert!(sink.hands().await.is_empty());
}
