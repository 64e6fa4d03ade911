use super::*;
use crate::state::test_helpers;
use tokio::time::{Duration, timeout};

async fn assert_channel_has_event(rx: &mut mpsc::Receiver<ChangeEvent>) -> ChangeEvent {
    timeout(Duration::from_millis(200), rx.recv())
        .await
        .expect("event receive timed out")
        .expect("channel closed")
}

async fn assert_channel_empty(rx: &mut mpsc::Receiver<ChangeEvent>) {
    assert!(
        timeout(Duration::from_millis(80), rx.recv()).await.is_err(),
        "expected channel to remain empty"
    );
}

#[tokio::test]
async fn publish_reaches_all_of_users_clients() {
    let state = test_helpers::test_app_state();
    let user_id = Uuid::new_v4();

    let mut rx_a = test_helpers::attach_subscriber(&state, user_id, Uuid::new_v4(), 8).await;
    let mut rx_b = test_helpers::attach_subscriber(&state, user_id, Uuid::new_v4(), 8).await;

    let event = ChangeEvent::insert(user_id, serde_json::json!({"name": "Haircut"}));
    publish(&state, &event).await;

    let recv_a = assert_channel_has_event(&mut rx_a).await;
    let recv_b = assert_channel_has_event(&mut rx_b).await;
    assert_eq!(recv_a.id, event.id);
    assert_eq!(recv_b.id, event.id);
}

#[tokio::test]
async fn publish_is_scoped_to_owning_user() {
    let state = test_helpers::test_app_state();
    let owner = Uuid::new_v4();
    let other = Uuid::new_v4();

    let mut rx_owner = test_helpers::attach_subscriber(&state, owner, Uuid::new_v4(), 8).await;
    let mut rx_other = test_helpers::attach_subscriber(&state, other, Uuid::new_v4(), 8).await;

    publish(&state, &ChangeEvent::delete(owner, Uuid::new_v4())).await;

    assert_channel_has_event(&mut rx_owner).await;
    assert_channel_empty(&mut rx_other).await;
}

#[tokio::test]
async fn publish_with_no_subscribers_is_a_no_op() {
    let state = test_helpers::test_app_state();
    publish(&state, &ChangeEvent::insert(Uuid::new_v4(), serde_json::json!({}))).await;
}

#[tokio::test]
async fn publish_skips_full_channels_without_blocking() {
    let state = test_helpers::test_app_state();
    let user_id = Uuid::new_v4();

    // Capacity one: the second publish must be dropped, not awaited.
    let mut rx = test_helpers::attach_subscriber(&state, user_id, Uuid::new_v4(), 1).await;

    let first = ChangeEvent::insert(user_id, serde_json::json!({"n": 1}));
    let second = ChangeEvent::insert(user_id, serde_json::json!({"n": 2}));
    publish(&state, &first).await;
    publish(&state, &second).await;

    let received = assert_channel_has_event(&mut rx).await;
    assert_eq!(received.id, first.id);
    assert_channel_empty(&mut rx).await;
}

#[tokio::test]
async fn subscribe_then_unsubscribe_updates_counts() {
    let state = test_helpers::test_app_state();
    let user_id = Uuid::new_v4();
    let client_a = Uuid::new_v4();
    let client_b = Uuid::new_v4();

    let (tx_a, _rx_a) = mpsc::channel(8);
    let (tx_b, _rx_b) = mpsc::channel(8);
    subscribe(&state, user_id, client_a, tx_a).await;
    subscribe(&state, user_id, client_b, tx_b).await;
    assert_eq!(subscriber_count(&state, user_id).await, 2);

    unsubscribe(&state, user_id, client_a).await;
    assert_eq!(subscriber_count(&state, user_id).await, 1);
}

#[tokio::test]
async fn last_unsubscribe_evicts_user_entry() {
    let state = test_helpers::test_app_state();
    let user_id = Uuid::new_v4();
    let client_id = Uuid::new_v4();

    let (tx, _rx) = mpsc::channel(8);
    subscribe(&state, user_id, client_id, tx).await;
    unsubscribe(&state, user_id, client_id).await;

    let subscribers = state.subscribers.read().await;
    assert!(
        !subscribers.contains_key(&user_id),
        "user entry should be evicted after last client leaves"
    );
}

#[tokio::test]
async fn unsubscribe_unknown_user_is_a_no_op() {
    let state = test_helpers::test_app_state();
    unsubscribe(&state, Uuid::new_v4(), Uuid::new_v4()).await;
}
