//! End-to-end scenarios over a running hub loop, backed by the
//! in-memory backplane.

mod support;

use std::sync::Arc;
use std::time::Duration;

use annot_backplane::Backplane;
use annot_config::HubConfig;
use annot_core::{PageKey, UserId};
use annot_hub::{hub, ControlIngress, SessionHandle};
use support::CountingBackplane;

async fn settle() {
    tokio::time::sleep(Duration::from_millis(30)).await;
}

fn session(user: &str) -> (Arc<SessionHandle>, tokio::sync::mpsc::Receiver<Vec<u8>>, tokio::sync::mpsc::Receiver<annot_hub::KeyUpdate>) {
    let (handle, outbound_rx, control_rx) = SessionHandle::new(UserId::from(user), 16, 16);
    (Arc::new(handle), outbound_rx, control_rx)
}

#[tokio::test]
async fn s1_lazy_subscribe_eager_teardown() {
    let backplane: Arc<CountingBackplane> = Arc::new(CountingBackplane::new());
    let dyn_backplane: Arc<dyn Backplane> = backplane.clone();
    let (hub_handle, _task) = hub::spawn(HubConfig::default(), dyn_backplane.clone());

    let (a, mut a_outbound, _a_control) = session("u1");
    hub_handle.open(a.clone()).await.unwrap();
    settle().await;

    let k1 = PageKey::from("k1");
    hub_handle.subscribe(a.id(), k1.clone()).await.unwrap();
    settle().await;
    assert_eq!(backplane.subscribe_count("page:k1"), 1);

    dyn_backplane.publish("page:k1", b"payload".to_vec()).await.unwrap();
    settle().await;
    let received = a_outbound.try_recv().expect("A should receive the page payload");
    assert_eq!(received, b"payload".to_vec());

    hub_handle.unsubscribe(a.id(), k1).await.unwrap();
    settle().await;
    // A second subscribe to the same key should re-establish a fresh
    // backplane subscription, proving the prior one was torn down.
    hub_handle
        .subscribe(a.id(), PageKey::from("k1"))
        .await
        .unwrap();
    settle().await;
    assert_eq!(backplane.subscribe_count("page:k1"), 2);
}

#[tokio::test]
async fn s2_shared_page_fan_out() {
    let backplane: Arc<CountingBackplane> = Arc::new(CountingBackplane::new());
    let dyn_backplane: Arc<dyn Backplane> = backplane.clone();
    let (hub_handle, _task) = hub::spawn(HubConfig::default(), dyn_backplane.clone());

    let (a, mut a_outbound, _) = session("u1");
    let (b, mut b_outbound, _) = session("u1");
    let (c, mut c_outbound, _) = session("u2");

    for s in [&a, &b, &c] {
        hub_handle.open(s.clone()).await.unwrap();
    }
    settle().await;

    let k1 = PageKey::from("k1");
    for s in [&a, &b, &c] {
        hub_handle.subscribe(s.id(), k1.clone()).await.unwrap();
    }
    settle().await;
    assert_eq!(backplane.subscribe_count("page:k1"), 1);

    dyn_backplane.publish("page:k1", b"hello".to_vec()).await.unwrap();
    settle().await;
    for rx in [&mut a_outbound, &mut b_outbound, &mut c_outbound] {
        assert_eq!(rx.try_recv().unwrap(), b"hello".to_vec());
        assert!(rx.try_recv().is_err(), "each session receives the message exactly once");
    }

    hub_handle.close(a.id()).await.unwrap();
    settle().await;
    dyn_backplane.publish("page:k1", b"still-live".to_vec()).await.unwrap();
    settle().await;
    assert_eq!(b_outbound.try_recv().unwrap(), b"still-live".to_vec());

    hub_handle.close(b.id()).await.unwrap();
    hub_handle.close(c.id()).await.unwrap();
    settle().await;

    // Teardown happened: a fresh subscribe recreates the subscription.
    let (d, _d_outbound, _) = session("u3");
    hub_handle.open(d.clone()).await.unwrap();
    hub_handle.subscribe(d.id(), PageKey::from("k1")).await.unwrap();
    settle().await;
    assert_eq!(backplane.subscribe_count("page:k1"), 2);
}

#[tokio::test]
async fn s3_user_connection_quota() {
    let backplane: Arc<dyn Backplane> = Arc::new(CountingBackplane::new());
    let (hub_handle, _task) = hub::spawn(HubConfig::default(), backplane);

    let mut outbounds = Vec::new();
    for _ in 0..4 {
        let (s, outbound_rx, _) = session("u1");
        hub_handle.open(s).await.unwrap();
        outbounds.push(outbound_rx);
    }
    settle().await;

    for outbound_rx in outbounds.iter_mut().take(3) {
        assert!(
            outbound_rx.try_recv().is_err(),
            "admitted sessions' outbound queue stays open"
        );
    }
    let fourth = outbounds.last_mut().unwrap();
    assert_eq!(
        fourth.recv().await,
        None,
        "the fourth session is rejected and its outbound queue closed"
    );
}

#[tokio::test]
async fn s4_subscription_quota() {
    let backplane: Arc<CountingBackplane> = Arc::new(CountingBackplane::new());
    let dyn_backplane: Arc<dyn Backplane> = backplane.clone();
    let (hub_handle, _task) = hub::spawn(HubConfig::default(), dyn_backplane);

    let (a, _outbound, _) = session("u1");
    hub_handle.open(a.clone()).await.unwrap();
    settle().await;

    for i in 0..51 {
        hub_handle
            .subscribe(a.id(), PageKey::from(format!("page-{i}")))
            .await
            .unwrap();
    }
    settle().await;

    assert_eq!(a.subscribed_pages().len(), 50);
    assert_eq!(backplane.subscribe_count("page:page-50"), 0);
}

#[tokio::test]
async fn s5_user_deletion_cascade() {
    let backplane: Arc<dyn Backplane> = Arc::new(CountingBackplane::new());
    let (hub_handle, _task) = hub::spawn(HubConfig::default(), backplane.clone());
    let _ingress = ControlIngress::spawn(&backplane, hub_handle.clone())
        .await
        .unwrap();

    let (a, mut a_outbound, _) = session("u1");
    let (b, mut b_outbound, _) = session("u1");
    hub_handle.open(a.clone()).await.unwrap();
    hub_handle.open(b.clone()).await.unwrap();
    hub_handle
        .subscribe(a.id(), PageKey::from("k1"))
        .await
        .unwrap();
    settle().await;

    backplane
        .publish("user-deleted", br#"{"userId":"u1"}"#.to_vec())
        .await
        .unwrap();
    settle().await;

    assert_eq!(a_outbound.recv().await, None);
    assert_eq!(b_outbound.recv().await, None);

    hub_handle.close(a.id()).await.unwrap();
    hub_handle.close(b.id()).await.unwrap();
    settle().await;
}

#[tokio::test]
async fn s6_key_rotation_broadcast() {
    let backplane: Arc<dyn Backplane> = Arc::new(CountingBackplane::new());
    let (hub_handle, _task) = hub::spawn(HubConfig::default(), backplane.clone());
    let _ingress = ControlIngress::spawn(&backplane, hub_handle.clone())
        .await
        .unwrap();

    let (a, mut a_outbound, mut a_control) = session("u1");
    let (b, mut b_outbound, mut b_control) = session("u1");
    hub_handle.open(a.clone()).await.unwrap();
    hub_handle.open(b.clone()).await.unwrap();
    settle().await;

    backplane
        .publish(
            "user-keys-updated",
            br#"{"userId":"u1","keyVersion":7,"keysDeleted":false}"#.to_vec(),
        )
        .await
        .unwrap();
    settle().await;

    let expected_envelope = br#"{"type":"keys_updated","data":{"keyVersion":7,"keysDeleted":false}}"#;
    for outbound_rx in [&mut a_outbound, &mut b_outbound] {
        let bytes = outbound_rx.try_recv().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let expected: serde_json::Value = serde_json::from_slice(expected_envelope).unwrap();
        assert_eq!(value, expected);
    }
    for control_rx in [&mut a_control, &mut b_control] {
        let update = control_rx.try_recv().unwrap();
        assert_eq!(update.key_version, 7);
        assert!(!update.keys_deleted);
    }
}
