use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use trai_event_bus::*;

#[derive(Clone, Debug, PartialEq, Eq)]
struct MealLogged(usize);

#[derive(Clone, Debug, PartialEq, Eq)]
struct AccountRemoved(&'static str);

#[tokio::test]
async fn publish_reaches_subscriber() {
    let bus = EventBus::new();
    let mut rx = bus.subscribe::<MealLogged>().unwrap();

    assert_eq!(bus.publish(MealLogged(42)).unwrap(), 1);

    let received = EventReceiverExt::recv(&mut rx).await.unwrap();
    assert_eq!(*received, MealLogged(42));
}

#[tokio::test]
async fn publish_without_subscribers_is_not_an_error() {
    let bus = EventBus::new();
    assert_eq!(bus.publish(MealLogged(1)).unwrap(), 0);
}

#[tokio::test]
async fn lagged_receiver_skips_to_the_tail() {
    let bus = EventBus::new();
    let capacity = 2;
    let mut rx = bus.subscribe_with_capacity::<MealLogged>(capacity).unwrap();

    let total = 100;
    for i in 0..total {
        bus.publish(MealLogged(i)).unwrap();
    }

    let first = EventReceiverExt::recv(&mut rx).await.expect("recovers from lag");
    assert!(first.0 >= total - capacity, "expected the fresh tail, got {}", first.0);

    let second = EventReceiverExt::recv(&mut rx).await.expect("keeps receiving");
    assert_eq!(second.0, first.0 + 1);
}

#[tokio::test]
async fn event_types_are_isolated() {
    let bus = EventBus::new();
    let mut meals = bus.subscribe::<MealLogged>().unwrap();
    let mut accounts = bus.subscribe::<AccountRemoved>().unwrap();

    bus.publish(MealLogged(7)).unwrap();
    bus.publish(AccountRemoved("u1")).unwrap();

    assert_eq!(EventReceiverExt::recv(&mut meals).await.unwrap().0, 7);
    assert_eq!(EventReceiverExt::recv(&mut accounts).await.unwrap().0, "u1");
}

#[tokio::test]
async fn zero_capacity_is_rejected() {
    let bus = EventBus::new();
    let err = bus.subscribe_with_capacity::<MealLogged>(0).unwrap_err();
    assert!(matches!(err, EventBusError::InvalidCapacity { .. }));
}

#[tokio::test]
async fn listener_handles_events_until_shutdown() {
    let bus = EventBus::new();
    let seen = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&seen);
    let task = bus
        .listen::<AccountRemoved, _, _>(move |_event| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        })
        .unwrap();

    bus.publish(AccountRemoved("a")).unwrap();
    bus.publish(AccountRemoved("b")).unwrap();

    assert_eq!(bus.shutdown(), 1);
    tokio::time::timeout(Duration::from_secs(1), task).await.unwrap().unwrap();
    assert_eq!(seen.load(Ordering::SeqCst), 2);
}

#[test]
fn listen_outside_runtime_fails() {
    let bus = EventBus::new();
    let err = bus.listen::<MealLogged, _, _>(|_| async {}).unwrap_err();
    assert!(matches!(err, EventBusError::Spawn { .. }));
}
