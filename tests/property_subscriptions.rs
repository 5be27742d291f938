use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use hackathon_coordinator::domain::models::{Event, EventPayload, EventType};
use hackathon_coordinator::services::EventBus;
use proptest::prelude::*;

const SUBSCRIBERS: [&str; 4] = ["registration", "marketing", "judging", "logistics"];

#[derive(Debug, Clone)]
enum Op {
    Subscribe { subscriber: usize, event_type: usize },
    Unsubscribe { subscriber: usize, event_type: usize },
}

fn op() -> impl Strategy<Value = Op> {
    let indices = (0..SUBSCRIBERS.len(), 0..EventType::ALL.len());
    prop_oneof![
        3 => indices.clone().prop_map(|(subscriber, event_type)| Op::Subscribe { subscriber, event_type }),
        1 => indices.prop_map(|(subscriber, event_type)| Op::Unsubscribe { subscriber, event_type }),
    ]
}

proptest! {
    /// Property: A subscriber is registered at most once per event type,
    /// however often it subscribes
    #[test]
    fn prop_subscription_is_idempotent(ops in proptest::collection::vec(op(), 0..60)) {
        let bus = EventBus::default();
        let mut model = [[false; EventType::ALL.len()]; SUBSCRIBERS.len()];

        for op in &ops {
            match *op {
                Op::Subscribe { subscriber, event_type } => {
                    bus.subscribe(EventType::ALL[event_type], SUBSCRIBERS[subscriber], |_: &Event| Ok(()));
                    model[subscriber][event_type] = true;
                }
                Op::Unsubscribe { subscriber, event_type } => {
                    bus.unsubscribe(EventType::ALL[event_type], SUBSCRIBERS[subscriber]);
                    model[subscriber][event_type] = false;
                }
            }
        }

        for (t, event_type) in EventType::ALL.iter().enumerate() {
            let expected = model.iter().filter(|row| row[t]).count();
            prop_assert_eq!(bus.subscriber_count(*event_type), expected);
            prop_assert_eq!(bus.has_bucket(*event_type), expected > 0);
        }
    }

    /// Property: Repeated subscription never causes repeated delivery
    #[test]
    fn prop_repeat_subscribe_delivers_once(repeats in 1usize..10, publishes in 1usize..10) {
        let bus = EventBus::default();
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..repeats {
            let calls = Arc::clone(&calls);
            bus.subscribe(EventType::RegistrationUpdated, "marketing", move |_: &Event| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        }
        for _ in 0..publishes {
            bus.publish(EventPayload::RegistrationUpdated { new_registrations: 1 }, "registration", None);
        }

        prop_assert_eq!(calls.load(Ordering::SeqCst), publishes);
    }
}
