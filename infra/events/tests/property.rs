use courier_event_bus::{EventBus, Listener};
use parking_lot::Mutex;
use proptest::prelude::*;
use std::sync::Arc;

struct Ping;

#[derive(Debug, Clone)]
enum Op {
    Subscribe(usize),
    Unsubscribe(usize),
    Publish,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..4usize).prop_map(Op::Subscribe),
        (0..4usize).prop_map(Op::Unsubscribe),
        Just(Op::Publish),
    ]
}

proptest! {
    #[test]
    fn dispatch_order_matches_registration_model(ops in proptest::collection::vec(op(), 0..64)) {
        let bus = EventBus::new();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let listeners: Vec<Listener<Ping>> = (0..4)
            .map(|id| {
                let calls = Arc::clone(&calls);
                Listener::new(move |_: &Ping| calls.lock().push(id))
            })
            .collect();

        let mut model: Vec<usize> = Vec::new();

        for op in ops {
            match op {
                Op::Subscribe(id) => {
                    bus.subscribe(listeners[id].clone()).unwrap();
                    model.push(id);
                },
                Op::Unsubscribe(id) => {
                    let removed = bus.unsubscribe(&listeners[id]).unwrap();
                    let position = model.iter().rposition(|registered| *registered == id);
                    prop_assert_eq!(removed, position.is_some());
                    if let Some(position) = position {
                        model.remove(position);
                    }
                },
                Op::Publish => {
                    calls.lock().clear();
                    let invoked = bus.publish(Ping).unwrap();
                    prop_assert_eq!(invoked, model.len());
                    prop_assert_eq!(&*calls.lock(), &model);
                },
            }

            prop_assert_eq!(bus.listener_count::<Ping>(), model.len());
            prop_assert_eq!(bus.topic_exists::<Ping>(), !model.is_empty());
        }
    }
}
