//! Ordering tests for the bus
//!
//! Publishers running on different worker threads share one sequencer per
//! topic; every subscription must observe strictly increasing sequences.

use bus::{Bus, QosProfile};
use types::messages::TargetValue;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_publishers_keep_sequences_monotonic() {
    let bus = Bus::new();
    let qos = QosProfile::keep_last(1024);
    let mut sub = bus.create_subscription::<TargetValue>("/target", qos).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let publisher = bus
                .create_publisher::<TargetValue>(&format!("worker_{}", worker), "/target", qos)
                .unwrap();
            tokio::spawn(async move {
                for v in 0..100i8 {
                    publisher.publish(TargetValue::new(v));
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap();
    }

    let mut last = 0;
    let mut received = 0;
    while let Some(delivery) = sub.try_recv() {
        assert!(delivery.sequence > last, "sequence went backwards");
        assert_eq!(delivery.missed, 0);
        last = delivery.sequence;
        received += 1;
    }

    assert_eq!(received, 400);
    assert_eq!(last, 400);
}

#[tokio::test]
async fn test_recv_ends_when_bus_dropped() {
    let bus = Bus::new();
    let mut sub = bus
        .create_subscription::<TargetValue>("/target", QosProfile::default())
        .unwrap();
    drop(bus);

    assert!(sub.recv().await.is_none());
}
