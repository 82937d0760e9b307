//! # End-to-End Publish Flow
//!
//! Publisher and subscriber engines wired to one in-process relay:
//! token round trips, the mandatory delay, fanout targeting, and the
//! client-side trust chain on delivered messages.

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};
    use tokio::time::timeout;

    use ep_03_client_engine::ClientProtocolEngine;
    use relay_runtime::{LocalRelay, RelayConfig};
    use shared_crypto::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
    use shared_types::policy::{GatePolicy, RelayPolicy};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn relay_config(publish: GatePolicy, subscribe: GatePolicy) -> RelayConfig {
        RelayConfig {
            policy: RelayPolicy {
                publish,
                subscribe,
                ..RelayPolicy::default()
            },
            relay_seed: None,
        }
    }

    fn open_gate() -> GatePolicy {
        GatePolicy {
            difficulty: 0,
            delay_ms: 0,
        }
    }

    // =============================================================================
    // FLOWS
    // =============================================================================

    #[tokio::test]
    async fn hello_world_reaches_a_live_subscriber() {
        let relay = LocalRelay::new(&relay_config(
            GatePolicy {
                difficulty: 0,
                delay_ms: 500,
            },
            open_gate(),
        ));

        let subscriber = ClientProtocolEngine::new(relay.connector(), Ed25519KeyPair::generate());
        let mut subscription = subscriber
            .subscribe(vec!["room1".to_string()])
            .await
            .unwrap();

        let publisher = ClientProtocolEngine::new(relay.connector(), Ed25519KeyPair::generate());
        let started = Instant::now();
        publisher.publish("room1", "hello world").await.unwrap();
        // The mandatory delay is honored before redemption.
        assert!(started.elapsed() >= Duration::from_millis(500));

        let message = timeout(Duration::from_secs(1), subscription.recv())
            .await
            .expect("delivery within a second")
            .expect("channel open");
        assert_eq!(message.channel, "room1");
        assert_eq!(message.message_json, "hello world");

        // Both halves of the trust chain verify independently.
        let sender_key = Ed25519PublicKey::from_hex(&message.sender_public_key).unwrap();
        let sender_sig = Ed25519Signature::from_hex(&message.message_signature).unwrap();
        assert!(sender_key
            .verify(message.message_json.as_bytes(), &sender_sig)
            .is_ok());
        assert_eq!(message.sender_public_key, publisher.public_key().to_hex());

        let system_key = Ed25519PublicKey::from_hex(&message.system_public_key).unwrap();
        let system_sig = Ed25519Signature::from_hex(&message.system_signature).unwrap();
        assert!(system_key
            .verify(message.system_signature_payload.as_bytes(), &system_sig)
            .is_ok());
        assert_eq!(message.system_public_key, relay.system_public_key().to_hex());
    }

    #[tokio::test]
    async fn fanout_reaches_exactly_the_registered_channel() {
        let relay = LocalRelay::new(&relay_config(open_gate(), open_gate()));

        let first = ClientProtocolEngine::new(relay.connector(), Ed25519KeyPair::generate());
        let second = ClientProtocolEngine::new(relay.connector(), Ed25519KeyPair::generate());
        let bystander = ClientProtocolEngine::new(relay.connector(), Ed25519KeyPair::generate());

        let mut sub_first = first.subscribe(vec!["room1".to_string()]).await.unwrap();
        let mut sub_second = second.subscribe(vec!["room1".to_string()]).await.unwrap();
        let mut sub_bystander = bystander.subscribe(vec!["other".to_string()]).await.unwrap();

        let broker = relay.broker();
        assert_eq!(broker.subscriber_count("room1"), 2);
        assert_eq!(broker.subscriber_count("other"), 1);

        let publisher = ClientProtocolEngine::new(relay.connector(), Ed25519KeyPair::generate());
        publisher.publish("room1", "fanout probe").await.unwrap();

        let a = timeout(Duration::from_secs(1), sub_first.recv())
            .await
            .unwrap()
            .unwrap();
        let b = timeout(Duration::from_secs(1), sub_second.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(a.message_json, "fanout probe");
        assert_eq!(b.message_json, "fanout probe");

        // The bystander's channel stays silent.
        assert!(timeout(Duration::from_millis(100), sub_bystander.recv())
            .await
            .is_err());

        let stats = broker.stats();
        assert_eq!(stats.messages_published, 1);
        assert_eq!(stats.frames_delivered, 2);
        assert_eq!(stats.frames_dropped, 0);
    }

    #[tokio::test]
    async fn publish_with_no_subscribers_still_succeeds() {
        let relay = LocalRelay::new(&relay_config(open_gate(), open_gate()));
        let publisher = ClientProtocolEngine::new(relay.connector(), Ed25519KeyPair::generate());

        publisher.publish("empty-room", "anyone there").await.unwrap();

        // The message is gone; nothing was queued for later.
        let stats = relay.broker().stats();
        assert_eq!(stats.messages_published, 1);
        assert_eq!(stats.frames_delivered, 0);
    }

    #[tokio::test]
    async fn two_messages_arrive_in_publish_order() {
        let relay = LocalRelay::new(&relay_config(open_gate(), open_gate()));

        let subscriber = ClientProtocolEngine::new(relay.connector(), Ed25519KeyPair::generate());
        let mut subscription = subscriber
            .subscribe(vec!["room1".to_string()])
            .await
            .unwrap();

        let publisher = ClientProtocolEngine::new(relay.connector(), Ed25519KeyPair::generate());
        publisher.publish("room1", "first").await.unwrap();
        publisher.publish("room1", "second").await.unwrap();

        let one = timeout(Duration::from_secs(1), subscription.recv())
            .await
            .unwrap()
            .unwrap();
        let two = timeout(Duration::from_secs(1), subscription.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(one.message_json, "first");
        assert_eq!(two.message_json, "second");
    }
}
