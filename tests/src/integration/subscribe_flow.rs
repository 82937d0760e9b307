//! # Subscribe Flow
//!
//! Wire-level handshakes against the real subscriber session, replacement
//! semantics across re-subscribes, registration teardown when the client
//! side goes away, and the fail-closed delivery chain against a relay that
//! misbehaves after the handshake.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    use async_trait::async_trait;
    use ep_03_client_engine::{ClientProtocolEngine, ConnectorError, RelayConnector};
    use relay_runtime::{LocalRelay, RelayConfig};
    use shared_crypto::Ed25519KeyPair;
    use shared_types::entities::{RelayMessage, SubscribeToken, SystemStamp};
    use shared_types::policy::{GatePolicy, RelayPolicy};
    use shared_types::transport::{frame_duplex, FrameConn};
    use shared_types::wire::{
        DeliveryEnvelope, InitiatePublishRequest, InitiatePublishResponse,
        InitiateSubscribeRequest, InitiateSubscribeResponse, PublishRequest, PublishResponse,
        SubscribeHandshake, SubscriberFrame,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn open_config() -> RelayConfig {
        RelayConfig {
            policy: RelayPolicy {
                publish: GatePolicy {
                    difficulty: 0,
                    delay_ms: 0,
                },
                subscribe: GatePolicy {
                    difficulty: 0,
                    delay_ms: 0,
                },
                ..RelayPolicy::default()
            },
            relay_seed: None,
        }
    }

    async fn wait_until<F: Fn() -> bool>(condition: F) -> bool {
        for _ in 0..100 {
            if condition() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        condition()
    }

    // =============================================================================
    // HANDSHAKES OVER THE WIRE
    // =============================================================================

    #[tokio::test]
    async fn reordered_channels_are_rejected_at_handshake() {
        let relay = LocalRelay::new(&open_config());
        let connector = relay.connector();

        let issued = connector
            .initiate_subscribe(&InitiateSubscribeRequest {
                channels: vec!["b".to_string(), "a".to_string()],
            })
            .await
            .unwrap();

        // Same set, different order.
        let handshake = SubscribeHandshake {
            channels: vec!["a".to_string(), "b".to_string()],
            subscribe_token: issued.subscribe_token,
            token_signature: issued.token_signature,
            challenge_response: "00".to_string(),
        };

        let mut conn = connector.open_subscribe().await.unwrap();
        conn.tx
            .send(serde_json::to_string(&handshake).unwrap())
            .await
            .unwrap();

        let raw = timeout(Duration::from_secs(1), conn.rx.recv())
            .await
            .unwrap()
            .unwrap();
        match serde_json::from_str::<SubscriberFrame>(&raw).unwrap() {
            SubscriberFrame::SubscribeRejected { reason } => {
                assert!(reason.contains("channels"));
            }
            other => panic!("expected rejection, got {other:?}"),
        }

        // The session closed without registering anything.
        assert!(timeout(Duration::from_secs(1), conn.rx.recv())
            .await
            .unwrap()
            .is_none());
        assert_eq!(relay.broker().connection_count(), 0);
    }

    #[tokio::test]
    async fn resubscribe_keeps_exactly_one_registration() {
        let relay = LocalRelay::new(&open_config());
        let engine = ClientProtocolEngine::new(relay.connector(), Ed25519KeyPair::generate());
        let broker = relay.broker();

        let _first = engine.subscribe(vec!["room1".to_string()]).await.unwrap();
        assert_eq!(broker.subscriber_count("room1"), 1);

        let _second = engine.subscribe(vec!["room2".to_string()]).await.unwrap();
        assert_eq!(broker.subscriber_count("room2"), 1);

        // The old registration disappears once the session observes the
        // close; the new one is the only survivor.
        let settled = {
            let broker = Arc::clone(&broker);
            wait_until(move || {
                broker.subscriber_count("room1") == 0 && broker.connection_count() == 1
            })
            .await
        };
        assert!(settled, "old registration still live");
    }

    #[tokio::test]
    async fn dropped_subscription_unregisters_after_next_delivery() {
        let relay = LocalRelay::new(&open_config());
        let engine = ClientProtocolEngine::new(relay.connector(), Ed25519KeyPair::generate());
        let broker = relay.broker();

        let subscription = engine.subscribe(vec!["room1".to_string()]).await.unwrap();
        assert_eq!(broker.subscriber_count("room1"), 1);
        drop(subscription);

        // The next delivery attempt trips the closed handle and the whole
        // chain tears down: reader, transport, registration.
        let publisher = ClientProtocolEngine::new(relay.connector(), Ed25519KeyPair::generate());
        publisher.publish("room1", "wake up").await.unwrap();

        let settled = {
            let broker = Arc::clone(&broker);
            wait_until(move || broker.subscriber_count("room1") == 0).await
        };
        assert!(settled, "registration outlived its subscriber");
    }

    // =============================================================================
    // FAIL-CLOSED DELIVERY
    // =============================================================================

    fn stamped_delivery(
        relay_keys: &Ed25519KeyPair,
        channel: &str,
        payload: &str,
    ) -> DeliveryEnvelope {
        let sender = Ed25519KeyPair::from_seed([0x44; 32]);
        let message_signature = sender.sign(payload.as_bytes()).to_hex();
        let stamp = SystemStamp {
            channel: channel.to_string(),
            sender_public_key: sender.public_key().to_hex(),
            timestamp: 1_700_000_000_000,
            message_signature: message_signature.clone(),
        };
        let system_signature_payload = stamp.to_json();
        let system_signature = relay_keys.sign(system_signature_payload.as_bytes()).to_hex();
        DeliveryEnvelope {
            channel: channel.to_string(),
            message: RelayMessage {
                channel: channel.to_string(),
                sender_public_key: sender.public_key().to_hex(),
                timestamp: stamp.timestamp,
                message_json: payload.to_string(),
                message_signature,
                system_signature_payload,
                system_signature,
                system_public_key: relay_keys.public_key().to_hex(),
            },
        }
    }

    /// Acks the handshake, delivers one honest message, then one whose
    /// stamp disagrees with the message, then holds the line open.
    async fn run_rogue_session(keys: Arc<Ed25519KeyPair>, mut conn: FrameConn) {
        let _handshake = conn.rx.recv().await;
        let ack = serde_json::to_string(&SubscriberFrame::SubscribeAck).unwrap();
        if conn.tx.send(ack).await.is_err() {
            return;
        }

        let honest = stamped_delivery(&keys, "room1", "trust me");
        let frame = serde_json::to_string(&SubscriberFrame::Delivery(honest)).unwrap();
        let _ = conn.tx.send(frame).await;

        let mut forged = stamped_delivery(&keys, "room1", "do not trust me");
        forged.message.timestamp += 1;
        let frame = serde_json::to_string(&SubscriberFrame::Delivery(forged)).unwrap();
        let _ = conn.tx.send(frame).await;

        // Hold the connection until the client hangs up.
        while conn.rx.recv().await.is_some() {}
    }

    /// A connector backed by a misbehaving relay: issuance is honest,
    /// the subscriber session is not.
    #[derive(Clone)]
    struct RogueRelay {
        keys: Arc<Ed25519KeyPair>,
    }

    #[async_trait]
    impl RelayConnector for RogueRelay {
        async fn initiate_publish(
            &self,
            _request: &InitiatePublishRequest,
        ) -> Result<InitiatePublishResponse, ConnectorError> {
            unimplemented!("publish is not scripted")
        }

        async fn publish(
            &self,
            _request: &PublishRequest,
        ) -> Result<PublishResponse, ConnectorError> {
            unimplemented!("publish is not scripted")
        }

        async fn initiate_subscribe(
            &self,
            request: &InitiateSubscribeRequest,
        ) -> Result<InitiateSubscribeResponse, ConnectorError> {
            let token = SubscribeToken {
                timestamp: 1_700_000_000_000,
                difficulty: 0,
                delay_ms: 0,
                channels: request.channels.clone(),
            };
            let json = token.to_json();
            let signature = self.keys.sign(json.as_bytes()).to_hex();
            Ok(InitiateSubscribeResponse {
                subscribe_token: json,
                token_signature: signature,
            })
        }

        async fn open_subscribe(&self) -> Result<FrameConn, ConnectorError> {
            let (client, relay) = frame_duplex(8);
            tokio::spawn(run_rogue_session(Arc::clone(&self.keys), relay));
            Ok(client)
        }
    }

    #[tokio::test]
    async fn forged_stamp_closes_the_channel_after_honest_traffic() {
        let rogue = RogueRelay {
            keys: Arc::new(Ed25519KeyPair::from_seed([0x77; 32])),
        };
        let engine = ClientProtocolEngine::new(rogue, Ed25519KeyPair::generate());

        let mut subscription = engine.subscribe(vec!["room1".to_string()]).await.unwrap();

        let first = timeout(Duration::from_secs(1), subscription.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.message_json, "trust me");

        // The forged frame never surfaces; the channel dies instead.
        assert!(timeout(Duration::from_secs(1), subscription.recv())
            .await
            .unwrap()
            .is_none());
    }
}
