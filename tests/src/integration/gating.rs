//! # Gating Checks
//!
//! The authority's redemption gates driven with an explicit clock:
//! stateless token authentication, the temporal window, and the
//! proof-of-work bar. Everything here goes through the same service the
//! relay wires up, with the broker as the real fanout target.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ep_01_message_authority::MessageAuthority;
    use ep_02_subscription_broker::{BrokerFanout, SubscriptionBroker};
    use shared_crypto::{meets_difficulty, Ed25519KeyPair};
    use shared_types::errors::RedeemError;
    use shared_types::policy::{GatePolicy, RelayPolicy};
    use shared_types::wire::{InitiatePublishRequest, PublishRequest};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn authority(publish: GatePolicy) -> MessageAuthority<BrokerFanout> {
        let broker = Arc::new(SubscriptionBroker::new());
        let policy = RelayPolicy {
            publish,
            ..RelayPolicy::default()
        };
        MessageAuthority::new(
            Ed25519KeyPair::from_seed([0x42; 32]),
            policy,
            BrokerFanout::new(broker),
        )
    }

    /// Sign a payload, obtain a token at `now`, and build the redemption
    /// request with a placeholder solution.
    fn publish_request(
        authority: &MessageAuthority<BrokerFanout>,
        keys: &Ed25519KeyPair,
        channel: &str,
        message: &str,
        now: u64,
    ) -> PublishRequest {
        let request = InitiatePublishRequest {
            sender_public_key: keys.public_key().to_hex(),
            channel: channel.to_string(),
            message_size: message.len() as u64,
            message_signature: keys.sign(message.as_bytes()).to_hex(),
        };
        let issued = authority.initiate_publish_at(&request, now).unwrap();
        PublishRequest {
            publish_token: issued.publish_token,
            token_signature: issued.token_signature,
            message_json: message.to_string(),
            challenge_response: "0".to_string(),
        }
    }

    // =============================================================================
    // TEMPORAL WINDOW
    // =============================================================================

    #[tokio::test]
    async fn redemption_respects_the_temporal_window() {
        let authority = authority(GatePolicy {
            difficulty: 0,
            delay_ms: 500,
        });
        let keys = Ed25519KeyPair::from_seed([0x01; 32]);
        let issued_at: u64 = 1_700_000_000_000;

        let request = publish_request(&authority, &keys, "room1", "hello world", issued_at);

        let early = authority.publish_at(&request, issued_at + 100).await;
        assert!(matches!(
            early,
            Err(RedeemError::TooSoon { remaining_ms: 400 })
        ));

        let late = authority.publish_at(&request, issued_at + 60_001).await;
        assert!(matches!(late, Err(RedeemError::Expired { age_ms: 60_001 })));

        // The failed attempts consumed nothing; the token still redeems.
        let on_time = authority.publish_at(&request, issued_at + 500).await;
        assert!(on_time.is_ok());
    }

    // =============================================================================
    // TOKEN AUTHENTICATION
    // =============================================================================

    #[tokio::test]
    async fn every_single_byte_flip_fails_authentication() {
        let authority = authority(GatePolicy {
            difficulty: 0,
            delay_ms: 0,
        });
        let keys = Ed25519KeyPair::from_seed([0x02; 32]);
        let now: u64 = 1_700_000_000_000;

        let request = publish_request(&authority, &keys, "room1", "hello world", now);

        for index in 0..request.publish_token.len() {
            let mut bytes = request.publish_token.clone().into_bytes();
            bytes[index] ^= 0x01;
            let tampered = String::from_utf8(bytes).expect("ascii stays ascii");

            let result = authority
                .publish_at(
                    &PublishRequest {
                        publish_token: tampered,
                        ..request.clone()
                    },
                    now,
                )
                .await;
            assert!(
                matches!(result, Err(RedeemError::InvalidSignature)),
                "byte {index} slipped through"
            );
        }
    }

    #[tokio::test]
    async fn tampered_signature_fails_authentication() {
        let authority = authority(GatePolicy {
            difficulty: 0,
            delay_ms: 0,
        });
        let keys = Ed25519KeyPair::from_seed([0x03; 32]);
        let now: u64 = 1_700_000_000_000;

        let mut request = publish_request(&authority, &keys, "room1", "hello world", now);
        let mut signature = request.token_signature.clone().into_bytes();
        signature[10] ^= 0x01;
        request.token_signature = String::from_utf8(signature).unwrap();

        let result = authority.publish_at(&request, now).await;
        assert!(matches!(result, Err(RedeemError::InvalidSignature)));
    }

    // =============================================================================
    // PROOF-OF-WORK BAR
    // =============================================================================

    #[tokio::test]
    async fn challenge_difficulty_gates_redemption() {
        let authority = authority(GatePolicy {
            difficulty: 8,
            delay_ms: 0,
        });
        let keys = Ed25519KeyPair::from_seed([0x04; 32]);
        let now: u64 = 1_700_000_000_000;

        let mut request = publish_request(&authority, &keys, "room1", "hello world", now);

        // Find one solution on each side of the bar.
        let mut passing = None;
        let mut failing = None;
        for candidate in 0u64.. {
            let solution = format!("{candidate:016x}");
            if meets_difficulty(request.publish_token.as_bytes(), &solution, 8) {
                passing.get_or_insert(solution);
            } else {
                failing.get_or_insert(solution);
            }
            if passing.is_some() && failing.is_some() {
                break;
            }
        }

        request.challenge_response = failing.unwrap();
        let rejected = authority.publish_at(&request, now).await;
        assert!(matches!(
            rejected,
            Err(RedeemError::BadChallenge { difficulty: 8 })
        ));

        request.challenge_response = passing.unwrap();
        assert!(authority.publish_at(&request, now).await.is_ok());
    }

    #[tokio::test]
    async fn difficulty_zero_accepts_any_solution() {
        let authority = authority(GatePolicy {
            difficulty: 0,
            delay_ms: 0,
        });
        let keys = Ed25519KeyPair::from_seed([0x05; 32]);
        let now: u64 = 1_700_000_000_000;

        let mut request = publish_request(&authority, &keys, "room1", "hello world", now);
        request.challenge_response = "not even hex".to_string();

        assert!(authority.publish_at(&request, now).await.is_ok());
    }
}
