//! # Local Relay
//!
//! In-process composition of the message authority and the subscription
//! broker, plus a connector that gives client engines a transport without
//! any network. This is the seam a socket listener would plug into.

use std::sync::Arc;

use async_trait::async_trait;
use ep_01_message_authority::{MessageAuthority, MessageAuthorityApi};
use ep_02_subscription_broker::{run_subscriber_session, BrokerFanout, SubscriptionBroker};
use ep_03_client_engine::{ConnectorError, RelayConnector};
use shared_crypto::{Ed25519KeyPair, Ed25519PublicKey};
use shared_types::transport::{frame_duplex, FrameConn, DEFAULT_FRAME_CAPACITY};
use shared_types::wire::{
    InitiatePublishRequest, InitiatePublishResponse, InitiateSubscribeRequest,
    InitiateSubscribeResponse, PublishRequest, PublishResponse,
};
use tracing::info;

use crate::config::RelayConfig;

/// A fully wired relay living inside the current process.
pub struct LocalRelay {
    authority: Arc<MessageAuthority<BrokerFanout>>,
    broker: Arc<SubscriptionBroker>,
}

impl LocalRelay {
    /// Wire up a relay from configuration.
    #[must_use]
    pub fn new(config: &RelayConfig) -> Self {
        let keypair = match config.relay_seed {
            Some(seed) => Ed25519KeyPair::from_seed(seed),
            None => Ed25519KeyPair::generate(),
        };
        let broker = Arc::new(SubscriptionBroker::new());
        let fanout = BrokerFanout::new(Arc::clone(&broker));
        let authority = Arc::new(MessageAuthority::new(keypair, config.policy, fanout));
        info!(
            system_key = %authority.public_key().to_hex(),
            "Local relay wired"
        );
        Self { authority, broker }
    }

    /// The relay's system public key.
    #[must_use]
    pub fn system_public_key(&self) -> Ed25519PublicKey {
        self.authority.public_key()
    }

    /// Handle on the subscription broker.
    #[must_use]
    pub fn broker(&self) -> Arc<SubscriptionBroker> {
        Arc::clone(&self.broker)
    }

    /// A connector for wiring one client engine to this relay.
    #[must_use]
    pub fn connector(&self) -> LocalConnector {
        LocalConnector {
            authority: Arc::clone(&self.authority),
            broker: Arc::clone(&self.broker),
        }
    }
}

/// Connector calling the relay's services directly, no wire in between.
#[derive(Clone)]
pub struct LocalConnector {
    authority: Arc<MessageAuthority<BrokerFanout>>,
    broker: Arc<SubscriptionBroker>,
}

#[async_trait]
impl RelayConnector for LocalConnector {
    async fn initiate_publish(
        &self,
        request: &InitiatePublishRequest,
    ) -> Result<InitiatePublishResponse, ConnectorError> {
        self.authority
            .initiate_publish(request)
            .map_err(|error| ConnectorError::Rejected {
                reason: error.to_string(),
            })
    }

    async fn publish(&self, request: &PublishRequest) -> Result<PublishResponse, ConnectorError> {
        self.authority
            .publish(request)
            .await
            .map_err(|error| ConnectorError::Rejected {
                reason: error.to_string(),
            })
    }

    async fn initiate_subscribe(
        &self,
        request: &InitiateSubscribeRequest,
    ) -> Result<InitiateSubscribeResponse, ConnectorError> {
        self.authority
            .initiate_subscribe(request)
            .map_err(|error| ConnectorError::Rejected {
                reason: error.to_string(),
            })
    }

    async fn open_subscribe(&self) -> Result<FrameConn, ConnectorError> {
        let (client, relay) = frame_duplex(DEFAULT_FRAME_CAPACITY);
        let authority = Arc::clone(&self.authority);
        let broker = Arc::clone(&self.broker);
        tokio::spawn(async move {
            run_subscriber_session(authority, broker, relay).await;
        });
        Ok(client)
    }
}
