//! # Input Validation
//!
//! Checks applied to client-supplied channel names and size declarations
//! before a token is issued. Redemption never re-validates these: an
//! authentic token proves its fields passed here when it was issued.

use shared_types::{IntentError, RelayPolicy};

/// Whether a channel name is non-empty and within the allowed charset.
///
/// Allowed: ASCII alphanumerics plus `_`, `-`, `:`, `.`.
#[must_use]
pub fn valid_channel_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ':' | '.'))
}

/// Reject a channel name outside the allowed charset.
pub fn check_channel(name: &str) -> Result<(), IntentError> {
    if valid_channel_name(name) {
        Ok(())
    } else {
        Err(IntentError::InvalidChannel {
            channel: name.to_string(),
        })
    }
}

/// Reject a subscribe channel list that is too long or malformed.
pub fn check_channels(channels: &[String], policy: &RelayPolicy) -> Result<(), IntentError> {
    if channels.len() > policy.max_channels {
        return Err(IntentError::TooManyChannels {
            count: channels.len(),
            max: policy.max_channels,
        });
    }
    for channel in channels {
        check_channel(channel)?;
    }
    Ok(())
}

/// Reject a declared payload size outside the policy bounds.
pub fn check_message_size(size: u64, policy: &RelayPolicy) -> Result<(), IntentError> {
    if size < policy.min_message_size || size > policy.max_message_size {
        return Err(IntentError::InvalidMessageSize {
            size,
            min: policy.min_message_size,
            max: policy.max_message_size,
        });
    }
    Ok(())
}
