//! The channel envelope around a wire message.

use crate::Message;
use serde::{Deserialize, Serialize};

/// The one named channel this module shares for all of its traffic.
pub const MODULE_CHANNEL: &str = "module.tablesync";

/// A message paired with the channel it was emitted on.
///
/// The transport delivers every envelope to every connected peer, the emitter
/// included. Receivers drop envelopes for channels that are not theirs; all
/// finer routing is decided from the message contents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub channel: String,
    pub message: Message,
}

impl Envelope {
    /// Wrap a message for the module channel.
    pub fn on_module_channel(message: Message) -> Self {
        Self {
            channel: MODULE_CHANNEL.to_string(),
            message,
        }
    }

    pub fn is_module_channel(&self) -> bool {
        self.channel == MODULE_CHANNEL
    }
}
