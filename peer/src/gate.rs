//! Arbitration gate: decides which broadcast messages this peer acts on.
//!
//! Every peer receives every message on the module channel, including its
//! own. Nothing in the envelope says who a message is "for"; each peer
//! filters on message content plus its own configured role and identity.

use crate::config::Role;
use tablesync_types::UserId;

#[derive(Clone, Debug)]
pub struct ArbitrationGate {
    role: Role,
    user_id: UserId,
}

impl ArbitrationGate {
    pub fn new(role: Role, user_id: UserId) -> Self {
        Self { role, user_id }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Commit-triggering messages are actionable only on the arbitrator.
    pub fn may_commit(&self) -> bool {
        self.role == Role::Arbitrator
    }

    pub fn is_self(&self, user: &UserId) -> bool {
        user == &self.user_id
    }

    /// User-addressed messages are actionable only on the addressee.
    pub fn addressed_to_us(&self, to_user: &UserId) -> bool {
        to_user == &self.user_id
    }

    /// A currency offer prompts here if this user owns the recipient actor,
    /// or this peer is the arbitrator (who may answer on an absent player's
    /// behalf).
    pub fn currency_offer_concerns_us(&self, owns_recipient: bool) -> bool {
        owns_recipient || self.may_commit()
    }

    /// An empty recipient list addresses everyone.
    pub fn info_concerns_us(&self, to_user_ids: &[UserId]) -> bool {
        to_user_ids.is_empty() || to_user_ids.contains(&self.user_id)
    }
}
