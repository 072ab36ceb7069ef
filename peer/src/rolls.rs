//! Roll requests: the arbitrator prompts chosen players to make a skill
//! roll. One-way traffic; the roll itself happens in the host's dice
//! pipeline, outside this crate.

use std::sync::Arc;

use tablesync_messages::{Message, PoolModifiers, RollMode, RollRequest};
use tablesync_types::UserId;
use tracing::info;

use crate::config::SessionConfig;
use crate::directory::SessionDirectory;
use crate::events::{EventBus, PeerEvent};
use crate::gate::ArbitrationGate;
use crate::transport::ChannelAdapter;
use crate::PeerError;

/// What each targeted player is asked to roll.
#[derive(Clone, Debug)]
pub struct RollSpec {
    pub skill_key: String,
    pub skill_label: String,
    pub pool_mods: PoolModifiers,
    pub roll_mode: RollMode,
    /// Chat label; derived from the skill label when `None`.
    pub label: Option<String>,
}

impl RollSpec {
    pub fn new(skill_key: impl Into<String>, skill_label: impl Into<String>) -> Self {
        Self {
            skill_key: skill_key.into(),
            skill_label: skill_label.into(),
            pool_mods: PoolModifiers::default(),
            roll_mode: RollMode::default(),
            label: None,
        }
    }

    pub fn with_pool_mods(mut self, pool_mods: PoolModifiers) -> Self {
        self.pool_mods = pool_mods;
        self
    }

    pub fn with_roll_mode(mut self, roll_mode: RollMode) -> Self {
        self.roll_mode = roll_mode;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    fn chat_label(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| format!("Requested roll: {}", self.skill_label))
    }
}

pub struct RollEngine {
    config: Arc<SessionConfig>,
    gate: ArbitrationGate,
    directory: Arc<dyn SessionDirectory>,
    outbound: ChannelAdapter,
    events: Arc<EventBus>,
}

impl RollEngine {
    pub(crate) fn new(
        config: Arc<SessionConfig>,
        gate: ArbitrationGate,
        directory: Arc<dyn SessionDirectory>,
        outbound: ChannelAdapter,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            config,
            gate,
            directory,
            outbound,
            events,
        }
    }

    /// Broadcast one targeted request per user. Every target must be
    /// connected and playing a character; the first that is not fails the
    /// whole call before anything is sent.
    pub fn request_roll(&self, targets: &[UserId], spec: &RollSpec) -> Result<usize, PeerError> {
        if !self.config.enable_roll_requests {
            return Err(PeerError::NotPermitted("roll requests are disabled"));
        }
        if !self.gate.may_commit() {
            return Err(PeerError::NotPermitted(
                "only the arbitrator sends roll requests",
            ));
        }
        if targets.is_empty() {
            return Err(PeerError::NoRecipientSelected);
        }

        let mut requests = Vec::with_capacity(targets.len());
        for target in targets {
            let user = self
                .directory
                .user(target)
                .filter(|user| user.active)
                .ok_or_else(|| {
                    PeerError::RecipientUnavailable(format!("user {target} is not connected"))
                })?;
            let actor_id = user.character.ok_or_else(|| {
                PeerError::RecipientUnavailable(format!(
                    "user {target} has no character to roll with"
                ))
            })?;
            requests.push(RollRequest {
                from_gm: self.gate.user_id().clone(),
                to_user: target.clone(),
                actor_id,
                skill_key: spec.skill_key.clone(),
                skill_label: spec.skill_label.clone(),
                pool_mods: spec.pool_mods,
                roll_mode: spec.roll_mode,
                label: spec.chat_label(),
            });
        }

        let count = requests.len();
        info!(skill = %spec.skill_key, targets = count, "broadcasting roll requests");
        for request in requests {
            self.outbound.emit(Message::RollRequest(request));
        }
        Ok(count)
    }

    /// Receivers self-filter by the addressed user; everyone else drops it.
    pub fn handle_request(&self, request: RollRequest) -> Result<(), PeerError> {
        if !self.gate.addressed_to_us(&request.to_user) {
            return Ok(());
        }
        let gm_name = self
            .directory
            .user(&request.from_gm)
            .map(|user| user.name)
            .unwrap_or_else(|| "Unknown".to_string());
        self.events.emit(&PeerEvent::RollPrompt { request, gm_name });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Role;
    use crate::directory::{SessionUser, StaticDirectory};
    use tokio::sync::mpsc;

    fn engine(role: Role) -> (RollEngine, mpsc::UnboundedReceiver<tablesync_messages::Envelope>) {
        let mut directory = StaticDirectory::new();
        directory.add_user(SessionUser::new("gm", "The GM").arbitrator());
        directory.add_user(SessionUser::new("u1", "Alice").with_character("a1"));
        directory.add_user(SessionUser::new("u2", "Bob"));
        directory.add_user(SessionUser::new("u3", "Carol").with_character("a3").inactive());

        let (tx, rx) = mpsc::unbounded_channel();
        let user_id = if role == Role::Arbitrator { "gm" } else { "u1" };
        let config = Arc::new(SessionConfig::for_user(user_id).with_role(role));
        let gate = ArbitrationGate::new(role, user_id.into());
        let engine = RollEngine::new(
            config,
            gate,
            Arc::new(directory),
            ChannelAdapter::new(tx),
            Arc::new(EventBus::new()),
        );
        (engine, rx)
    }

    #[test]
    fn participants_cannot_request_rolls() {
        let (engine, _rx) = engine(Role::Participant);
        let result = engine.request_roll(&["u2".into()], &RollSpec::new("coordination", "Coordination"));
        assert!(matches!(result, Err(PeerError::NotPermitted(_))));
    }

    #[test]
    fn each_target_gets_its_own_request() {
        let (engine, mut rx) = engine(Role::Arbitrator);
        let spec = RollSpec::new("vigilance", "Vigilance");
        // u1 is the only eligible target in the roster; one request, one
        // envelope.
        let sent = engine.request_roll(&["u1".into()], &spec).unwrap();
        assert_eq!(sent, 1);
        let envelope = rx.try_recv().unwrap();
        match envelope.message {
            Message::RollRequest(request) => {
                assert_eq!(request.to_user.as_str(), "u1");
                assert_eq!(request.actor_id.as_str(), "a1");
                assert_eq!(request.label, "Requested roll: Vigilance");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn characterless_and_offline_targets_fail_before_sending() {
        let (engine, mut rx) = engine(Role::Arbitrator);
        let spec = RollSpec::new("cool", "Cool");
        assert!(matches!(
            engine.request_roll(&["u2".into()], &spec),
            Err(PeerError::RecipientUnavailable(_))
        ));
        assert!(matches!(
            engine.request_roll(&["u3".into()], &spec),
            Err(PeerError::RecipientUnavailable(_))
        ));
        // A bad target anywhere in the list blocks the whole batch.
        assert!(engine
            .request_roll(&["u1".into(), "u2".into()], &spec)
            .is_err());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn empty_target_list_is_rejected() {
        let (engine, _rx) = engine(Role::Arbitrator);
        assert!(matches!(
            engine.request_roll(&[], &RollSpec::new("charm", "Charm")),
            Err(PeerError::NoRecipientSelected)
        ));
    }
}
