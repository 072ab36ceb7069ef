//! Read-only view of the host's user/session directory.

use std::collections::HashMap;
use tablesync_types::{ActorId, UserId};

/// One connected (or known) user as the host reports them.
#[derive(Clone, Debug)]
pub struct SessionUser {
    pub id: UserId,
    pub name: String,
    pub active: bool,
    pub is_arbitrator: bool,
    /// The actor this user plays, if any.
    pub character: Option<ActorId>,
}

impl SessionUser {
    pub fn new(id: impl Into<UserId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            active: true,
            is_arbitrator: false,
            character: None,
        }
    }

    pub fn arbitrator(mut self) -> Self {
        self.is_arbitrator = true;
        self
    }

    pub fn with_character(mut self, actor: impl Into<ActorId>) -> Self {
        self.character = Some(actor.into());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

/// The host's session view: who is connected and which users own which
/// actors. Queried live, never cached, so ownership and presence reflect
/// the session as it is right now.
pub trait SessionDirectory: Send + Sync {
    /// Users currently connected to the session.
    fn active_users(&self) -> Vec<SessionUser>;

    /// Look up one user, connected or not.
    fn user(&self, id: &UserId) -> Option<SessionUser>;

    /// Users with owner permission on an actor.
    fn owners_of(&self, actor: &ActorId) -> Vec<UserId>;

    fn owns_actor(&self, user: &UserId, actor: &ActorId) -> bool {
        self.owners_of(actor).iter().any(|owner| owner == user)
    }

    /// Users an item or currency offer may target: connected, playing a
    /// character, and not the arbitrator.
    fn eligible_recipients(&self) -> Vec<SessionUser> {
        self.active_users()
            .into_iter()
            .filter(|user| !user.is_arbitrator && user.character.is_some())
            .collect()
    }
}

/// A fixed directory snapshot. Backs tests and single-table embeddings
/// where the roster does not change mid-session.
#[derive(Default)]
pub struct StaticDirectory {
    users: Vec<SessionUser>,
    owners: HashMap<ActorId, Vec<UserId>>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user; their assigned character (if any) is recorded as owned
    /// by them.
    pub fn add_user(&mut self, user: SessionUser) {
        if let Some(actor) = &user.character {
            self.grant_ownership(actor.clone(), user.id.clone());
        }
        self.users.push(user);
    }

    pub fn grant_ownership(&mut self, actor: impl Into<ActorId>, user: impl Into<UserId>) {
        let owners = self.owners.entry(actor.into()).or_default();
        let user = user.into();
        if !owners.contains(&user) {
            owners.push(user);
        }
    }
}

impl SessionDirectory for StaticDirectory {
    fn active_users(&self) -> Vec<SessionUser> {
        self.users.iter().filter(|u| u.active).cloned().collect()
    }

    fn user(&self, id: &UserId) -> Option<SessionUser> {
        self.users.iter().find(|u| &u.id == id).cloned()
    }

    fn owners_of(&self, actor: &ActorId) -> Vec<UserId> {
        self.owners.get(actor).cloned().unwrap_or_default()
    }
}
