//! Test doubles shared by this crate's tests and the bot's.

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

use async_trait::async_trait;

use crate::{
    Actor, Error, Id, Message, Response, Role, Transport, TransportError,
    commands::{CommandEventHandler, FaultKind, FaultReport},
};

pub const GUILD_ID: Id = 1;
pub const CHANNEL_ID: Id = 10;
pub const USER_ID: Id = 100;
pub const BOT_ID: Id = 999;

static MESSAGE_IDS: AtomicU64 = AtomicU64::new(1000);

/// Every call made on a [`MockTransport`], in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Send {
        channel_id: Id,
        response: Response,
    },
    React {
        channel_id: Id,
        message_id: Id,
        emoji: String,
    },
    AddRole {
        guild_id: Id,
        actor_id: Id,
        role: Role,
    },
    RemoveRole {
        guild_id: Id,
        actor_id: Id,
        role: Role,
    },
}

#[derive(Default)]
struct Recorded {
    calls: Vec<Call>,
    guild_roles: Vec<Role>,
    actor_roles: HashMap<Id, Vec<Role>>,
    role_error: Option<TransportError>,
    send_error: Option<TransportError>,
}

/// A transport that records what it was asked to do.
#[derive(Default)]
pub struct MockTransport {
    inner: Mutex<Recorded>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sets the guild's roles; ids are assigned in order starting at 1.
    pub fn set_guild_roles(&self, names: &[&str]) {
        self.lock().guild_roles = roles(names);
    }

    pub fn set_actor_roles(&self, actor_id: Id, names: &[&str]) {
        self.lock().actor_roles.insert(actor_id, roles(names));
    }

    /// Makes every role change fail with `error`.
    pub fn fail_role_changes(&self, error: TransportError) {
        self.lock().role_error = Some(error);
    }

    pub fn fail_sends(&self, error: TransportError) {
        self.lock().send_error = Some(error);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn responses(&self) -> Vec<Response> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Send { response, .. } => Some(response),
                _ => None,
            })
            .collect()
    }

    pub fn reactions(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::React { emoji, .. } => Some(emoji),
                _ => None,
            })
            .collect()
    }

    pub fn role_changes(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, Call::AddRole { .. } | Call::RemoveRole { .. }))
            .collect()
    }

    pub fn clear(&self) {
        self.lock().calls.clear();
    }
}

fn roles(names: &[&str]) -> Vec<Role> {
    names
        .iter()
        .zip(1..)
        .map(|(name, id)| Role {
            id,
            name: name.to_string(),
        })
        .collect()
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_response(
        &self,
        channel_id: Id,
        response: Response,
    ) -> Result<(), TransportError> {
        let mut recorded = self.lock();

        if let Some(error) = recorded.send_error.clone() {
            return Err(error);
        }

        recorded.calls.push(Call::Send {
            channel_id,
            response,
        });

        Ok(())
    }

    async fn add_reaction(
        &self,
        channel_id: Id,
        message_id: Id,
        emoji: &str,
    ) -> Result<(), TransportError> {
        self.lock().calls.push(Call::React {
            channel_id,
            message_id,
            emoji: emoji.to_string(),
        });

        Ok(())
    }

    async fn get_guild_roles(&self, _guild_id: Id) -> Result<Vec<Role>, TransportError> {
        Ok(self.lock().guild_roles.clone())
    }

    async fn get_actor_roles(
        &self,
        _guild_id: Id,
        actor_id: Id,
    ) -> Result<Vec<Role>, TransportError> {
        Ok(self
            .lock()
            .actor_roles
            .get(&actor_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn add_role(
        &self,
        guild_id: Id,
        actor_id: Id,
        role: &Role,
    ) -> Result<(), TransportError> {
        let mut recorded = self.lock();

        if let Some(error) = recorded.role_error.clone() {
            return Err(error);
        }

        recorded
            .actor_roles
            .entry(actor_id)
            .or_default()
            .push(role.clone());
        recorded.calls.push(Call::AddRole {
            guild_id,
            actor_id,
            role: role.clone(),
        });

        Ok(())
    }

    async fn remove_role(
        &self,
        guild_id: Id,
        actor_id: Id,
        role: &Role,
    ) -> Result<(), TransportError> {
        let mut recorded = self.lock();

        if let Some(error) = recorded.role_error.clone() {
            return Err(error);
        }

        if let Some(held) = recorded.actor_roles.get_mut(&actor_id) {
            held.retain(|r| r.id != role.id);
        }

        recorded.calls.push(Call::RemoveRole {
            guild_id,
            actor_id,
            role: role.clone(),
        });

        Ok(())
    }
}

/// Bot state for tests: just a mutable prefix.
#[derive(Debug, Clone)]
pub struct TestState {
    prefix: Arc<Mutex<String>>,
}

impl Default for TestState {
    fn default() -> Self {
        Self::new("!")
    }
}

impl TestState {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: Arc::new(Mutex::new(prefix.to_string())),
        }
    }

    pub fn prefix(&self) -> String {
        self.prefix
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_prefix(&self, prefix: &str) {
        *self.prefix.lock().unwrap_or_else(PoisonError::into_inner) = prefix.to_string();
    }
}

/// Event handler that reads the prefix from [`TestState`] and keeps every
/// fault report.
#[derive(Debug, Clone, Default)]
pub struct TestEvents {
    reports: Arc<Mutex<Vec<FaultReport>>>,
}

impl TestEvents {
    pub fn reports(&self) -> Vec<FaultReport> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn kinds(&self) -> Vec<FaultKind> {
        self.reports().into_iter().map(|report| report.kind).collect()
    }
}

#[async_trait]
impl CommandEventHandler for TestEvents {
    type State = TestState;
    type Error = Error;

    async fn get_prefix(
        &self,
        _message: &Message,
        state: &TestState,
    ) -> Result<Vec<String>, Error> {
        Ok(vec![state.prefix()])
    }

    async fn fault(&self, report: &FaultReport) {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report.clone());
    }
}

pub fn user() -> Actor {
    Actor {
        id: USER_ID,
        name: "dave".to_string(),
        bot: false,
        avatar_url: None,
    }
}

pub fn bot() -> Actor {
    Actor {
        id: BOT_ID,
        name: "Botty".to_string(),
        bot: true,
        avatar_url: None,
    }
}

/// A guild message from [`user`].
pub fn message(content: &str) -> Message {
    message_from(user(), content)
}

pub fn message_from(author: Actor, content: &str) -> Message {
    Message {
        id: MESSAGE_IDS.fetch_add(1, Ordering::Relaxed),
        channel_id: CHANNEL_ID,
        guild_id: Some(GUILD_ID),
        author,
        content: content.to_string(),
    }
}

/// A direct message from [`user`].
pub fn direct_message(content: &str) -> Message {
    Message {
        guild_id: None,
        ..message(content)
    }
}
