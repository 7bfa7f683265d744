// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Auth state fan-out.
//!
//! Every page consumer of one browser session (open tabs, the nav bar, the
//! profile page) subscribes to that session's channel. Updates are
//! last-write-wins; a new subscriber sees the current snapshot first.

use crate::middleware::auth::SessionUser;
use crate::models::UserProfile;
use dashmap::DashMap;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// The one top-level view a page shows for the current auth state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Login,
    ProfileCompletion,
    Dashboard,
}

/// Select the view: no user → login; missing or incomplete profile →
/// completion; otherwise dashboard.
pub fn select_view(user: Option<&SessionUser>, profile: Option<&UserProfile>) -> View {
    match (user, profile) {
        (None, _) => View::Login,
        (Some(_), Some(profile)) if profile.is_complete() => View::Dashboard,
        (Some(_), _) => View::ProfileCompletion,
    }
}

/// Current-user state pushed to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthSnapshot {
    pub user: Option<SessionUser>,
    pub view: View,
}

impl AuthSnapshot {
    pub fn signed_out() -> Self {
        Self {
            user: None,
            view: View::Login,
        }
    }

    pub fn for_user(user: SessionUser, profile: Option<&UserProfile>) -> Self {
        let view = select_view(Some(&user), profile);
        Self {
            user: Some(user),
            view,
        }
    }
}

type SessionChannels = HashMap<String, watch::Sender<AuthSnapshot>>;

/// Per-session broadcast of [`AuthSnapshot`]s, grouped by uid.
///
/// Channels exist only while a stream listens. Profile changes reach every
/// session of the uid; sign-out reaches only the session that ended.
#[derive(Clone, Default)]
pub struct AuthStateNotifier {
    users: Arc<DashMap<String, SessionChannels>>,
}

impl AuthStateNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send `snapshot` to every open session of `uid`. No-op without listeners.
    pub fn publish(&self, uid: &str, snapshot: AuthSnapshot) {
        let sessions = match self.users.get(uid) {
            Some(sessions) => {
                for tx in sessions.values() {
                    tx.send_replace(snapshot.clone());
                }
                sessions.len()
            }
            None => 0,
        };

        tracing::debug!(uid, sessions, view = ?snapshot.view, "Published auth state");
    }

    /// Tell the listeners of one session that it has ended.
    pub fn sign_out(&self, uid: &str, session_id: &str) {
        if let Some(sessions) = self.users.get(uid) {
            if let Some(tx) = sessions.get(session_id) {
                tx.send_replace(AuthSnapshot::signed_out());
            }
        }

        tracing::debug!(uid, "Published sign-out");
    }

    /// Listen to one session, starting from `initial`.
    ///
    /// `initial` comes from the store, so it replaces whatever the channel
    /// last carried if the two disagree.
    pub fn subscribe(&self, uid: &str, session_id: &str, initial: AuthSnapshot) -> AuthSubscription {
        let mut sessions = self.users.entry(uid.to_string()).or_default();
        let rx = match sessions.get(session_id) {
            Some(tx) => {
                tx.send_if_modified(|current| {
                    if *current == initial {
                        return false;
                    }
                    *current = initial;
                    true
                });
                tx.subscribe()
            }
            None => {
                let (tx, rx) = watch::channel(initial);
                sessions.insert(session_id.to_string(), tx);
                rx
            }
        };

        AuthSubscription {
            rx,
            notifier: self.clone(),
            uid: uid.to_string(),
            session_id: session_id.to_string(),
        }
    }

    /// Latest snapshot for one session, if anything listens to it.
    pub fn current(&self, uid: &str, session_id: &str) -> Option<AuthSnapshot> {
        self.users
            .get(uid)?
            .get(session_id)
            .map(|tx| tx.borrow().clone())
    }

    /// Number of sessions of `uid` holding a channel.
    pub fn session_count(&self, uid: &str) -> usize {
        self.users.get(uid).map(|s| s.len()).unwrap_or(0)
    }

    pub fn subscriber_count(&self, uid: &str) -> usize {
        self.users
            .get(uid)
            .map(|s| s.values().map(|tx| tx.receiver_count()).sum())
            .unwrap_or(0)
    }

    /// Drop `rx`, then the session's channel if nothing else listens.
    ///
    /// Both happen under the uid's entry lock so concurrent releases cannot
    /// each see the other's receiver and leave the channel behind.
    fn release(&self, uid: &str, session_id: &str, rx: watch::Receiver<AuthSnapshot>) {
        if let Some(mut sessions) = self.users.get_mut(uid) {
            drop(rx);
            let idle = sessions
                .get(session_id)
                .is_some_and(|tx| tx.receiver_count() == 0);
            if idle {
                sessions.remove(session_id);
            }
        }
        self.users.remove_if(uid, |_, sessions| sessions.is_empty());
    }
}

/// One listener on a session's auth state; releases the channel when the
/// last listener goes away.
pub struct AuthSubscription {
    rx: watch::Receiver<AuthSnapshot>,
    notifier: AuthStateNotifier,
    uid: String,
    session_id: String,
}

impl AuthSubscription {
    /// Wait for the next snapshot.
    pub async fn changed(&mut self) -> Result<(), watch::error::RecvError> {
        self.rx.changed().await
    }

    /// Latest snapshot, marking it seen.
    pub fn latest(&mut self) -> AuthSnapshot {
        self.rx.borrow_and_update().clone()
    }

    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        let (_, detached) = watch::channel(AuthSnapshot::signed_out());
        let rx = std::mem::replace(&mut self.rx, detached);
        self.notifier.release(&self.uid, &self.session_id, rx);
    }
}
