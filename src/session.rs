// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Document store readiness.
//!
//! The store connects in the background while the server already accepts
//! requests. Flows await [`StoreHandle::get`], which resolves once the store is
//! ready, fails fast when the backend is disabled, and gives up after
//! [`READY_TIMEOUT`].

use crate::config::{Config, StoreBackend};
use crate::db::{FirestoreDb, Store};
use crate::error::AppError;
use std::time::Duration;
use tokio::sync::watch;

/// How long a request waits for the store before giving up.
pub const READY_TIMEOUT: Duration = Duration::from_secs(2);

pub const NOT_CONFIGURED_MESSAGE: &str = "Sign-in is not configured for this site yet.";

/// Connection state of the document store.
#[derive(Clone)]
pub enum StoreStatus {
    Connecting,
    Ready(Store),
    Disabled(String),
}

impl StoreStatus {
    pub fn label(&self) -> &'static str {
        match self {
            StoreStatus::Connecting => "connecting",
            StoreStatus::Ready(_) => "ready",
            StoreStatus::Disabled(_) => "disabled",
        }
    }
}

/// Read side of the store readiness signal.
#[derive(Clone)]
pub struct StoreHandle {
    rx: watch::Receiver<StoreStatus>,
}

/// Write side, held by whoever establishes the connection.
pub struct StoreInit {
    tx: watch::Sender<StoreStatus>,
}

impl StoreInit {
    pub fn ready(self, store: Store) {
        self.tx.send_replace(StoreStatus::Ready(store));
    }

    pub fn disable(self, reason: impl Into<String>) {
        self.tx.send_replace(StoreStatus::Disabled(reason.into()));
    }
}

impl StoreHandle {
    /// A handle still waiting for its store.
    pub fn pending() -> (StoreInit, StoreHandle) {
        let (tx, rx) = watch::channel(StoreStatus::Connecting);
        (StoreInit { tx }, StoreHandle { rx })
    }

    pub fn ready(store: Store) -> Self {
        let (init, handle) = Self::pending();
        init.ready(store);
        handle
    }

    pub fn disabled(reason: impl Into<String>) -> Self {
        let (init, handle) = Self::pending();
        init.disable(reason);
        handle
    }

    /// Start connecting the configured backend and return immediately.
    pub fn connect_in_background(config: &Config) -> Self {
        let (init, handle) = Self::pending();

        match (config.store_backend, config.firebase_project_id.clone()) {
            (StoreBackend::Memory, _) => {
                tracing::info!("Using in-memory document store");
                init.ready(Store::memory());
            }
            (StoreBackend::Firestore, None) => {
                tracing::warn!("FIREBASE_PROJECT_ID not set, document store disabled");
                init.disable(NOT_CONFIGURED_MESSAGE);
            }
            (StoreBackend::Firestore, Some(project_id)) => {
                tokio::spawn(async move {
                    match FirestoreDb::new(&project_id).await {
                        Ok(db) => init.ready(Store::Firestore(db)),
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to connect to Firestore");
                            init.disable("The registration service is unavailable right now.");
                        }
                    }
                });
            }
        }

        handle
    }

    /// Current status without waiting.
    pub fn status(&self) -> StoreStatus {
        self.rx.borrow().clone()
    }

    /// Wait for the store, up to [`READY_TIMEOUT`].
    pub async fn get(&self) -> Result<Store, AppError> {
        self.get_within(READY_TIMEOUT).await
    }

    pub async fn get_within(&self, timeout: Duration) -> Result<Store, AppError> {
        let mut rx = self.rx.clone();
        let waited = tokio::time::timeout(
            timeout,
            rx.wait_for(|status| !matches!(status, StoreStatus::Connecting)),
        )
        .await;

        let status = match waited {
            Ok(Ok(status)) => status.clone(),
            Ok(Err(_)) => {
                return Err(AppError::Unavailable(
                    "store initializer dropped before completing".to_string(),
                ))
            }
            Err(_) => {
                return Err(AppError::Unavailable(format!(
                    "store not ready after {} ms",
                    timeout.as_millis()
                )))
            }
        };

        match status {
            StoreStatus::Ready(store) => Ok(store),
            StoreStatus::Disabled(reason) => Err(AppError::NotConfigured(reason)),
            StoreStatus::Connecting => Err(AppError::Unavailable("store connecting".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ready_handle_resolves_immediately() {
        let handle = StoreHandle::ready(Store::memory());
        assert!(handle.get().await.is_ok());
        assert_eq!(handle.status().label(), "ready");
    }

    #[tokio::test]
    async fn disabled_handle_reports_not_configured() {
        let handle = StoreHandle::disabled(NOT_CONFIGURED_MESSAGE);
        match handle.get().await {
            Err(AppError::NotConfigured(msg)) => assert_eq!(msg, NOT_CONFIGURED_MESSAGE),
            _ => panic!("expected NotConfigured"),
        }
    }

    #[tokio::test]
    async fn waiter_wakes_when_store_becomes_ready() {
        let (init, handle) = StoreHandle::pending();
        let waiter = {
            let handle = handle.clone();
            tokio::spawn(async move { handle.get_within(Duration::from_secs(5)).await })
        };

        tokio::task::yield_now().await;
        init.ready(Store::memory());

        let result = waiter.await.unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn times_out_while_connecting() {
        let (_init, handle) = StoreHandle::pending();
        let result = handle.get_within(Duration::from_millis(20)).await;
        assert!(matches!(result, Err(AppError::Unavailable(_))));
    }
}
