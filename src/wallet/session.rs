//! Wallet session: the connected adapter and the account it exposes.
//!
//! A session is a value. `connect` and `disconnect` return the next session
//! rather than mutating shared state, so a failed call leaves the caller's
//! current session untouched.

use super::{AdapterError, WalletAdapter};
use std::fmt;
use std::rc::Rc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("a wallet is already connected")]
    AlreadyConnected,
    #[error("failed to connect wallet: {0}")]
    Connect(AdapterError),
    #[error("failed to disconnect wallet: {0}")]
    Disconnect(AdapterError),
    #[error("wallet returned an empty public key")]
    EmptyPublicKey,
}

#[derive(Clone, Default)]
pub struct WalletSession {
    handle: Option<Rc<dyn WalletAdapter>>,
    public_key: Option<String>,
}

impl WalletSession {
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.handle.is_some()
    }

    pub fn handle(&self) -> Option<&Rc<dyn WalletAdapter>> {
        self.handle.as_ref()
    }

    pub fn public_key(&self) -> Option<&str> {
        self.public_key.as_deref()
    }

    pub fn wallet_name(&self) -> Option<&str> {
        self.handle.as_ref().map(|h| h.name())
    }

    /// Whether this session is still the one opened for `key`.
    pub fn owns_key(&self, key: &str) -> bool {
        self.public_key() == Some(key)
    }

    /// Open a session on `adapter`.
    ///
    /// The handle and key are only committed once both the connect and the
    /// key lookup succeed. If the key lookup fails the adapter is asked to
    /// disconnect again before the error is returned.
    pub async fn connect(&self, adapter: Rc<dyn WalletAdapter>) -> Result<Self, SessionError> {
        if self.is_connected() {
            return Err(SessionError::AlreadyConnected);
        }

        if let Err(e) = adapter.connect().await {
            warn!(wallet = adapter.name(), error = %e, "wallet connect failed");
            return Err(SessionError::Connect(e));
        }

        let public_key = match adapter.public_key().await {
            Ok(key) if !key.trim().is_empty() => key,
            result => {
                let err = match result {
                    Err(e) => SessionError::Connect(e),
                    Ok(_) => SessionError::EmptyPublicKey,
                };
                warn!(wallet = adapter.name(), error = %err, "public key lookup failed");
                if let Err(e) = adapter.disconnect().await {
                    warn!(wallet = adapter.name(), error = %e, "cleanup disconnect failed");
                }
                return Err(err);
            }
        };

        info!(wallet = adapter.name(), public_key = %public_key, "wallet connected");
        Ok(Self {
            handle: Some(adapter),
            public_key: Some(public_key),
        })
    }

    /// Reconcile a finished connect with the session that is current now.
    ///
    /// Another connect may have been committed while this one was pending.
    /// In that case this session's adapter is closed again and the connect is
    /// refused, so only one handle stays live.
    pub async fn settle(self, current: &WalletSession) -> Result<Self, SessionError> {
        if !current.is_connected() || *current == self {
            return Ok(self);
        }
        if let Some(handle) = &self.handle {
            warn!(wallet = handle.name(), "late connect superseded, closing it");
            if let Err(e) = handle.disconnect().await {
                warn!(wallet = handle.name(), error = %e, "cleanup disconnect failed");
            }
        }
        Err(SessionError::AlreadyConnected)
    }

    /// Close the session. Disconnecting an idle session is a no-op.
    pub async fn disconnect(&self) -> Result<Self, SessionError> {
        let Some(handle) = &self.handle else {
            return Ok(Self::disconnected());
        };

        handle.disconnect().await.map_err(|e| {
            warn!(wallet = handle.name(), error = %e, "wallet disconnect failed");
            SessionError::Disconnect(e)
        })?;

        info!(wallet = handle.name(), "wallet disconnected");
        Ok(Self::disconnected())
    }
}

impl PartialEq for WalletSession {
    fn eq(&self, other: &Self) -> bool {
        let same_handle = match (&self.handle, &other.handle) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_handle && self.public_key == other.public_key
    }
}

impl fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletSession")
            .field("wallet", &self.wallet_name())
            .field("public_key", &self.public_key)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::mock::MockAdapter;
    use futures::executor::block_on;

    #[test]
    fn test_connect_stores_handle_and_key() {
        let adapter = Rc::new(MockAdapter::ok("aleo1qqqqexample", "at1tx"));
        let session = block_on(WalletSession::disconnected().connect(adapter.clone())).unwrap();

        assert!(session.is_connected());
        assert_eq!(session.public_key(), Some("aleo1qqqqexample"));
        assert_eq!(session.wallet_name(), Some("Mock Wallet"));
        assert_eq!(adapter.connect_calls.get(), 1);
    }

    #[test]
    fn test_connect_failure_keeps_state() {
        let adapter = Rc::new(MockAdapter {
            fail_connect: Some("User rejected".to_string()),
            ..Default::default()
        });
        let before = WalletSession::disconnected();
        let err = block_on(before.connect(adapter.clone())).unwrap_err();

        assert_eq!(
            err,
            SessionError::Connect(AdapterError::Rejected("User rejected".to_string()))
        );
        assert!(!before.is_connected());
        assert_eq!(before.public_key(), None);
        // one attempt, no retry
        assert_eq!(adapter.connect_calls.get(), 1);
    }

    #[test]
    fn test_public_key_failure_is_not_a_partial_connection() {
        let adapter = Rc::new(MockAdapter {
            fail_public_key: Some("locked".to_string()),
            ..Default::default()
        });
        let err = block_on(WalletSession::disconnected().connect(adapter.clone())).unwrap_err();

        assert!(matches!(err, SessionError::Connect(_)));
        assert_eq!(adapter.disconnect_calls.get(), 1);
    }

    #[test]
    fn test_empty_public_key_rejected() {
        let adapter = Rc::new(MockAdapter::ok("  ", "at1tx"));
        let err = block_on(WalletSession::disconnected().connect(adapter)).unwrap_err();
        assert_eq!(err, SessionError::EmptyPublicKey);
    }

    #[test]
    fn test_second_connect_refused() {
        let first = Rc::new(MockAdapter::ok("aleo1first", "at1tx"));
        let second = Rc::new(MockAdapter::ok("aleo1second", "at1tx"));
        let session = block_on(WalletSession::disconnected().connect(first)).unwrap();

        let err = block_on(session.connect(second.clone())).unwrap_err();
        assert_eq!(err, SessionError::AlreadyConnected);
        assert_eq!(second.connect_calls.get(), 0);
        assert_eq!(session.public_key(), Some("aleo1first"));
    }

    #[test]
    fn test_overlapping_connects_keep_one_handle() {
        let first = Rc::new(MockAdapter::ok("aleo1first", "at1tx"));
        let second = Rc::new(MockAdapter::ok("aleo1second", "at1tx"));
        let base = WalletSession::disconnected();

        // both started from the same idle session
        let s1 = block_on(base.connect(first.clone())).unwrap();
        let s2 = block_on(base.connect(second.clone())).unwrap();

        let committed = block_on(s1.settle(&base)).unwrap();
        let err = block_on(s2.settle(&committed)).unwrap_err();

        assert_eq!(err, SessionError::AlreadyConnected);
        assert_eq!(second.disconnect_calls.get(), 1);
        assert_eq!(first.disconnect_calls.get(), 0);
        assert_eq!(committed.public_key(), Some("aleo1first"));
    }

    #[test]
    fn test_settle_against_same_session_keeps_it() {
        let adapter = Rc::new(MockAdapter::ok("aleo1owner", "at1tx"));
        let session = block_on(WalletSession::disconnected().connect(adapter.clone())).unwrap();
        let settled = block_on(session.clone().settle(&session)).unwrap();

        assert_eq!(settled, session);
        assert_eq!(adapter.disconnect_calls.get(), 0);
    }

    #[test]
    fn test_owns_key() {
        let adapter = Rc::new(MockAdapter::ok("aleo1owner", "at1tx"));
        let session = block_on(WalletSession::disconnected().connect(adapter)).unwrap();

        assert!(session.owns_key("aleo1owner"));
        assert!(!session.owns_key("aleo1other"));
        assert!(!WalletSession::disconnected().owns_key("aleo1owner"));
    }

    #[test]
    fn test_disconnect_clears_handle_and_key() {
        let adapter = Rc::new(MockAdapter::ok("aleo1qqqqexample", "at1tx"));
        let session = block_on(WalletSession::disconnected().connect(adapter.clone())).unwrap();
        let session = block_on(session.disconnect()).unwrap();

        assert!(session.handle().is_none());
        assert_eq!(session.public_key(), None);
        assert_eq!(adapter.disconnect_calls.get(), 1);
    }

    #[test]
    fn test_disconnect_when_idle_is_noop() {
        let session = block_on(WalletSession::disconnected().disconnect()).unwrap();
        assert_eq!(session, WalletSession::disconnected());
    }

    #[test]
    fn test_disconnect_failure_keeps_session() {
        let adapter = Rc::new(MockAdapter {
            public_key: "aleo1qqqqexample".to_string(),
            fail_disconnect: Some("extension crashed".to_string()),
            ..Default::default()
        });
        let session = block_on(WalletSession::disconnected().connect(adapter)).unwrap();
        let err = block_on(session.disconnect()).unwrap_err();

        assert!(matches!(err, SessionError::Disconnect(_)));
        assert!(session.is_connected());
        assert_eq!(session.public_key(), Some("aleo1qqqqexample"));
    }
}
