//! Wallet adapters for the supported Aleo browser extensions.
//!
//! Every extension is driven through the same [`WalletAdapter`] capability.
//! The variants differ only in configuration: which extension global they
//! talk to, the app name they announce, and (for Puzzle) the per-network
//! program permissions requested on connect.

pub mod bridge;
pub mod session;

use crate::config::Config;
use crate::transition::TransitionRequest;
use async_trait::async_trait;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use thiserror::Error;

pub use bridge::BridgeAdapter;
pub use session::{SessionError, WalletSession};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdapterError {
    #[error("{0} is not installed")]
    NotInstalled(String),
    #[error("{0}")]
    Rejected(String),
    #[error("wallet bridge error: {0}")]
    Bridge(String),
    #[error("malformed wallet response: {0}")]
    Malformed(String),
}

/// Capability every wallet integration provides.
///
/// Futures are `?Send`: extension calls run on the browser's single thread.
#[async_trait(?Send)]
pub trait WalletAdapter {
    /// Display name, e.g. "Leo Wallet".
    fn name(&self) -> &str;

    async fn connect(&self) -> Result<(), AdapterError>;

    async fn disconnect(&self) -> Result<(), AdapterError>;

    async fn public_key(&self) -> Result<String, AdapterError>;

    /// Execute a transition and return the transaction id.
    async fn execute(&self, request: &TransitionRequest) -> Result<String, AdapterError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalletId {
    Leo,
    Puzzle,
    Soter,
    Fox,
}

impl WalletId {
    /// Order shown in the picker.
    pub const ALL: [WalletId; 4] = [WalletId::Leo, WalletId::Puzzle, WalletId::Soter, WalletId::Fox];

    pub fn as_str(&self) -> &'static str {
        match self {
            WalletId::Leo => "leo-wallet",
            WalletId::Puzzle => "puzzle-wallet",
            WalletId::Soter => "soter-wallet",
            WalletId::Fox => "fox-wallet",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            WalletId::Leo => "Leo Wallet",
            WalletId::Puzzle => "Puzzle Wallet",
            WalletId::Soter => "Soter Wallet",
            WalletId::Fox => "Fox Wallet",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            WalletId::Leo => "/assets/leo.png",
            WalletId::Puzzle => "/assets/puzzle.png",
            WalletId::Soter => "/assets/soter.png",
            WalletId::Fox => "/assets/fox.png",
        }
    }

    /// Dotted path of the object the extension injects into `window`.
    pub fn extension_global(&self) -> &'static str {
        match self {
            WalletId::Leo => "leoWallet",
            WalletId::Puzzle => "puzzle",
            WalletId::Soter => "soterWallet",
            WalletId::Fox => "foxwallet.aleo",
        }
    }
}

impl fmt::Display for WalletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WalletId {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WalletId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| AdapterError::NotInstalled(s.to_string()))
    }
}

/// Map a picker selection onto a concrete adapter.
pub fn adapter_for(id: WalletId, config: &Config) -> Rc<dyn WalletAdapter> {
    Rc::new(BridgeAdapter::from_config(id, config))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_id_round_trip() {
        for id in WalletId::ALL {
            assert_eq!(id.as_str().parse::<WalletId>().unwrap(), id);
        }
        assert!("phantom".parse::<WalletId>().is_err());
    }

    #[test]
    fn test_picker_order() {
        let ids: Vec<&str> = WalletId::ALL.iter().map(WalletId::as_str).collect();
        assert_eq!(ids, vec!["leo-wallet", "puzzle-wallet", "soter-wallet", "fox-wallet"]);
    }

    #[test]
    fn test_adapter_for_uses_display_name() {
        let config = Config::default();
        for id in WalletId::ALL {
            let adapter = adapter_for(id, &config);
            assert_eq!(adapter.name(), id.display_name());
        }
    }

    #[test]
    fn test_only_puzzle_gets_permissions() {
        let config = Config::default();
        let puzzle = BridgeAdapter::from_config(WalletId::Puzzle, &config);
        assert_eq!(puzzle.permissions().len(), 3);
        assert_eq!(puzzle.permissions()[0], "dApp_1.aleo");

        let leo = BridgeAdapter::from_config(WalletId::Leo, &config);
        assert!(leo.permissions().is_empty());
    }
}
