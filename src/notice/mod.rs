//! User-facing status messages.
//!
//! Operations return `Result`s; this module turns them into the banner the
//! page shows, so the wording lives in one place and the page only renders.

use crate::transition::{SubmitError, ValidationError};
use crate::wallet::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    pub fn connected(wallet_name: &str) -> Self {
        Self::success(format!("Connected to {wallet_name}!"))
    }

    pub fn connect_failed(err: &SessionError) -> Self {
        match err {
            SessionError::AlreadyConnected => Self::info("A wallet is already connected."),
            SessionError::Connect(e) => Self::error(format!("Failed to connect wallet: {e}")),
            other => Self::error(format!("Failed to connect wallet: {other}")),
        }
    }

    pub fn disconnected() -> Self {
        Self::info("Wallet disconnected!")
    }

    pub fn disconnect_failed(err: &SessionError) -> Self {
        Self::error(err.to_string())
    }

    pub fn staked(result: &Result<String, SubmitError>) -> Self {
        Self::submission(result, "Stake placed!", "Staking failed")
    }

    pub fn claimed(result: &Result<String, SubmitError>) -> Self {
        Self::submission(result, "Winnings claimed!", "Claim failed")
    }

    fn submission(result: &Result<String, SubmitError>, done: &str, failed: &str) -> Self {
        match result {
            Ok(tx_id) => Self::success(format!("{done} Tx ID: {tx_id}")),
            Err(SubmitError::NoWalletConnected) => Self::error("Please connect a wallet first!"),
            Err(SubmitError::Validation(e @ ValidationError::MissingField(_))) => {
                Self::error(format!("Fill all fields! ({e})"))
            }
            Err(SubmitError::Validation(e)) => Self::error(format!("Invalid input: {e}")),
            Err(SubmitError::InFlight) => Self::info("A transaction is already processing."),
            Err(SubmitError::Execute(e)) => Self::error(format!("{failed}: {e}")),
        }
    }
}

/// Shorten a public key to `first10...last6` for the connection banner.
pub fn abbreviate_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 16 {
        return key.to_string();
    }
    let head: String = chars[..10].iter().collect();
    let tail: String = chars[chars.len() - 6..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::AdapterError;

    #[test]
    fn test_submission_notices() {
        let ok: Result<String, SubmitError> = Ok("at1xyz".to_string());
        assert_eq!(Notice::staked(&ok), Notice::success("Stake placed! Tx ID: at1xyz"));
        assert_eq!(Notice::claimed(&ok), Notice::success("Winnings claimed! Tx ID: at1xyz"));

        let no_wallet = Err(SubmitError::NoWalletConnected);
        assert_eq!(Notice::staked(&no_wallet).message, "Please connect a wallet first!");

        let failed = Err(SubmitError::Execute(AdapterError::Rejected(
            "User rejected".to_string(),
        )));
        assert_eq!(Notice::claimed(&failed), Notice::error("Claim failed: User rejected"));
        assert_eq!(Notice::staked(&failed).message, "Staking failed: User rejected");
    }

    #[test]
    fn test_validation_notice() {
        let err = Err(SubmitError::Validation(ValidationError::MissingField("stake amount")));
        let notice = Notice::staked(&err);
        assert_eq!(notice.kind, NoticeKind::Error);
        assert!(notice.message.starts_with("Fill all fields!"));
        assert!(notice.message.contains("stake amount is required"));
    }

    #[test]
    fn test_malformed_value_notice_is_not_a_missing_field() {
        let err = Err(SubmitError::Validation(ValidationError::InvalidAmount {
            field: "claim amount",
            value: "0".to_string(),
        }));
        let notice = Notice::claimed(&err);
        assert_eq!(notice.kind, NoticeKind::Error);
        assert!(notice.message.starts_with("Invalid input:"));
        assert!(!notice.message.contains("Fill all fields!"));

        let err = Err(SubmitError::Validation(ValidationError::InvalidEventId("12a".to_string())));
        assert!(Notice::staked(&err).message.starts_with("Invalid input:"));
    }

    #[test]
    fn test_connect_notices() {
        assert_eq!(Notice::connected("Leo Wallet").message, "Connected to Leo Wallet!");

        let err = SessionError::Connect(AdapterError::NotInstalled("Fox Wallet".to_string()));
        assert_eq!(
            Notice::connect_failed(&err),
            Notice::error("Failed to connect wallet: Fox Wallet is not installed")
        );
        assert_eq!(Notice::disconnected().kind, NoticeKind::Info);
    }

    #[test]
    fn test_abbreviate_key() {
        assert_eq!(
            abbreviate_key("aleo1qnr4dkkvkgfqph0vzc3y6z2eu975wnpz2925ntjccd5cfqxtyu8s7pyjh9"),
            "aleo1qnr4d...7pyjh9"
        );
        assert_eq!(abbreviate_key("aleo1short"), "aleo1short");
    }
}
