//! Transition submission: stake and claim calls against the market program.
//!
//! Inputs follow the program's literal format: event ids carry the `field`
//! suffix, amounts the `u64` suffix, predictions are `true`/`false`.

use crate::config::ProgramConfig;
use crate::wallet::{AdapterError, WalletSession};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

pub const STAKE_FUNCTION: &str = "stake_public";
pub const CLAIM_FUNCTION: &str = "claim_public";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("event id must be a decimal number, got {0:?}")]
    InvalidEventId(String),
    #[error("{field} must be a positive whole number of microcredits, got {value:?}")]
    InvalidAmount { field: &'static str, value: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmitError {
    #[error("no wallet connected")]
    NoWalletConnected,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("a submission is already in flight")]
    InFlight,
    #[error(transparent)]
    Execute(#[from] AdapterError),
}

/// A single transition call handed to the wallet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRequest {
    pub program_id: String,
    pub function_name: String,
    pub inputs: Vec<String>,
    /// Flat fee in microcredits.
    pub fee: u64,
    pub fee_private: bool,
}

/// Flag the UI binds its "processing" state and disabled controls to.
pub trait BusyFlag {
    fn is_busy(&self) -> bool;
    fn set_busy(&mut self, busy: bool);
}

impl BusyFlag for bool {
    fn is_busy(&self) -> bool {
        *self
    }

    fn set_busy(&mut self, busy: bool) {
        *self = busy;
    }
}

/// Clears the flag on drop so every exit path re-enables the UI.
struct BusyGuard<'a, B: BusyFlag>(&'a mut B);

impl<'a, B: BusyFlag> BusyGuard<'a, B> {
    fn acquire(flag: &'a mut B) -> Self {
        flag.set_busy(true);
        Self(flag)
    }
}

impl<B: BusyFlag> Drop for BusyGuard<'_, B> {
    fn drop(&mut self) {
        self.0.set_busy(false);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StakeIntent {
    pub event_id: String,
    pub stake_amount: String,
    pub prediction: bool,
}

impl StakeIntent {
    pub fn inputs(&self) -> Result<Vec<String>, ValidationError> {
        let event_id = field_literal(&self.event_id)?;
        let amount = u64_literal("stake amount", &self.stake_amount)?;
        Ok(vec![event_id, amount, self.prediction.to_string()])
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClaimIntent {
    pub event_id: String,
    pub claim_amount: String,
}

impl ClaimIntent {
    pub fn inputs(&self) -> Result<Vec<String>, ValidationError> {
        let event_id = field_literal(&self.event_id)?;
        let amount = u64_literal("claim amount", &self.claim_amount)?;
        Ok(vec![event_id, amount])
    }
}

fn field_literal(raw: &str) -> Result<String, ValidationError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ValidationError::MissingField("event id"));
    }
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidEventId(value.to_string()));
    }
    Ok(format!("{value}field"))
}

fn u64_literal(field: &'static str, raw: &str) -> Result<String, ValidationError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    // u64::from_str takes a leading '+', the program's literal parser does not
    let digits_only = value.bytes().all(|b| b.is_ascii_digit());
    match value.parse::<u64>() {
        Ok(n) if digits_only && n > 0 => Ok(format!("{value}u64")),
        _ => Err(ValidationError::InvalidAmount {
            field,
            value: value.to_string(),
        }),
    }
}

/// Builds transition requests for the configured program and fee.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionSubmitter {
    program_id: String,
    fee: u64,
    fee_private: bool,
}

impl TransitionSubmitter {
    pub fn new(program: &ProgramConfig) -> Self {
        Self {
            program_id: program.program_id.clone(),
            fee: program.fee_microcredits,
            fee_private: program.fee_private,
        }
    }

    pub fn request(&self, function_name: &str, inputs: Vec<String>) -> TransitionRequest {
        TransitionRequest {
            program_id: self.program_id.clone(),
            function_name: function_name.to_string(),
            inputs,
            fee: self.fee,
            fee_private: self.fee_private,
        }
    }

    /// Execute `function_name` through the session's wallet.
    ///
    /// Fails before touching the wallet when no session is active or a
    /// submission is already running. `busy` is held for the duration of the
    /// adapter call and cleared on every outcome.
    pub async fn submit<B: BusyFlag>(
        &self,
        session: &WalletSession,
        function_name: &str,
        inputs: Vec<String>,
        busy: &mut B,
    ) -> Result<String, SubmitError> {
        let Some(wallet) = session.handle() else {
            warn!(function = function_name, "submission without a connected wallet");
            return Err(SubmitError::NoWalletConnected);
        };
        if busy.is_busy() {
            return Err(SubmitError::InFlight);
        }

        let request = self.request(function_name, inputs);
        let _guard = BusyGuard::acquire(busy);

        info!(
            wallet = wallet.name(),
            function = function_name,
            inputs = ?request.inputs,
            fee = request.fee,
            "submitting transition"
        );

        match wallet.execute(&request).await {
            Ok(tx_id) => {
                info!(function = function_name, tx_id = %tx_id, "transition submitted");
                Ok(tx_id)
            }
            Err(e) => {
                error!(function = function_name, error = %e, "transition failed");
                Err(SubmitError::Execute(e))
            }
        }
    }

    pub async fn stake<B: BusyFlag>(
        &self,
        session: &WalletSession,
        intent: &StakeIntent,
        busy: &mut B,
    ) -> Result<String, SubmitError> {
        if !session.is_connected() {
            return Err(SubmitError::NoWalletConnected);
        }
        let inputs = intent.inputs()?;
        self.submit(session, STAKE_FUNCTION, inputs, busy).await
    }

    pub async fn claim<B: BusyFlag>(
        &self,
        session: &WalletSession,
        intent: &ClaimIntent,
        busy: &mut B,
    ) -> Result<String, SubmitError> {
        if !session.is_connected() {
            return Err(SubmitError::NoWalletConnected);
        }
        let inputs = intent.inputs()?;
        self.submit(session, CLAIM_FUNCTION, inputs, busy).await
    }
}
