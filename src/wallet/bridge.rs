//! JS bridge adapter.
//!
//! Wallet extensions inject an object into `window`; this adapter reaches it
//! through `dioxus::prelude::eval`, sending one JSON request per call and
//! reading back a single `{ ok }` / `{ error }` / `{ missing }` reply.

use super::{AdapterError, WalletAdapter, WalletId};
use crate::config::Config;
use crate::transition::TransitionRequest;
use async_trait::async_trait;
use dioxus::prelude::eval;
use serde::Deserialize;
use serde_json::{json, Value};
use std::cell::RefCell;
use tracing::debug;

const DECRYPT_PERMISSION: &str = "NoDecrypt";

const BRIDGE_SCRIPT: &str = r#"
const req = await dioxus.recv();
const wallet = req.global
  .split(".")
  .reduce((obj, key) => (obj ? obj[key] : undefined), window);
if (!wallet) {
  dioxus.send({ missing: true });
  return;
}
try {
  let value = null;
  switch (req.op) {
    case "connect":
      value = await wallet.connect(req.decryptPermission, req.network, req.programs);
      break;
    case "disconnect":
      await wallet.disconnect();
      break;
    case "publicKey":
      value = typeof wallet.publicKey === "function" ? await wallet.publicKey() : wallet.publicKey;
      break;
    case "execute":
      value = typeof wallet.execute === "function"
        ? await wallet.execute(req.execute)
        : await wallet.requestTransaction(req.transaction);
      break;
  }
  dioxus.send({ ok: value === undefined ? null : value });
} catch (e) {
  dioxus.send({ error: String((e && e.message) || e) });
}
"#;

#[derive(Debug, Deserialize)]
struct BridgeReply {
    #[serde(default)]
    ok: Option<Value>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    missing: bool,
}

/// Adapter for one wallet extension, configured per variant.
pub struct BridgeAdapter {
    id: WalletId,
    app_name: String,
    app_description: String,
    network: String,
    permissions: Vec<String>,
    address: RefCell<Option<String>>,
}

impl BridgeAdapter {
    pub fn new(
        id: WalletId,
        app_name: String,
        app_description: String,
        network: String,
        permissions: Vec<String>,
    ) -> Self {
        Self {
            id,
            app_name,
            app_description,
            network,
            permissions,
            address: RefCell::new(None),
        }
    }

    /// Only the Puzzle variant carries program permissions.
    pub fn from_config(id: WalletId, config: &Config) -> Self {
        let permissions = match id {
            WalletId::Puzzle => config.permissions_for_network().to_vec(),
            _ => Vec::new(),
        };
        Self::new(
            id,
            config.app.name.clone(),
            config.app.description.clone(),
            config.program.network.clone(),
            permissions,
        )
    }

    pub fn id(&self) -> WalletId {
        self.id
    }

    pub fn permissions(&self) -> &[String] {
        &self.permissions
    }

    fn request(&self, op: &str) -> Value {
        json!({
            "op": op,
            "global": self.id.extension_global(),
            "appName": self.app_name,
            "appDescription": self.app_description,
            "network": self.network,
            "decryptPermission": DECRYPT_PERMISSION,
            "programs": self.permissions,
        })
    }

    fn execute_request(&self, request: &TransitionRequest) -> Value {
        let mut payload = self.request("execute");
        payload["execute"] = json!({
            "programId": request.program_id,
            "functionName": request.function_name,
            "inputs": request.inputs,
            "fee": request.fee,
        });
        payload["transaction"] = json!({
            "address": self.address.borrow().clone(),
            "chainId": self.network,
            "transitions": [{
                "program": request.program_id,
                "functionName": request.function_name,
                "inputs": request.inputs,
            }],
            "fee": request.fee,
            "feePrivate": request.fee_private,
        });
        payload
    }

    async fn call(&self, payload: Value) -> Result<Value, AdapterError> {
        debug!(wallet = self.id.as_str(), op = %payload["op"], "wallet bridge call");
        let mut bridge = eval(BRIDGE_SCRIPT);
        bridge
            .send(payload)
            .map_err(|e| AdapterError::Bridge(format!("{e:?}")))?;
        let reply = bridge
            .recv()
            .await
            .map_err(|e| AdapterError::Bridge(format!("{e:?}")))?;
        parse_reply(self.id, reply)
    }
}

/// Unwrap a bridge reply into the call's value.
fn parse_reply(id: WalletId, reply: Value) -> Result<Value, AdapterError> {
    let reply: BridgeReply =
        serde_json::from_value(reply).map_err(|e| AdapterError::Malformed(e.to_string()))?;
    if reply.missing {
        return Err(AdapterError::NotInstalled(id.display_name().to_string()));
    }
    if let Some(error) = reply.error {
        return Err(AdapterError::Rejected(error));
    }
    Ok(reply.ok.unwrap_or(Value::Null))
}

/// Extensions return either a bare string or an object wrapping it.
fn string_value(value: Value, keys: &[&str]) -> Result<String, AdapterError> {
    let found = match &value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => keys
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_str))
            .map(str::to_string),
        _ => None,
    };
    match found {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(AdapterError::Malformed(format!("expected {}, got {value}", keys[0]))),
    }
}

#[async_trait(?Send)]
impl WalletAdapter for BridgeAdapter {
    fn name(&self) -> &str {
        self.id.display_name()
    }

    async fn connect(&self) -> Result<(), AdapterError> {
        self.call(self.request("connect")).await?;
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), AdapterError> {
        self.call(self.request("disconnect")).await?;
        self.address.borrow_mut().take();
        Ok(())
    }

    async fn public_key(&self) -> Result<String, AdapterError> {
        let value = self.call(self.request("publicKey")).await?;
        let key = string_value(value, &["publicKey", "address"])?;
        *self.address.borrow_mut() = Some(key.clone());
        Ok(key)
    }

    async fn execute(&self, request: &TransitionRequest) -> Result<String, AdapterError> {
        let value = self.call(self.execute_request(request)).await?;
        string_value(value, &["transactionId", "txId", "eventId"])
    }
}
