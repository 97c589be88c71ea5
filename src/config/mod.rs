use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Config bundled into the wasm binary at build time.
const EMBEDDED_CONFIG: &str = include_str!("../../zkmarket.toml");

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub program: ProgramConfig,
    #[serde(default)]
    pub indexer: IndexerConfig,
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ProgramConfig {
    /// Deployed program every transition targets.
    #[serde(default = "default_program_id")]
    pub program_id: String,
    /// Flat fee attached to each transition, in microcredits.
    #[serde(default = "default_fee")]
    pub fee_microcredits: u64,
    /// Network the wallet is asked to connect on.
    #[serde(default = "default_network")]
    pub network: String,
    /// Pay the fee from a private record instead of the public balance.
    #[serde(default)]
    pub fee_private: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct IndexerConfig {
    /// Explorer REST API base URL
    #[serde(default = "default_api_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_app_description")]
    pub description: String,
    /// Per-network program permissions requested by the Puzzle wallet.
    #[serde(default = "default_program_permissions")]
    pub program_permissions: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_program_id() -> String {
    "at1ye5axudqp3jzqmkv55p0vy2sw4jlmtdlsh90v75xcatvyj82k59s4qdfjj".to_string()
}
fn default_fee() -> u64 {
    1_000_000
}
fn default_network() -> String {
    "mainnet".to_string()
}
fn default_api_url() -> String {
    "https://api.explorer.provable.com/v1".to_string()
}
fn default_app_name() -> String {
    "Aleo app".to_string()
}
fn default_app_description() -> String {
    "A privacy-focused DeFi app".to_string()
}
fn default_program_permissions() -> BTreeMap<String, Vec<String>> {
    let mut permissions = BTreeMap::new();
    permissions.insert(
        "mainnet".to_string(),
        vec![
            "dApp_1.aleo".to_string(),
            "dApp_1_import.aleo".to_string(),
            "dApp_1_import_2.aleo".to_string(),
        ],
    );
    permissions.insert(
        "testnetbeta".to_string(),
        vec![
            "dApp_1_test.aleo".to_string(),
            "dApp_1_test_import.aleo".to_string(),
            "dApp_1_test_import_2.aleo".to_string(),
        ],
    );
    permissions
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            program_id: default_program_id(),
            fee_microcredits: default_fee(),
            network: default_network(),
            fee_private: false,
        }
    }
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            description: default_app_description(),
            program_permissions: default_program_permissions(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Parse and validate a TOML config document.
    pub fn load_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the bundled config, then overlay build-time env vars.
    ///
    /// The browser has no process environment, so overrides are captured by
    /// `option_env!` when the bundle is compiled.
    pub fn embedded() -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(EMBEDDED_CONFIG)?;

        if let Some(program_id) = option_env!("ZKMARKET_PROGRAM_ID") {
            config.program.program_id = program_id.to_string();
        }
        if let Some(fee) = option_env!("ZKMARKET_FEE") {
            config.program.fee_microcredits = fee
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("ZKMARKET_FEE is not a u64: {fee}")))?;
        }
        if let Some(network) = option_env!("ZKMARKET_NETWORK") {
            config.program.network = network.to_string();
        }
        if let Some(api) = option_env!("ZKMARKET_API") {
            config.indexer.base_url = api.to_string();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.program.program_id.trim().is_empty() {
            return Err(ConfigError::Invalid("program.program_id is empty".to_string()));
        }
        if self.program.fee_microcredits == 0 {
            return Err(ConfigError::Invalid(
                "program.fee_microcredits must be non-zero".to_string(),
            ));
        }
        if self.indexer.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("indexer.base_url is empty".to_string()));
        }
        Ok(())
    }

    /// Programs the Puzzle wallet should be allowed to touch on the configured network.
    pub fn permissions_for_network(&self) -> &[String] {
        self.app
            .program_permissions
            .get(&self.program.network)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
