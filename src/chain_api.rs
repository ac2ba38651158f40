//! Chain table client
//!
//! Read side for the game contract's tables via `/v1/chain/get_table_rows`:
//! installed machines (secondary-index lookup by owner), per-template
//! configs, shop listings and live token balances. Balances are the one
//! fetch that is never cached; everything else is cache-first.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::cache::{keys, Cache};
use crate::config::TtlPolicy;
use crate::token::{parse_token, Token};
use crate::transport::Transport;
use crate::types::{ContractAsset, ShopListing, ToolConfig, ToolKind};
use crate::util_json;

/// Response envelope of `get_table_rows`.
#[derive(Debug, Deserialize)]
struct TableRows<T> {
    rows: Vec<T>,
    #[serde(default)]
    more: bool,
}

/// Raw row of the `machines` table.
#[derive(Debug, Deserialize)]
struct MachineRow {
    #[serde(deserialize_with = "util_json::string_or_number")]
    asset_id: String,
    #[serde(deserialize_with = "util_json::u32_string_or_number")]
    template_id: u32,
    owner: String,
    #[serde(default)]
    last_claim: i64,
    #[serde(default)]
    delay: Option<u32>,
    #[serde(default)]
    power: Vec<String>,
    #[serde(default)]
    token_in: Vec<String>,
}

/// Raw row of the `bconfigs` table.
#[derive(Debug, Deserialize)]
struct ConfigRow {
    #[serde(deserialize_with = "util_json::u32_string_or_number")]
    template_id: u32,
    #[serde(rename = "type")]
    kind: ToolKind,
    #[serde(default)]
    token_in: Vec<String>,
    #[serde(default)]
    token_out: Vec<String>,
    delay: u32,
    #[serde(default)]
    maxstorage: Option<String>,
    rarity: u32,
}

/// Raw row of the `shop` table.
#[derive(Debug, Deserialize)]
struct ShopRow {
    #[serde(deserialize_with = "util_json::u32_string_or_number")]
    template_id: u32,
    price: String,
}

/// Raw row of the per-player `balances` table.
#[derive(Debug, Deserialize)]
struct BalanceRow {
    balance: String,
}

pub struct ChainClient {
    base_url: String,
    contract: String,
    transport: Arc<dyn Transport>,
    cache: Cache,
    ttl: TtlPolicy,
}

impl ChainClient {
    pub fn new(
        base_url: impl Into<String>,
        contract: impl Into<String>,
        transport: Arc<dyn Transport>,
        cache: Cache,
        ttl: TtlPolicy,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            contract: contract.into(),
            transport,
            cache,
            ttl,
        }
    }

    /// Machines the player has installed on the game contract.
    ///
    /// The `machines` table is scoped to the contract and indexed by owner
    /// on its second index, hence the bound pair on the account name.
    pub async fn fetch_player_tools(&self, account: &str) -> Result<Vec<ContractAsset>> {
        let key = keys::tools(account);
        if let Some(cached) = self.cache.get::<Vec<ContractAsset>>(&key) {
            log::debug!("[chain] tools.{account} served from cache ({})", cached.len());
            return Ok(cached);
        }

        let body = json!({
            "code": self.contract,
            "scope": self.contract,
            "table": "machines",
            "lower_bound": account,
            "upper_bound": account,
            "limit": 100,
            "key_type": "i64",
            "index_position": "2",
            "json": true,
        });
        let rows: Vec<MachineRow> = self.get_table_rows(body, "machines").await?;

        let tools: Vec<ContractAsset> = rows
            .into_iter()
            .map(|row| ContractAsset {
                asset_id: row.asset_id,
                template_id: row.template_id,
                owner: row.owner,
                last_claim: row.last_claim,
                delay: row.delay,
                power: row.power.iter().map(|s| parse_token(s)).collect(),
                token_reserve: row.token_in.iter().map(|s| parse_token(s)).collect(),
            })
            .collect();

        log::info!("[chain] fetched {} installed tools for {account}", tools.len());
        self.cache.set(&key, &tools, self.ttl.instances);
        Ok(tools)
    }

    /// Per-template game parameters for every tool template.
    pub async fn fetch_tool_configs(&self) -> Result<Vec<ToolConfig>> {
        if let Some(cached) = self.cache.get::<Vec<ToolConfig>>(keys::TOOL_CONFIGS) {
            log::debug!("[chain] tool configs served from cache ({})", cached.len());
            return Ok(cached);
        }

        let body = json!({
            "code": self.contract,
            "scope": self.contract,
            "table": "bconfigs",
            "limit": 500,
            "json": true,
        });
        let rows: Vec<ConfigRow> = self.get_table_rows(body, "bconfigs").await?;

        let configs: Vec<ToolConfig> = rows
            .into_iter()
            .map(|row| ToolConfig {
                template_id: row.template_id,
                kind: row.kind,
                token_input: row.token_in.iter().map(|s| parse_token(s)).collect(),
                token_output: row.token_out.iter().map(|s| parse_token(s)).collect(),
                delay: row.delay,
                max_storage: row.maxstorage.as_deref().map(parse_token),
                rarity_id: row.rarity,
            })
            .collect();

        log::info!("[chain] fetched {} tool configs", configs.len());
        self.cache.set(keys::TOOL_CONFIGS, &configs, self.ttl.tool_configs);
        Ok(configs)
    }

    /// Mineral templates on sale and their resource prices.
    pub async fn fetch_shop_listings(&self) -> Result<Vec<ShopListing>> {
        if let Some(cached) = self.cache.get::<Vec<ShopListing>>(keys::SHOP_LISTINGS) {
            log::debug!("[chain] shop listings served from cache ({})", cached.len());
            return Ok(cached);
        }

        let body = json!({
            "code": self.contract,
            "scope": self.contract,
            "table": "shop",
            "limit": 20,
            "json": true,
        });
        let rows: Vec<ShopRow> = self.get_table_rows(body, "shop").await?;

        let listings: Vec<ShopListing> = rows
            .into_iter()
            .map(|row| ShopListing {
                template_id: row.template_id,
                price: parse_token(&row.price),
            })
            .collect();

        log::info!("[chain] fetched {} shop listings", listings.len());
        self.cache.set(keys::SHOP_LISTINGS, &listings, self.ttl.shop);
        Ok(listings)
    }

    /// The player's undeposited resource balances.
    ///
    /// Deliberately uncached: balances move on every deposit, withdrawal and
    /// claim, and a stale number here makes the fuel math lie.
    pub async fn fetch_player_balances(&self, account: &str) -> Result<Vec<Token>> {
        let body = json!({
            "code": self.contract,
            "scope": account,
            "table": "balances",
            "limit": 10,
            "json": true,
        });
        let rows: Vec<BalanceRow> = self.get_table_rows(body, "balances").await?;
        Ok(rows.iter().map(|row| parse_token(&row.balance)).collect())
    }

    async fn get_table_rows<T: serde::de::DeserializeOwned>(
        &self,
        body: Value,
        table: &str,
    ) -> Result<Vec<T>> {
        let url = format!("{}/v1/chain/get_table_rows", self.base_url);
        let response = self.transport.post_json(&url, &body).await?;
        let page: TableRows<T> = serde_json::from_value(response)
            .with_context(|| format!("unexpected {table} table shape"))?;
        if page.more {
            log::debug!("[chain] {table} listing truncated at row limit");
        }
        Ok(page.rows)
    }
}
