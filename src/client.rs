//! Read-side facade
//!
//! One client per session wiring the indexer and chain fetchers to a shared
//! cache, then assembling the typed views the binary renders. Every view
//! fans its fetches out concurrently and fails as a unit: a view built from
//! partial data would lie about claim readiness and fuel.

use std::sync::Arc;

use anyhow::{bail, Result};
use futures::future::{try_join, try_join3, try_join4};
use serde::Serialize;

use crate::aggregate::{
    build_inventory, build_minerals, build_tools, merge_tool, InventoryItem, Mineral, Tool,
    ToolCategory,
};
use crate::atomic_api::AtomicClient;
use crate::cache::Cache;
use crate::chain_api::ChainClient;
use crate::config::Config;
use crate::token::Token;
use crate::transport::Transport;
use crate::types::ShopListing;

/// Installed tools grouped by category, ready to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub buildings: Vec<Tool>,
    pub machines: Vec<Tool>,
}

/// Wallet NFTs grouped by category, flagged when already installed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inventory {
    pub buildings: Vec<InventoryItem>,
    pub machines: Vec<InventoryItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MineralsView {
    pub minerals: Vec<Mineral>,
    pub balances: Vec<Token>,
    pub listings: Vec<ShopListing>,
}

/// Everything the fuel screen needs for one machine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuelView {
    pub tool: Tool,
    pub balances: Vec<Token>,
    /// One zeroed entry per required input; callers edit amounts in place
    /// and hand the result to a deposit or withdraw mutation.
    pub selection: Vec<Token>,
}

pub struct GameClient {
    atomic: AtomicClient,
    chain: ChainClient,
}

impl GameClient {
    pub fn new(cfg: &Config, transport: Arc<dyn Transport>, cache: Cache) -> Self {
        Self {
            atomic: AtomicClient::new(
                &cfg.atomic_url,
                &cfg.collection,
                Arc::clone(&transport),
                cache.clone(),
                cfg.ttl,
            ),
            chain: ChainClient::new(&cfg.chain_url, &cfg.contract, transport, cache, cfg.ttl),
        }
    }

    pub async fn dashboard(&self, account: &str) -> Result<Dashboard> {
        let (templates, tools, configs) = try_join3(
            self.atomic.fetch_templates(),
            self.chain.fetch_player_tools(account),
            self.chain.fetch_tool_configs(),
        )
        .await?;
        Ok(Dashboard {
            buildings: build_tools(&templates, &configs, &tools, ToolCategory::Buildings),
            machines: build_tools(&templates, &configs, &tools, ToolCategory::Machines),
        })
    }

    pub async fn inventory(&self, account: &str) -> Result<Inventory> {
        let (assets, tools) = try_join(
            self.atomic.fetch_player_assets(account),
            self.chain.fetch_player_tools(account),
        )
        .await?;
        Ok(Inventory {
            buildings: build_inventory(&assets, &tools, ToolCategory::Buildings),
            machines: build_inventory(&assets, &tools, ToolCategory::Machines),
        })
    }

    pub async fn minerals(&self, account: &str) -> Result<MineralsView> {
        let (templates, instances, listings, balances) = try_join4(
            self.atomic.fetch_templates(),
            self.atomic.fetch_player_minerals(account),
            self.chain.fetch_shop_listings(),
            self.chain.fetch_player_balances(account),
        )
        .await?;
        Ok(MineralsView {
            minerals: build_minerals(&templates, &instances),
            balances,
            listings,
        })
    }

    pub async fn fuel_view(&self, account: &str, asset_id: &str) -> Result<FuelView> {
        let (templates, tools, configs, balances) = try_join4(
            self.atomic.fetch_templates(),
            self.chain.fetch_player_tools(account),
            self.chain.fetch_tool_configs(),
            self.chain.fetch_player_balances(account),
        )
        .await?;
        let Some(instance) = tools.iter().find(|t| t.asset_id == asset_id) else {
            bail!("asset {asset_id} is not installed for {account}");
        };
        let template = templates
            .iter()
            .find(|t| t.template_id == instance.template_id);
        let config = configs
            .iter()
            .find(|c| c.template_id == instance.template_id);
        let tool = merge_tool(instance, template, config);
        let selection = tool
            .token_input
            .iter()
            .map(|inp| Token {
                amount: 0.0,
                symbol: inp.symbol.clone(),
            })
            .collect();
        Ok(FuelView {
            tool,
            balances,
            selection,
        })
    }
}
