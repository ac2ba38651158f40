//! Read-only terminal views for the mining game
//!
//! Fetches the selected view through the cache-fronted client and prints
//! it. No signer is wired here: this binary inspects game state, and
//! mutations go through [`he3x::Mutator`] from code that owns a wallet
//! bridge.
//!
//! ## Usage
//! ```bash
//! he3x --account miner.wam --view dashboard
//! WAX_ACCOUNT=miner.wam he3x --view minerals
//! ```

use std::sync::Arc;

use anyhow::{bail, Context, Result};

use he3x::aggregate::{fuel_gauge, is_claim_ready_at, InventoryItem, Tool};
use he3x::cache::{now_ms, Cache, FileStore};
use he3x::client::{Dashboard, GameClient, Inventory, MineralsView};
use he3x::config::{self, View};
use he3x::token::{display_symbol, format_display};
use he3x::transport::HttpTransport;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cfg = config::load().context("failed to load configuration")?;
    let Some(account) = cfg.account.clone() else {
        bail!("no account configured; pass --account or set WAX_ACCOUNT");
    };

    let cache_dir = cfg
        .cache_dir
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("he3x"));
    let store = FileStore::open(&cache_dir)
        .with_context(|| format!("opening cache at {}", cache_dir.display()))?;
    let cache = Cache::new(Arc::new(store));
    let transport = Arc::new(HttpTransport::new(cfg.http_timeout_ms));

    log::debug!("account {account}, chain {}, indexer {}", cfg.chain_url, cfg.atomic_url);

    let client = GameClient::new(&cfg, transport, cache);
    match cfg.view {
        View::Dashboard => render_dashboard(&client.dashboard(&account).await?),
        View::Inventory => render_inventory(&client.inventory(&account).await?),
        View::Minerals => render_minerals(&client.minerals(&account).await?),
    }

    Ok(())
}

fn render_dashboard(view: &Dashboard) {
    let now = now_ms();
    println!("Buildings ({})", view.buildings.len());
    for tool in &view.buildings {
        print_tool(tool, now);
    }
    println!();
    println!("Machines ({})", view.machines.len());
    for tool in &view.machines {
        print_tool(tool, now);
    }
}

fn print_tool(tool: &Tool, now_ms: i64) {
    println!(
        "  {:<24} {:<8} {:>12}  #{}",
        tool.name.as_deref().unwrap_or("(no template)"),
        tool.rarity.as_deref().unwrap_or("-"),
        tool_status(tool, now_ms),
        tool.asset_id,
    );
    for level in fuel_gauge(tool) {
        println!(
            "      fuel {} / {}",
            format_display(&display_symbol(&level.available)),
            format_display(&display_symbol(&level.required)),
        );
    }
}

fn tool_status(tool: &Tool, now_ms: i64) -> String {
    if is_claim_ready_at(tool, now_ms) {
        return "ready".into();
    }
    let Some(delay) = tool.delay else {
        return "-".into();
    };
    let ready_at = (tool.last_claim + i64::from(delay)) * 1000;
    if ready_at >= now_ms {
        format!("{}s", (ready_at - now_ms + 999) / 1000)
    } else {
        "needs fuel".into()
    }
}

fn render_inventory(view: &Inventory) {
    println!("Buildings ({})", view.buildings.len());
    for item in &view.buildings {
        print_item(item);
    }
    println!();
    println!("Machines ({})", view.machines.len());
    for item in &view.machines {
        print_item(item);
    }
}

fn print_item(item: &InventoryItem) {
    println!(
        "  {:<24} {:<8} mint #{:<6} {:>9}  #{}",
        item.asset.name,
        item.asset.rarity,
        item.asset.mint,
        if item.installed { "installed" } else { "" },
        item.asset.asset_id,
    );
}

fn render_minerals(view: &MineralsView) {
    println!("Minerals ({})", view.minerals.len());
    for mineral in &view.minerals {
        println!(
            "  {:<24} {:<8} mint #{:<6} #{}",
            mineral.name, mineral.rarity, mineral.mint, mineral.asset_id,
        );
    }
    println!();
    println!("Balances");
    for balance in &view.balances {
        println!("  {}", format_display(&display_symbol(balance)));
    }
    println!();
    println!("Shop");
    for listing in &view.listings {
        println!(
            "  template {:<10} {}",
            listing.template_id,
            format_display(&display_symbol(&listing.price)),
        );
    }
}
