//! Configuration
//!
//! CLI flags with environment fallbacks folded into one [`Config`].
//! Priority: CLI args > Environment variables > Defaults.

use anyhow::{anyhow, Result};
use clap::Parser;
use std::env;
use std::path::PathBuf;

use crate::constants::{chain, endpoints, ttl};

/// Which view the CLI renders.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum View {
    Dashboard,
    Inventory,
    Minerals,
}

impl std::str::FromStr for View {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "dashboard" | "dash" => Ok(View::Dashboard),
            "inventory" | "inv" => Ok(View::Inventory),
            "minerals" => Ok(View::Minerals),
            _ => Err(anyhow!(
                "Invalid view '{s}'. Valid options: dashboard, inventory, minerals"
            )),
        }
    }
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            View::Dashboard => write!(f, "dashboard"),
            View::Inventory => write!(f, "inventory"),
            View::Minerals => write!(f, "minerals"),
        }
    }
}

/// he3x - He3 moon-mining game dashboard
///
/// Headless viewer for player machines, inventory and minerals on WAX.
/// Configuration priority: CLI args > Environment variables > Defaults
#[derive(Parser, Debug)]
#[command(name = "he3x")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "He3 moon-mining game dashboard", long_about = None)]
pub struct CliArgs {
    /// WAX account to view
    #[arg(short, long, env = "WAX_ACCOUNT")]
    pub account: Option<String>,

    /// Transaction authority to attach to actions
    #[arg(long, env = "WAX_PERMISSION")]
    pub permission: Option<String>,

    /// View to render: dashboard, inventory or minerals
    #[arg(long, env = "VIEW", value_parser = clap::value_parser!(View))]
    pub view: Option<View>,

    /// WAX chain API base URL
    #[arg(long, env = "CHAIN_URL")]
    pub chain_url: Option<String>,

    /// AtomicAssets indexer base URL
    #[arg(long, env = "ATOMIC_URL")]
    pub atomic_url: Option<String>,

    /// Game contract account
    #[arg(long, env = "GAME_CONTRACT")]
    pub contract: Option<String>,

    /// AtomicAssets collection name
    #[arg(long, env = "COLLECTION")]
    pub collection: Option<String>,

    /// HTTP timeout in milliseconds (1000-60000)
    #[arg(long, env = "HTTP_TIMEOUT_MS")]
    pub http_timeout_ms: Option<u64>,

    /// Cache directory for fetched data (defaults to a per-user temp dir)
    #[arg(long, env = "CACHE_DIR")]
    pub cache_dir: Option<String>,

    /// Template metadata TTL in seconds (0 = never expire)
    #[arg(long, env = "TTL_TEMPLATES")]
    pub ttl_templates: Option<i64>,

    /// Tool config TTL in seconds (0 = never expire)
    #[arg(long, env = "TTL_TOOL_CONFIGS")]
    pub ttl_tool_configs: Option<i64>,

    /// Player state TTL in seconds, shared by tools/assets/minerals
    #[arg(long, env = "TTL_INSTANCES")]
    pub ttl_instances: Option<i64>,

    /// Shop listing TTL in seconds (0 = never expire)
    #[arg(long, env = "TTL_SHOP")]
    pub ttl_shop: Option<i64>,
}

/// Cache lifetimes in seconds. 0 disables expiry for that slot family.
#[derive(Clone, Copy, Debug)]
pub struct TtlPolicy {
    pub templates: i64,
    pub tool_configs: i64,
    pub instances: i64,
    pub shop: i64,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            templates: ttl::TEMPLATES,
            tool_configs: ttl::TOOL_CONFIGS,
            instances: ttl::INSTANCES,
            shop: ttl::SHOP,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub account: Option<String>,
    pub permission: String,
    pub view: View,
    pub chain_url: String,
    pub atomic_url: String,
    pub contract: String,
    pub collection: String,
    pub http_timeout_ms: u64,
    pub cache_dir: Option<PathBuf>,
    pub ttl: TtlPolicy,
}

/// Validate that a value is within a given range (inclusive)
fn validate_in_range<T>(val: T, min: T, max: T, name: &str) -> Result<T>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if val < min || val > max {
        Err(anyhow!("{name} must be in range [{min}, {max}], got {val}"))
    } else {
        Ok(val)
    }
}

/// Validate URL format (basic check)
fn validate_url(url: &str, name: &str) -> Result<()> {
    if url.is_empty() {
        return Err(anyhow!("{name} cannot be empty"));
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(anyhow!("{name} must start with http:// or https://"))
    }
}

/// Load configuration from CLI args and environment variables
pub fn load() -> Result<Config> {
    from_args(CliArgs::parse())
}

/// Fold parsed args and environment into a validated [`Config`].
pub fn from_args(args: CliArgs) -> Result<Config> {
    let chain_url = args
        .chain_url
        .or_else(|| env::var("CHAIN_URL").ok())
        .unwrap_or_else(|| endpoints::CHAIN[0].to_string());
    validate_url(&chain_url, "CHAIN_URL")?;

    let atomic_url = args
        .atomic_url
        .or_else(|| env::var("ATOMIC_URL").ok())
        .unwrap_or_else(|| endpoints::ATOMIC[0].to_string());
    validate_url(&atomic_url, "ATOMIC_URL")?;

    let http_timeout_ms = args
        .http_timeout_ms
        .or_else(|| env::var("HTTP_TIMEOUT_MS").ok().and_then(|s| s.parse().ok()))
        .unwrap_or(8000);
    let http_timeout_ms = validate_in_range(http_timeout_ms, 1000, 60000, "HTTP_TIMEOUT_MS")?;

    let defaults = TtlPolicy::default();
    let ttl = TtlPolicy {
        templates: ttl_value(args.ttl_templates, "TTL_TEMPLATES", defaults.templates)?,
        tool_configs: ttl_value(args.ttl_tool_configs, "TTL_TOOL_CONFIGS", defaults.tool_configs)?,
        instances: ttl_value(args.ttl_instances, "TTL_INSTANCES", defaults.instances)?,
        shop: ttl_value(args.ttl_shop, "TTL_SHOP", defaults.shop)?,
    };

    Ok(Config {
        account: args.account.or_else(|| env::var("WAX_ACCOUNT").ok()),
        permission: args
            .permission
            .or_else(|| env::var("WAX_PERMISSION").ok())
            .unwrap_or_else(|| chain::DEFAULT_PERMISSION.to_string()),
        view: args.view.unwrap_or(View::Dashboard),
        chain_url,
        atomic_url,
        contract: args
            .contract
            .or_else(|| env::var("GAME_CONTRACT").ok())
            .unwrap_or_else(|| chain::GAME_CONTRACT.to_string()),
        collection: args
            .collection
            .or_else(|| env::var("COLLECTION").ok())
            .unwrap_or_else(|| chain::COLLECTION.to_string()),
        http_timeout_ms,
        cache_dir: args
            .cache_dir
            .or_else(|| env::var("CACHE_DIR").ok())
            .map(PathBuf::from),
        ttl,
    })
}

fn ttl_value(cli: Option<i64>, env_name: &str, default: i64) -> Result<i64> {
    let val = cli
        .or_else(|| env::var(env_name).ok().and_then(|s| s.parse().ok()))
        .unwrap_or(default);
    validate_in_range(val, 0, 30 * 86_400, env_name)
}
