//! View assembly
//!
//! Merges the three independently fetched record kinds into the views the
//! dashboard renders. The merge is explicit and typed, with a fixed
//! precedence: template metadata is the base, per-template config layers on
//! top, live instance state wins wherever the two genuinely overlap.
//! Also home to the derived predicates (fueled, claim-ready) and the fixed
//! rarity ordering.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::constants::schemas;
use crate::token::Token;
use crate::types::{AssetTemplate, AtomicAsset, ContractAsset, ToolConfig, ToolKind};

/// Merged view of one installed tool.
///
/// Instance fields are always present; template and config fields are
/// `None`/empty when the indexer or the `bconfigs` table has no row for the
/// instance's template. Consumers treat absence as "affordance disabled",
/// never as an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tool {
    pub asset_id: String,
    pub template_id: u32,
    pub owner: String,
    pub last_claim: i64,
    pub power: Vec<Token>,
    pub token_reserve: Vec<Token>,
    pub name: Option<String>,
    pub img: Option<String>,
    pub rarity: Option<String>,
    pub schema_name: Option<String>,
    pub kind: Option<ToolKind>,
    pub token_input: Vec<Token>,
    pub token_output: Vec<Token>,
    pub max_storage: Option<Token>,
    pub rarity_id: Option<u32>,
    /// Claim delay in seconds: the instance override when the chain row
    /// carries one, else the config default. `None` (no config either)
    /// means the tool can never be claim-ready.
    pub delay: Option<u32>,
}

/// Merged view of one owned mineral NFT.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mineral {
    pub asset_id: String,
    pub template_id: u32,
    pub name: String,
    pub img: String,
    pub rarity: String,
    pub schema_name: String,
    pub mint: u64,
}

/// One wallet NFT plus whether it is currently installed on the contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryItem {
    pub asset: AtomicAsset,
    pub installed: bool,
}

/// Required-vs-available pairing for one fuel symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuelLevel {
    pub required: Token,
    pub available: Token,
}

/// Tool family, distinguished by the template's schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolCategory {
    Buildings,
    Machines,
}

impl ToolCategory {
    pub fn schemas(self) -> &'static [&'static str] {
        match self {
            ToolCategory::Buildings => schemas::BUILDINGS,
            ToolCategory::Machines => schemas::MACHINES,
        }
    }
}

/// Fixed rarity ranking; unknown rarities are unranked and sort last.
pub fn rarity_rank(rarity: &str) -> Option<u8> {
    match rarity {
        "Metal" => Some(1),
        "Jadeite" => Some(2),
        "Silver" => Some(3),
        "Gold" => Some(4),
        "Helium" => Some(5),
        _ => None,
    }
}

fn rank_or_last(rarity: Option<&str>) -> u8 {
    rarity.and_then(rarity_rank).unwrap_or(u8::MAX)
}

/// Three-way merge for one instance. Precedence template < config <
/// instance: the only genuinely overlapping field is `delay`, where a
/// per-instance override beats the config default.
pub fn merge_tool(
    instance: &ContractAsset,
    template: Option<&AssetTemplate>,
    config: Option<&ToolConfig>,
) -> Tool {
    Tool {
        asset_id: instance.asset_id.clone(),
        template_id: instance.template_id,
        owner: instance.owner.clone(),
        last_claim: instance.last_claim,
        power: instance.power.clone(),
        token_reserve: instance.token_reserve.clone(),
        name: template.map(|t| t.name.clone()),
        img: template.map(|t| t.img.clone()),
        rarity: template.map(|t| t.rarity.clone()),
        schema_name: template.map(|t| t.schema_name.clone()),
        kind: config.map(|c| c.kind),
        token_input: config.map(|c| c.token_input.clone()).unwrap_or_default(),
        token_output: config.map(|c| c.token_output.clone()).unwrap_or_default(),
        max_storage: config.and_then(|c| c.max_storage.clone()),
        rarity_id: config.map(|c| c.rarity_id),
        delay: instance.delay.or_else(|| config.map(|c| c.delay)),
    }
}

/// Assemble one category's dashboard list: filter instances to templates in
/// the category's schema allow-list, merge each, order by rarity.
pub fn build_tools(
    templates: &[AssetTemplate],
    configs: &[ToolConfig],
    instances: &[ContractAsset],
    category: ToolCategory,
) -> Vec<Tool> {
    let by_template: HashMap<u32, &AssetTemplate> =
        templates.iter().map(|t| (t.template_id, t)).collect();
    let by_config: HashMap<u32, &ToolConfig> =
        configs.iter().map(|c| (c.template_id, c)).collect();
    let allowed: HashSet<u32> = templates
        .iter()
        .filter(|t| category.schemas().contains(&t.schema_name.as_str()))
        .map(|t| t.template_id)
        .collect();

    let mut tools: Vec<Tool> = instances
        .iter()
        .filter(|i| allowed.contains(&i.template_id))
        .map(|i| {
            merge_tool(
                i,
                by_template.get(&i.template_id).copied(),
                by_config.get(&i.template_id).copied(),
            )
        })
        .collect();
    sort_tools(&mut tools);
    tools
}

/// Rarity rank ascending; stable, so fetch order breaks ties.
pub fn sort_tools(tools: &mut [Tool]) {
    tools.sort_by_key(|t| rank_or_last(t.rarity.as_deref()));
}

/// Template-then-instance merge for minerals: per-NFT mutable data wins,
/// template metadata fills whatever the instance left blank.
pub fn merge_mineral(instance: &AtomicAsset, template: Option<&AssetTemplate>) -> Mineral {
    let fill = |own: &str, base: Option<&str>| {
        if own.is_empty() {
            base.unwrap_or_default().to_string()
        } else {
            own.to_string()
        }
    };
    Mineral {
        asset_id: instance.asset_id.clone(),
        template_id: instance.template_id,
        name: fill(&instance.name, template.map(|t| t.name.as_str())),
        img: fill(&instance.img, template.map(|t| t.img.as_str())),
        rarity: fill(&instance.rarity, template.map(|t| t.rarity.as_str())),
        schema_name: instance.schema_name.clone(),
        mint: instance.mint,
    }
}

pub fn build_minerals(templates: &[AssetTemplate], instances: &[AtomicAsset]) -> Vec<Mineral> {
    let by_template: HashMap<u32, &AssetTemplate> =
        templates.iter().map(|t| (t.template_id, t)).collect();
    let mut minerals: Vec<Mineral> = instances
        .iter()
        .map(|i| merge_mineral(i, by_template.get(&i.template_id).copied()))
        .collect();
    minerals.sort_by(|a, b| {
        rank_or_last(Some(&a.rarity))
            .cmp(&rank_or_last(Some(&b.rarity)))
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.mint.cmp(&b.mint))
    });
    minerals
}

/// One category's wallet inventory, flagged with installation state and
/// ordered by rarity, name, mint, then schema.
pub fn build_inventory(
    assets: &[AtomicAsset],
    installed: &[ContractAsset],
    category: ToolCategory,
) -> Vec<InventoryItem> {
    let installed_ids: HashSet<&str> = installed.iter().map(|t| t.asset_id.as_str()).collect();
    let mut items: Vec<InventoryItem> = assets
        .iter()
        .filter(|a| category.schemas().contains(&a.schema_name.as_str()))
        .map(|a| InventoryItem {
            asset: a.clone(),
            installed: installed_ids.contains(a.asset_id.as_str()),
        })
        .collect();
    items.sort_by(|a, b| {
        rank_or_last(Some(&a.asset.rarity))
            .cmp(&rank_or_last(Some(&b.asset.rarity)))
            .then_with(|| a.asset.name.cmp(&b.asset.name))
            .then_with(|| a.asset.mint.cmp(&b.asset.mint))
            .then_with(|| a.asset.schema_name.cmp(&b.asset.schema_name))
    });
    items
}

fn reserve_amount(reserve: &[Token], symbol: &str) -> f64 {
    reserve
        .iter()
        .find(|t| t.symbol == symbol)
        .map(|t| t.amount)
        .unwrap_or(0.0)
}

/// True iff every required input is covered by a same-symbol reserve entry.
/// A missing reserve entry counts as zero; NaN amounts (malformed source
/// strings) never satisfy the comparison.
pub fn is_fueled(tool: &Tool) -> bool {
    tool.token_input
        .iter()
        .all(|inp| reserve_amount(&tool.token_reserve, &inp.symbol) >= inp.amount)
}

/// True iff the claim timer has elapsed at `now_ms` and the tool is fueled.
/// Both are required: a tool past its timer but under-fueled is not ready.
pub fn is_claim_ready_at(tool: &Tool, now_ms: i64) -> bool {
    let Some(delay) = tool.delay else {
        return false;
    };
    (tool.last_claim + i64::from(delay)) * 1000 < now_ms && is_fueled(tool)
}

/// Pair every required input with the matching reserve entry (zero when
/// absent), in input order, for gauge display.
pub fn fuel_gauge(tool: &Tool) -> Vec<FuelLevel> {
    tool.token_input
        .iter()
        .map(|inp| FuelLevel {
            required: inp.clone(),
            available: tool
                .token_reserve
                .iter()
                .find(|r| r.symbol == inp.symbol)
                .cloned()
                .unwrap_or_else(|| Token {
                    amount: 0.0,
                    symbol: inp.symbol.clone(),
                }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::parse_token;

    fn template(id: u32, name: &str, rarity: &str, schema: &str) -> AssetTemplate {
        AssetTemplate {
            template_id: id,
            name: name.into(),
            img: format!("Qm{id}"),
            rarity: rarity.into(),
            schema_name: schema.into(),
        }
    }

    fn config(id: u32, delay: u32, inputs: &[&str]) -> ToolConfig {
        ToolConfig {
            template_id: id,
            kind: ToolKind::Machine,
            token_input: inputs.iter().map(|s| parse_token(s)).collect(),
            token_output: vec![parse_token("0.5000 HEL")],
            delay,
            max_storage: None,
            rarity_id: 1,
        }
    }

    fn instance(asset_id: &str, template_id: u32, reserve: &[&str]) -> ContractAsset {
        ContractAsset {
            asset_id: asset_id.into(),
            template_id,
            owner: "miner.wam".into(),
            last_claim: 1,
            delay: None,
            power: Vec::new(),
            token_reserve: reserve.iter().map(|s| parse_token(s)).collect(),
        }
    }

    #[test]
    fn config_delay_survives_when_instance_has_none() {
        let tmpl = template(1, "A", "Gold", "machinephoe");
        let conf = config(1, 5, &[]);
        let inst = instance("123", 1, &[]);
        let tool = merge_tool(&inst, Some(&tmpl), Some(&conf));
        assert_eq!(tool.delay, Some(5));
        assert_eq!(tool.name.as_deref(), Some("A"));
    }

    #[test]
    fn instance_delay_overrides_config() {
        let conf = config(1, 5, &[]);
        let mut inst = instance("123", 1, &[]);
        inst.delay = Some(7);
        let tool = merge_tool(&inst, None, Some(&conf));
        assert_eq!(tool.delay, Some(7));
    }

    #[test]
    fn merge_without_sources_keeps_instance_fields_only() {
        let inst = instance("123", 9, &["1.0000 HTWO"]);
        let tool = merge_tool(&inst, None, None);
        assert_eq!(tool.asset_id, "123");
        assert_eq!(tool.name, None);
        assert_eq!(tool.kind, None);
        assert_eq!(tool.delay, None);
        assert!(tool.token_input.is_empty());
        assert_eq!(tool.token_reserve.len(), 1);
    }

    #[test]
    fn mineral_instance_data_wins_over_template() {
        let tmpl = template(2, "A", "Silver", "moon.mineral");
        let mut inst = AtomicAsset {
            asset_id: "55".into(),
            template_id: 2,
            name: "C".into(),
            img: String::new(),
            rarity: String::new(),
            schema_name: "moon.mineral".into(),
            mint: 3,
        };
        let merged = merge_mineral(&inst, Some(&tmpl));
        assert_eq!(merged.name, "C");
        assert_eq!(merged.rarity, "Silver");

        inst.name = String::new();
        let merged = merge_mineral(&inst, Some(&tmpl));
        assert_eq!(merged.name, "A");
    }

    #[test]
    fn fueled_requires_full_coverage_per_symbol() {
        let conf = config(1, 5, &["50.0000 HTWO"]);
        let short = merge_tool(&instance("1", 1, &["49.0000 HTWO"]), None, Some(&conf));
        assert!(!is_fueled(&short));

        let exact = merge_tool(&instance("2", 1, &["50.0000 HTWO"]), None, Some(&conf));
        assert!(is_fueled(&exact));

        let wrong_symbol = merge_tool(&instance("3", 1, &["50.0000 OTWO"]), None, Some(&conf));
        assert!(!is_fueled(&wrong_symbol));
    }

    #[test]
    fn malformed_reserve_never_counts_as_fuel() {
        let conf = config(1, 5, &["1.0000 HTWO"]);
        let tool = merge_tool(&instance("1", 1, &["garbage HTWO"]), None, Some(&conf));
        assert!(!is_fueled(&tool));
    }

    #[test]
    fn claim_ready_needs_timer_and_fuel() {
        let conf = config(1, 10, &["1.0000 HTWO"]);
        let fueled = merge_tool(&instance("1", 1, &["2.0000 HTWO"]), None, Some(&conf));
        // last_claim 1s + delay 10s elapses at 11000ms
        assert!(is_claim_ready_at(&fueled, 11_001));
        assert!(!is_claim_ready_at(&fueled, 11_000));

        let dry = merge_tool(&instance("2", 1, &[]), None, Some(&conf));
        assert!(!is_claim_ready_at(&dry, 11_001));

        let unconfigured = merge_tool(&instance("3", 1, &["2.0000 HTWO"]), None, None);
        assert!(!is_claim_ready_at(&unconfigured, i64::MAX));
    }

    #[test]
    fn rarity_order_follows_rank_table() {
        let templates = [
            template(1, "g", "Gold", "machinephoe"),
            template(2, "m", "Metal", "machinephoe"),
            template(3, "h", "Helium", "machinephoe"),
        ];
        let instances = [instance("1", 1, &[]), instance("2", 2, &[]), instance("3", 3, &[])];
        let tools = build_tools(&templates, &[], &instances, ToolCategory::Machines);
        let order: Vec<_> = tools.iter().map(|t| t.rarity.as_deref().unwrap()).collect();
        assert_eq!(order, ["Metal", "Gold", "Helium"]);
    }

    #[test]
    fn unranked_rarities_sort_last() {
        let templates = [
            template(1, "x", "Mystery", "machinephoe"),
            template(2, "m", "Metal", "machinephoe"),
        ];
        let instances = [instance("1", 1, &[]), instance("2", 2, &[])];
        let tools = build_tools(&templates, &[], &instances, ToolCategory::Machines);
        assert_eq!(tools[0].rarity.as_deref(), Some("Metal"));
        assert_eq!(tools[1].rarity.as_deref(), Some("Mystery"));
    }

    #[test]
    fn category_filter_uses_template_schema() {
        let templates = [
            template(1, "b", "Metal", "buildingaqua"),
            template(2, "m", "Metal", "machineterra"),
        ];
        let instances = [instance("1", 1, &[]), instance("2", 2, &[])];

        let buildings = build_tools(&templates, &[], &instances, ToolCategory::Buildings);
        assert_eq!(buildings.len(), 1);
        assert_eq!(buildings[0].asset_id, "1");

        let machines = build_tools(&templates, &[], &instances, ToolCategory::Machines);
        assert_eq!(machines.len(), 1);
        assert_eq!(machines[0].asset_id, "2");

        // an instance with no known template matches no category
        let orphans = [instance("9", 99, &[])];
        assert!(build_tools(&templates, &[], &orphans, ToolCategory::Machines).is_empty());
    }

    #[test]
    fn inventory_flags_installed_and_orders_by_rank_name_mint() {
        let asset = |id: &str, name: &str, rarity: &str, mint: u64| AtomicAsset {
            asset_id: id.into(),
            template_id: 1,
            name: name.into(),
            img: String::new(),
            rarity: rarity.into(),
            schema_name: "machinephoe".into(),
            mint,
        };
        let assets = [
            asset("10", "Drill", "Gold", 2),
            asset("11", "Drill", "Gold", 1),
            asset("12", "Auger", "Gold", 5),
            asset("13", "Pump", "Metal", 9),
        ];
        let installed = [instance("11", 1, &[])];

        let items = build_inventory(&assets, &installed, ToolCategory::Machines);
        let ids: Vec<_> = items.iter().map(|i| i.asset.asset_id.as_str()).collect();
        assert_eq!(ids, ["13", "12", "11", "10"]);
        assert!(items[2].installed);
        assert!(!items[3].installed);

        // buildings category sees none of these
        assert!(build_inventory(&assets, &installed, ToolCategory::Buildings).is_empty());
    }

    #[test]
    fn fuel_gauge_zero_fills_missing_reserve() {
        let conf = config(1, 5, &["10.0000 HTWO", "2.0000 OTWO"]);
        let tool = merge_tool(&instance("1", 1, &["4.0000 HTWO"]), None, Some(&conf));
        let gauge = fuel_gauge(&tool);
        assert_eq!(gauge.len(), 2);
        assert_eq!(gauge[0].available.amount, 4.0);
        assert_eq!(gauge[1].available.amount, 0.0);
        assert_eq!(gauge[1].available.symbol, "OTWO");
    }
}
