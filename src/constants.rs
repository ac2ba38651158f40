//! Game and chain constants
//!
//! Centralized identities, cache lifetimes, schema allow-lists and public
//! endpoint catalogs used throughout the crate.

/// On-chain identities of the game
pub mod chain {
    /// Game contract account (owns the `machines`, `bconfigs` and `shop` tables)
    pub const GAME_CONTRACT: &str = "moonmhe3game";

    /// AtomicAssets collection holding every game NFT
    pub const COLLECTION: &str = "moonminingh3";

    /// Token contract account (owns per-player `balances` tables)
    pub const TOKEN_CONTRACT: &str = "moonmhe3tokn";

    /// Core reward token symbol
    pub const TOKEN_SYMBOL: &str = "HEL";

    /// AtomicAssets system contract (burns go here, not to the game contract)
    pub const ATOMIC_CONTRACT: &str = "atomicassets";

    /// WAX mainnet chain id
    pub const CHAIN_ID: &str = "1064487b3cd1a897ce03ae5b6a865651747e2e152090f99c1d19d44e01aea5a4";

    /// Dapp name registered with wallet providers
    pub const DAPP_NAME: &str = "simplehe3";

    /// Default transaction authority when none is configured
    pub const DEFAULT_PERMISSION: &str = "active";
}

/// Cache lifetimes in seconds
pub mod ttl {
    /// Template metadata is immutable once published
    pub const TEMPLATES: i64 = 86_400;

    /// Per-template game parameters change only on game updates
    pub const TOOL_CONFIGS: i64 = 3_600;

    /// Shop listings change only on game updates
    pub const SHOP: i64 = 3_600;

    /// Player state (installed tools, wallet assets, minerals) goes stale fast
    pub const INSTANCES: i64 = 60;
}

/// AtomicAssets schema allow-lists per tool category
pub mod schemas {
    /// Schemas whose templates count as buildings
    pub const BUILDINGS: &[&str] = &["buildingphoe", "buildingaqua", "buildingterr", "buildingpega"];

    /// Schemas whose templates count as machines
    pub const MACHINES: &[&str] = &["machinephoe", "machineaqua", "machineterra"];

    /// Schema holding mineral NFTs
    pub const MINERALS: &str = "moon.mineral";
}

/// Shop economics
pub mod shop {
    /// One minted mineral costs this many units of the listed resource
    pub const MINERAL_UNIT_COST: f64 = 100.0;
}

/// Public API hosts, first entry is the default
pub mod endpoints {
    /// AtomicAssets indexer hosts
    pub const ATOMIC: &[&str] = &[
        "https://wax.api.atomicassets.io",
        "https://aa-api-wax.eosauthority.com",
        "https://aa.dapplica.io",
        "https://api-wax-aa.eosarabia.net",
        "https://api.atomic.greeneosio.com",
        "https://api.wax-aa.bountyblok.io",
        "https://api.wax.liquidstudios.io",
        "https://atomic.3dkrender.com",
        "https://atomic.hivebp.io",
        "https://atomic.ledgerwise.io",
        "https://atomic.tokengamer.io",
        "https://atomic.wax.eosrio.io",
        "https://wax-aa.eosdublin.io",
        "https://wax-aa.eu.eosamsterdam.net",
        "https://wax-atomic-api.eosphere.io",
        "https://wax-atomic.eosiomadrid.io",
        "https://wax-atomic.wizardsguild.one",
    ];

    /// WAX chain API hosts
    pub const CHAIN: &[&str] = &[
        "https://wax.eosphere.io",
        "https://api.wax.alohaeos.com",
        "https://wax.greymass.com",
        "https://api-wax.eosarabia.net",
        "https://api-wax.eosauthority.com",
        "https://api.hivebp.io",
        "https://api.wax.eosdetroit.io",
        "https://api.wax.greeneosio.com",
        "https://api.wax.liquidstudios.io",
        "https://api.waxsweden.org",
        "https://apiwax.3dkrender.com",
        "https://wax-bp.wizardsguild.one",
        "https://wax.blacklusion.io",
        "https://wax.blokcrafters.io",
        "https://wax.cryptolions.io",
        "https://wax.dapplica.io",
        "https://wax.eosdac.io",
        "https://wax.eosdublin.io",
        "https://wax.eoseoul.io",
        "https://wax.eosn.io",
        "https://wax.eu.eosamsterdam.net",
        "https://wax.pink.gg",
        "https://waxapi.ledgerwise.io",
    ];
}
