use serde::Serialize;
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::config::DeploymentMode;

/// A membership level offered to Founding Circle applicants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tier {
    pub id: &'static str,
    pub name: &'static str,
    /// Whole currency units (USD dollars).
    pub price: u32,
    pub price_string: String,
    pub description: &'static str,
    pub features: &'static [&'static str],
    /// Only resolvable outside live mode.
    #[serde(skip)]
    pub test_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tier '{0}'")]
pub struct TierNotFound(pub String);

struct TierDefinition {
    id: &'static str,
    name: &'static str,
    price: u32,
    description: &'static str,
    features: &'static [&'static str],
    test_only: bool,
}

const STANDARD_TIERS: &[TierDefinition] = &[
    TierDefinition {
        id: "supporter",
        name: "Supporter",
        price: 50,
        description: "Lifetime community access and early access to every program.",
        features: &[
            "Lifetime access to Herscape community",
            "Exclusive founding member badge",
            "Early access to all programs",
            "Monthly virtual meetups",
        ],
        test_only: false,
    },
    TierDefinition {
        id: "pioneer",
        name: "Pioneer",
        price: 250,
        description: "All core perks, priority access to pitch circles and events.",
        features: &[
            "All Supporter benefits",
            "Custom Herscape journal",
            "Priority access to events",
            "Quarterly mastermind sessions",
            "Founding member certificate",
        ],
        test_only: false,
    },
    TierDefinition {
        id: "angel",
        name: "Angel",
        price: 500,
        description: "All Pioneer perks, plus Gold Club/Board eligibility and VIP status.",
        features: &[
            "All Pioneer benefits",
            "VIP access to all events",
            "1:1 mentorship session",
            "Custom identity package",
            "Gold Club membership",
            "Board eligibility",
        ],
        test_only: false,
    },
    TierDefinition {
        id: "test",
        name: "Test",
        price: 1,
        description: "Sandbox tier for exercising the payment flow end to end.",
        features: &["No membership perks"],
        test_only: true,
    },
];

/// Immutable tier lookup built once per process.
#[derive(Debug)]
pub struct TierCatalog {
    tiers: Vec<Tier>,
    index: HashMap<&'static str, usize>,
}

impl TierCatalog {
    pub fn standard() -> &'static TierCatalog {
        static CATALOG: OnceLock<TierCatalog> = OnceLock::new();
        CATALOG.get_or_init(|| TierCatalog::from_definitions(STANDARD_TIERS))
    }

    fn from_definitions(definitions: &[TierDefinition]) -> Self {
        let mut tiers = Vec::with_capacity(definitions.len());
        let mut index = HashMap::with_capacity(definitions.len());
        for def in definitions {
            // First definition wins; ids are unique in STANDARD_TIERS.
            if index.contains_key(def.id) {
                continue;
            }
            index.insert(def.id, tiers.len());
            tiers.push(Tier {
                id: def.id,
                name: def.name,
                price: def.price,
                price_string: format_price(def.price),
                description: def.description,
                features: def.features,
                test_only: def.test_only,
            });
        }
        Self { tiers, index }
    }

    pub fn resolve(&self, tier_id: &str) -> Result<&Tier, TierNotFound> {
        self.index
            .get(tier_id.trim())
            .map(|&i| &self.tiers[i])
            .ok_or_else(|| TierNotFound(tier_id.to_string()))
    }

    /// Like [`resolve`](Self::resolve), but test-only tiers are unknown in live mode.
    pub fn resolve_for(&self, tier_id: &str, mode: DeploymentMode) -> Result<&Tier, TierNotFound> {
        match self.resolve(tier_id)? {
            tier if tier.test_only && mode.is_live() => Err(TierNotFound(tier_id.to_string())),
            tier => Ok(tier),
        }
    }

    pub fn listed(&self, mode: DeploymentMode) -> impl Iterator<Item = &Tier> {
        self.tiers
            .iter()
            .filter(move |t| !(t.test_only && mode.is_live()))
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}

pub fn format_price(price: u32) -> String {
    format!("${price}")
}
