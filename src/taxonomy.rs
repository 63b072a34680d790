// 🌳 Taxonomy Registry - label → parent label, with the asset-class skeleton
//
// The skeleton is fixed at construction. Holding names and genres are added
// while a report is built: holding names hang under their genre, genres get
// a parent inferred from their wording the first time they are looked up.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Taxonomy labels produced by the classifier and used by the skeleton
pub mod labels {
    pub const ROOT: &str = "Total";
    pub const NON_RISK_ASSET: &str = "non-risk asset";
    pub const RISK_ASSET: &str = "risk asset";
    pub const UNKNOWN: &str = "unknown";

    pub const EQUITY: &str = "equity";
    pub const BOND: &str = "bond";
    pub const REIT: &str = "REIT";
    pub const OTHER: &str = "other";
    pub const BALANCED: &str = "balanced";
    pub const COMMODITY: &str = "commodity";
    pub const GOLD: &str = "gold";
    pub const ETF: &str = "ETF";
    pub const FOREIGN_ETF: &str = "foreign ETF";
    pub const FOREIGN_CURRENCY: &str = "foreign currency";
    pub const OTHER_RISK_ASSET: &str = "other risk asset";

    pub const JAPANESE_YEN: &str = "Japanese yen";
    pub const JAPANESE_EQUITY: &str = "Japanese equity";
    pub const JAPANESE_BOND: &str = "Japanese bond";
    pub const US_BOND: &str = "US bond";

    pub const WORLD: &str = "world";
    pub const DEVELOPED: &str = "developed markets";
    pub const EMERGING: &str = "emerging markets";
    pub const JAPAN: &str = "Japan";
}

/// (label, parent) pairs seeded into every registry
pub const SKELETON: &[(&str, &str)] = &[
    (labels::ROOT, ""),
    (labels::NON_RISK_ASSET, labels::ROOT),
    (labels::RISK_ASSET, labels::ROOT),
    (labels::UNKNOWN, labels::ROOT),
    (labels::EQUITY, labels::RISK_ASSET),
    (labels::BOND, labels::RISK_ASSET),
    (labels::REIT, labels::RISK_ASSET),
    (labels::OTHER, labels::RISK_ASSET),
    (labels::BALANCED, labels::RISK_ASSET),
    (labels::COMMODITY, labels::RISK_ASSET),
    (labels::GOLD, labels::COMMODITY),
    (labels::ETF, labels::RISK_ASSET),
    (labels::FOREIGN_ETF, labels::RISK_ASSET),
    (labels::JAPANESE_YEN, labels::NON_RISK_ASSET),
    (labels::FOREIGN_CURRENCY, labels::RISK_ASSET),
    (labels::OTHER_RISK_ASSET, labels::RISK_ASSET),
];

// ============================================================================
// PATTERNS
// ============================================================================

static EQUITY_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"equity|株式").expect("valid regex"));
static BOND_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"bond|債券").expect("valid regex"));
static REIT_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"REIT").expect("valid regex"));
static OTHER_RISK_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"other risk asset$").expect("valid regex"));
static OTHER_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"other|その他").expect("valid regex"));
static FOREIGN_CURRENCY_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"foreign currency|外貨").expect("valid regex"));

// ============================================================================
// COLOURS
// ============================================================================

pub mod colors {
    pub const ROOT: &str = "#fff";
    pub const NON_RISK: &str = "#27f";
    pub const RISK: &str = "#f44";
    pub const EQUITY: &str = "#f44";
    pub const BOND: &str = "#f82";
    pub const OTHER: &str = "#fc4";
    pub const FOREIGN_CURRENCY: &str = "#fe0";
    pub const NEUTRAL: &str = "#888";
}

/// Colour decided by the label alone, without looking at its parents
fn own_color(label: &str) -> Option<&'static str> {
    match label {
        labels::ROOT => return Some(colors::ROOT),
        labels::NON_RISK_ASSET => return Some(colors::NON_RISK),
        labels::RISK_ASSET => return Some(colors::RISK),
        labels::UNKNOWN => return Some(colors::NEUTRAL),
        _ => {}
    }

    if EQUITY_LABEL.is_match(label) {
        Some(colors::EQUITY)
    } else if BOND_LABEL.is_match(label) {
        Some(colors::BOND)
    } else if OTHER_LABEL.is_match(label) {
        Some(colors::OTHER)
    } else if FOREIGN_CURRENCY_LABEL.is_match(label) {
        Some(colors::FOREIGN_CURRENCY)
    } else {
        None
    }
}

// ============================================================================
// CATEGORY REGISTRY
// ============================================================================

/// Registry of parent links for every label seen during one report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryRegistry {
    parents: HashMap<String, String>,
}

impl CategoryRegistry {
    /// Create new empty registry
    pub fn new() -> Self {
        CategoryRegistry {
            parents: HashMap::new(),
        }
    }

    /// Create registry with the taxonomy skeleton pre-loaded
    pub fn with_defaults() -> Self {
        let mut registry = CategoryRegistry::new();
        for (label, parent) in SKELETON {
            registry.register(label, parent);
        }
        registry
    }

    /// Set (or overwrite) the parent of a label
    pub fn register(&mut self, label: &str, parent: &str) {
        self.parents.insert(label.to_string(), parent.to_string());
    }

    pub fn contains(&self, label: &str) -> bool {
        self.parents.contains_key(label)
    }

    pub fn count(&self) -> usize {
        self.parents.len()
    }

    /// Registered parent, without inference
    pub fn lookup(&self, label: &str) -> Option<&str> {
        self.parents.get(label).map(String::as_str)
    }

    /// Guess a parent from the label's wording; empty when nothing matches
    pub fn infer_parent(label: &str) -> String {
        let inferred = if EQUITY_LABEL.is_match(label) {
            labels::EQUITY
        } else if BOND_LABEL.is_match(label) {
            labels::BOND
        } else if REIT_LABEL.is_match(label) {
            labels::OTHER_RISK_ASSET
        } else if OTHER_RISK_LABEL.is_match(label) {
            labels::OTHER_RISK_ASSET
        } else {
            ""
        };

        // A label never becomes its own parent
        if inferred == label {
            String::new()
        } else {
            inferred.to_string()
        }
    }

    /// Registered parent, inferring and caching it on a miss
    pub fn resolve_parent(&mut self, label: &str) -> String {
        if let Some(parent) = self.lookup(label) {
            return parent.to_string();
        }

        let parent = Self::infer_parent(label);
        self.register(label, &parent);
        parent
    }

    /// Parent without mutating the registry
    pub fn parent_of(&self, label: &str) -> String {
        match self.lookup(label) {
            Some(parent) => parent.to_string(),
            None => Self::infer_parent(label),
        }
    }

    /// Ancestors of a label, nearest first, ending at the root
    pub fn path(&self, label: &str) -> Vec<String> {
        let mut path = Vec::new();
        let mut visited = HashSet::new();
        visited.insert(label.to_string());

        let mut current = self.parent_of(label);
        while !current.is_empty() {
            if !visited.insert(current.clone()) {
                warn!(label, at = %current, "cycle in taxonomy parents");
                break;
            }
            let next = self.parent_of(&current);
            path.push(current);
            current = next;
        }

        path
    }

    /// Display colour: own colour, else the nearest ancestor's, else neutral
    pub fn color_of(&self, label: &str) -> &'static str {
        let mut visited = HashSet::new();
        let mut current = label.to_string();

        while !current.is_empty() {
            if let Some(color) = own_color(&current) {
                return color;
            }
            if !visited.insert(current.clone()) {
                warn!(label, at = %current, "cycle in taxonomy parents");
                break;
            }
            current = self.parent_of(&current);
        }

        colors::NEUTRAL
    }
}

// ============================================================================
// TESTS
// ============================================================================
