// 📊 Aggregation Tree - classified holdings → category tree with totals
//
// Every holding contributes its amount and profit to its own leaf node and to
// each ancestor up to the root, so a node always carries the sum of the
// holdings underneath it (the "branchvalues = total" convention).

use crate::parser::Holding;
use crate::taxonomy::CategoryRegistry;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, warn};

// ============================================================================
// NODES
// ============================================================================

/// CategoryNode - one aggregation bucket (holding name, genre or grouping)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryNode {
    pub name: String,
    /// Empty for the root
    pub parent: String,
    pub amount: i64,
    pub profit: i64,
}

impl CategoryNode {
    fn new(name: &str, parent: &str) -> Self {
        CategoryNode {
            name: name.to_string(),
            parent: parent.to_string(),
            amount: 0,
            profit: 0,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_empty()
    }
}

/// Return on cost basis (`amount - profit`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "percent", rename_all = "lowercase")]
pub enum ProfitRate {
    /// Signed percentage, rounded to one decimal
    Rate(f64),
    /// Cost basis of zero
    Undefined,
}

impl ProfitRate {
    pub fn from_amounts(amount: i64, profit: i64) -> Self {
        let basis = amount - profit;
        if basis == 0 {
            ProfitRate::Undefined
        } else {
            ProfitRate::Rate(round1(profit as f64 / basis as f64 * 100.0))
        }
    }
}

impl fmt::Display for ProfitRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfitRate::Rate(rate) if *rate > 0.0 => write!(f, "+{:.1}%", rate),
            ProfitRate::Rate(rate) => write!(f, "{:.1}%", rate),
            ProfitRate::Undefined => write!(f, "n/a"),
        }
    }
}

/// DisplayNode - a node with the metrics the chart needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayNode {
    pub name: String,
    pub parent: String,
    pub amount: i64,
    pub profit: i64,
    /// Amount of the parent node, or the grand total for the root
    pub parent_amount: i64,
    /// `None` when the denominator is zero
    pub percent_of_parent: Option<f64>,
    pub percent_of_total: Option<f64>,
    pub profit_rate: ProfitRate,
    pub color: String,
}

impl DisplayNode {
    pub fn is_root(&self) -> bool {
        self.parent.is_empty()
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn percent(part: i64, whole: i64) -> Option<f64> {
    if whole == 0 {
        None
    } else {
        Some(round1(part as f64 / whole as f64 * 100.0))
    }
}

// ============================================================================
// ASSET TREE
// ============================================================================

/// AssetTree - nodes in creation order plus the taxonomy they hang from
#[derive(Debug, Clone)]
pub struct AssetTree {
    nodes: Vec<CategoryNode>,
    index: HashMap<String, usize>,
    total: i64,
    registry: CategoryRegistry,
}

impl AssetTree {
    /// Tree over the default taxonomy skeleton
    pub fn new() -> Self {
        Self::with_registry(CategoryRegistry::with_defaults())
    }

    pub fn with_registry(registry: CategoryRegistry) -> Self {
        AssetTree {
            nodes: Vec::new(),
            index: HashMap::new(),
            total: 0,
            registry,
        }
    }

    /// Tree built from a batch of holdings, in order
    pub fn from_holdings<'a, I>(holdings: I) -> Self
    where
        I: IntoIterator<Item = &'a Holding>,
    {
        let mut tree = AssetTree::new();
        for holding in holdings {
            tree.add_holding(holding);
        }
        tree
    }

    pub fn total(&self) -> i64 {
        self.total
    }

    pub fn nodes(&self) -> &[CategoryNode] {
        &self.nodes
    }

    pub fn node(&self, name: &str) -> Option<&CategoryNode> {
        self.index.get(name).map(|&i| &self.nodes[i])
    }

    pub fn registry(&self) -> &CategoryRegistry {
        &self.registry
    }

    /// Book one holding under its name, its genre and every grouping above
    pub fn add_holding(&mut self, holding: &Holding) {
        self.total += holding.amount;

        if holding.name.is_empty() {
            debug!(genre = %holding.genre, "unnamed holding booked on its genre");
            self.add_to_path(&holding.genre, holding.amount, holding.profit);
            return;
        }

        // A name equal to its genre would become its own parent
        if !self.registry.contains(&holding.name) && holding.name != holding.genre {
            self.registry.register(&holding.name, &holding.genre);
        }

        self.add_to_path(&holding.name, holding.amount, holding.profit);
    }

    /// Add amount/profit to `name` and all of its ancestors, creating nodes
    pub fn add_to_path(&mut self, name: &str, amount: i64, profit: i64) {
        let mut visited = HashSet::new();
        let mut current = name.to_string();

        loop {
            if !visited.insert(current.clone()) {
                warn!(name, at = %current, "cycle in taxonomy parents, stopping");
                break;
            }

            let parent = self.registry.resolve_parent(&current);
            let node = self.node_or_insert(&current, &parent);
            node.amount += amount;
            node.profit += profit;

            if parent.is_empty() {
                break;
            }
            current = parent;
        }
    }

    fn node_or_insert(&mut self, name: &str, parent: &str) -> &mut CategoryNode {
        let i = match self.index.get(name) {
            Some(&i) => i,
            None => {
                self.nodes.push(CategoryNode::new(name, parent));
                let i = self.nodes.len() - 1;
                self.index.insert(name.to_string(), i);
                i
            }
        };
        &mut self.nodes[i]
    }

    /// Display colour of a label, following its parents
    pub fn color_of(&self, name: &str) -> &'static str {
        self.registry.color_of(name)
    }

    /// Every node with its metrics, in creation order
    pub fn flatten(&self) -> Vec<DisplayNode> {
        self.nodes
            .iter()
            .map(|node| {
                let parent_amount = if node.is_root() {
                    self.total
                } else {
                    self.node(&node.parent)
                        .map(|p| p.amount)
                        .unwrap_or(self.total)
                };

                DisplayNode {
                    name: node.name.clone(),
                    parent: node.parent.clone(),
                    amount: node.amount,
                    profit: node.profit,
                    parent_amount,
                    percent_of_parent: percent(node.amount, parent_amount),
                    percent_of_total: percent(node.amount, self.total),
                    profit_rate: ProfitRate::from_amounts(node.amount, node.profit),
                    color: self.color_of(&node.name).to_string(),
                }
            })
            .collect()
    }
}

impl Default for AssetTree {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
