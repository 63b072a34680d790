// 🏷️ Genre Classification Rules - Rules as Data
// Ordered pattern tables mapping instrument names to asset-class genres

use crate::parser::{RawHolding, SourceCategory};
use crate::taxonomy::labels;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

// ============================================================================
// NAME PATTERNS
// ============================================================================

fn pattern(expr: &str) -> Regex {
    Regex::new(expr).expect("genre pattern must compile")
}

static DOLLAR: Lazy<Regex> = Lazy::new(|| pattern(r"ドル|(?i:usd|dollar)"));
static MMF: Lazy<Regex> =
    Lazy::new(|| pattern(r"マネー.*マーケット.*ファンド|MMF|(?i:money.*market)"));
static INSURANCE: Lazy<Regex> = Lazy::new(|| pattern(r"保険|(?i:insurance)"));

static WORLD: Lazy<Regex> = Lazy::new(|| pattern(r"世界|(?i:world|global|all.country)"));
static DEVELOPED: Lazy<Regex> =
    Lazy::new(|| pattern(r"先進|米国|外国|S&P|(?i:developed|foreign)"));
static EMERGING: Lazy<Regex> = Lazy::new(|| pattern(r"新興|(?i:emerging)"));
static DOMESTIC: Lazy<Regex> = Lazy::new(|| pattern(r"国内|日本|TOPIX|日経|(?i:japan|nikkei)"));

static EQUITY: Lazy<Regex> = Lazy::new(|| pattern(r"株|TOPIX|日経|(?i:equity|stock|nikkei)"));
static BOND: Lazy<Regex> = Lazy::new(|| pattern(r"債|(?i:bond)"));
static REIT: Lazy<Regex> = Lazy::new(|| pattern(r"REIT|リート|不動産|(?i:real.estate)"));

// ============================================================================
// RULE DEFINITION
// ============================================================================

/// GenreRule - one (pattern, label) pair of an ordered table
#[derive(Debug, Clone, Copy)]
pub struct GenreRule {
    /// Rule ID for tracing
    pub id: &'static str,
    pub pattern: &'static Lazy<Regex>,
    pub label: &'static str,
}

impl GenreRule {
    pub fn matches(&self, name: &str) -> bool {
        self.pattern.is_match(name)
    }
}

/// First matching rule wins
pub fn first_match(rules: &[GenreRule], name: &str) -> Option<&'static str> {
    rules.iter().find(|rule| rule.matches(name)).map(|rule| rule.label)
}

/// Area of a fund, evaluated top to bottom
pub static AREA_RULES: &[GenreRule] = &[
    GenreRule { id: "area-world", pattern: &WORLD, label: labels::WORLD },
    GenreRule { id: "area-developed", pattern: &DEVELOPED, label: labels::DEVELOPED },
    GenreRule { id: "area-emerging", pattern: &EMERGING, label: labels::EMERGING },
    GenreRule { id: "area-japan", pattern: &DOMESTIC, label: labels::JAPAN },
];

/// Asset class of a fund, evaluated top to bottom
pub static CLASS_RULES: &[GenreRule] = &[
    GenreRule { id: "class-equity", pattern: &EQUITY, label: labels::EQUITY },
    GenreRule { id: "class-bond", pattern: &BOND, label: labels::BOND },
    GenreRule { id: "class-reit", pattern: &REIT, label: labels::REIT },
];

static CASH_RULES: &[GenreRule] = &[GenreRule {
    id: "cash-dollar",
    pattern: &DOLLAR,
    label: labels::FOREIGN_CURRENCY,
}];

static BOND_RULES: &[GenreRule] = &[GenreRule {
    id: "bond-dollar",
    pattern: &DOLLAR,
    label: labels::US_BOND,
}];

// ============================================================================
// CLASSIFIER
// ============================================================================

/// GenreClassifier - stateless; the same holding always gets the same genre
#[derive(Debug, Clone, Copy, Default)]
pub struct GenreClassifier;

impl GenreClassifier {
    pub fn new() -> Self {
        GenreClassifier
    }

    /// Genre label for a holding taken from the given source table
    pub fn classify(&self, holding: &RawHolding, category: &SourceCategory) -> String {
        let name = holding.name.as_str();

        let genre = match category {
            SourceCategory::CashDeposit => first_match(CASH_RULES, name)
                .unwrap_or(labels::JAPANESE_YEN)
                .to_string(),
            SourceCategory::DomesticEquity => labels::JAPANESE_EQUITY.to_string(),
            SourceCategory::InvestmentTrust | SourceCategory::Pension => self.classify_fund(name),
            SourceCategory::Bond => first_match(BOND_RULES, name)
                .unwrap_or(labels::JAPANESE_BOND)
                .to_string(),
            SourceCategory::Other(_) => labels::UNKNOWN.to_string(),
        };

        debug!(name, category = category.code(), genre = %genre, "classified holding");
        genre
    }

    /// Funds and pension products: special cases first, then area + class
    fn classify_fund(&self, name: &str) -> String {
        // US dollar MMF
        if MMF.is_match(name) && DOLLAR.is_match(name) {
            return labels::FOREIGN_CURRENCY.to_string();
        }
        // Principal-guaranteed insurance products
        if INSURANCE.is_match(name) {
            return labels::JAPANESE_YEN.to_string();
        }

        let class = first_match(CLASS_RULES, name).unwrap_or(labels::OTHER_RISK_ASSET);
        match first_match(AREA_RULES, name) {
            Some(area) => format!("{} {}", area, class),
            None => class.to_string(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
