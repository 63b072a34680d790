// 🧾 Report Pipeline - tables → classified holdings → tree → chart
//
// One report per invocation: the tree is built from scratch and never
// touched again once flattened.

use crate::aggregation::{AssetTree, DisplayNode};
use crate::chart::{ChartDocument, Layout};
use crate::error::Result;
use crate::parser::{Holding, SourceTable, TableParser};
use crate::rules::GenreClassifier;
use crate::taxonomy::labels;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Extract and classify every holding of every table, in table order
pub fn classify_tables(tables: &[SourceTable]) -> Result<Vec<Holding>> {
    let classifier = GenreClassifier::new();
    let mut holdings = Vec::new();

    for table in tables {
        let category = table.source_category();
        for raw in TableParser::extract(table)? {
            let genre = classifier.classify(&raw, &category);
            holdings.push(raw.into_holding(genre));
        }
    }

    Ok(holdings)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioReport {
    pub holdings: Vec<Holding>,
    pub nodes: Vec<DisplayNode>,
    pub total: i64,
}

impl PortfolioReport {
    pub fn build(tables: &[SourceTable]) -> Result<Self> {
        let holdings = classify_tables(tables)?;
        Ok(Self::from_holdings(holdings))
    }

    pub fn from_holdings(holdings: Vec<Holding>) -> Self {
        let tree = AssetTree::from_holdings(&holdings);
        let report = PortfolioReport {
            nodes: tree.flatten(),
            total: tree.total(),
            holdings,
        };

        info!(
            holdings = report.holdings.len(),
            nodes = report.nodes.len(),
            total = report.total,
            unknown = report.unknown_count(),
            "built portfolio report"
        );
        report
    }

    /// Holdings no rule could place
    pub fn unknown_count(&self) -> usize {
        self.holdings
            .iter()
            .filter(|h| h.genre == labels::UNKNOWN)
            .count()
    }

    pub fn node(&self, name: &str) -> Option<&DisplayNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn chart(&self, layout: Layout) -> ChartDocument {
        ChartDocument::new(&self.nodes, layout)
    }

    pub fn summary(&self) -> String {
        format!(
            "Holdings: {}, Categories: {}, Total: {}, Unknown: {}",
            self.holdings.len(),
            self.nodes.len(),
            crate::normalize::format_thousands(self.total),
            self.unknown_count()
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::ProfitRate;
    use crate::error::PortfolioError;

    fn cash_table() -> SourceTable {
        SourceTable::new("預金・現金・暗号資産")
            .with_header(&["種類・名称", "残高", "保有金融機関", "変更", "削除"])
            .with_data(&["普通預金", "300円", "みずほ銀行", "", ""])
            .with_data(&["定期預金", "700円", "みずほ銀行", "", ""])
            .with_data(&["米ドル普通預金", "1,000円", "SBI新生銀行", "", ""])
    }

    fn trust_table() -> SourceTable {
        SourceTable::new("投資信託")
            .with_header(&["銘柄名", "保有数", "評価額", "評価損益", "保有金融機関"])
            .with_data(&["ｅＭＡＸＩＳ　Ｓｌｉｍ　全世界株式", "10口", "500円", "500円", "SBI証券"])
    }

    #[test]
    fn test_dollar_cash_is_foreign_currency() {
        let holdings = classify_tables(&[cash_table()]).unwrap();
        let dollar = holdings.iter().find(|h| h.name == "米ドル普通預金").unwrap();

        assert_eq!(dollar.amount, 1_000);
        assert_eq!(dollar.genre, "foreign currency");
    }

    #[test]
    fn test_world_equity_fund() {
        let report = PortfolioReport::build(&[trust_table()]).unwrap();

        assert_eq!(report.holdings[0].name, "eMAXIS Slim 全世界株式");
        assert_eq!(report.holdings[0].genre, "world equity");
        assert_eq!(report.node("world equity").unwrap().parent, "equity");
        assert_eq!(report.node("equity").unwrap().parent, "risk asset");
        assert_eq!(report.node("risk asset").unwrap().parent, "Total");
    }

    #[test]
    fn test_yen_deposits_share_a_node() {
        let report = PortfolioReport::build(&[cash_table(), trust_table()]).unwrap();
        let yen = report.node("Japanese yen").unwrap();

        assert_eq!(report.total, 2_500);
        assert_eq!(yen.amount, 1_000);
        let expected = (1_000.0 / report.total as f64 * 100.0 * 10.0).round() / 10.0;
        assert_eq!(yen.percent_of_total, Some(expected));
    }

    #[test]
    fn test_zero_cost_basis_reports_undefined_rate() {
        let report = PortfolioReport::build(&[trust_table()]).unwrap();
        let fund = report.node("eMAXIS Slim 全世界株式").unwrap();

        assert_eq!(fund.profit_rate, ProfitRate::Undefined);
        let doc = report.chart(Layout::default());
        assert!(doc.data[0].hovertext[0].ends_with("n/a"));
    }

    #[test]
    fn test_root_matches_total() {
        let report = PortfolioReport::build(&[cash_table(), trust_table()]).unwrap();
        let root = report.node("Total").unwrap();

        assert_eq!(root.amount, report.total);
        assert_eq!(root.amount, report.holdings.iter().map(|h| h.amount).sum::<i64>());
    }

    #[test]
    fn test_unknown_tables_are_counted() {
        let points = SourceTable::new("ポイント")
            .with_header(&["名称", "現在価値"])
            .with_data(&["楽天ポイント", "1,234円"]);
        let report = PortfolioReport::build(&[points, cash_table()]).unwrap();

        assert_eq!(report.unknown_count(), 1);
        assert_eq!(report.node("unknown").unwrap().amount, 1_234);
        assert_eq!(report.node("Total").unwrap().amount, report.total);
    }

    #[test]
    fn test_missing_header_aborts_report() {
        let broken = SourceTable::new("債券").with_data(&["個人向け国債", "100円"]);
        let err = PortfolioReport::build(&[cash_table(), broken]).unwrap_err();
        assert!(matches!(err, PortfolioError::MissingHeader { .. }));
    }

    #[test]
    fn test_summary() {
        let report = PortfolioReport::build(&[cash_table()]).unwrap();
        assert_eq!(
            report.summary(),
            format!("Holdings: 3, Categories: {}, Total: 2,000, Unknown: 0", report.nodes.len())
        );
    }
}
