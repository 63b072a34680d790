// 🏗️ Row Extractor - tokenized asset tables → holdings
//
// The external table source hands over one table per asset section of the
// portfolio page. Each table is a run of header rows (column captions) and
// data rows (cell texts); header rows decide what every later data cell
// means, positionally.

use crate::error::{PortfolioError, Result};
use crate::normalize::{normalize_width, parse_amount};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

// ============================================================================
// CORE TYPES
// ============================================================================

/// SourceCategory - which section of the portfolio page a table came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceCategory {
    CashDeposit,
    DomesticEquity,
    InvestmentTrust,
    Bond,
    Pension,
    /// Any heading the classifier has no rules for
    Other(String),
}

impl SourceCategory {
    /// Map a table heading (Japanese page heading or English alias)
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();

        match label {
            "預金・現金・暗号資産" => return SourceCategory::CashDeposit,
            "株式（現物）" | "株式(現物)" => return SourceCategory::DomesticEquity,
            "投資信託" => return SourceCategory::InvestmentTrust,
            "債券" => return SourceCategory::Bond,
            "年金" => return SourceCategory::Pension,
            _ => {}
        }

        match label.to_lowercase().as_str() {
            "cash" | "deposit" | "cash/deposit" => SourceCategory::CashDeposit,
            "equity" | "domestic equity" | "stock" => SourceCategory::DomesticEquity,
            "investment trust" | "mutual fund" | "fund" => SourceCategory::InvestmentTrust,
            "bond" => SourceCategory::Bond,
            "pension" => SourceCategory::Pension,
            _ => SourceCategory::Other(label.to_string()),
        }
    }

    /// Heading as printed on the portfolio page
    pub fn heading(&self) -> &str {
        match self {
            SourceCategory::CashDeposit => "預金・現金・暗号資産",
            SourceCategory::DomesticEquity => "株式（現物）",
            SourceCategory::InvestmentTrust => "投資信託",
            SourceCategory::Bond => "債券",
            SourceCategory::Pension => "年金",
            SourceCategory::Other(label) => label.as_str(),
        }
    }

    /// Short code for logs
    pub fn code(&self) -> &str {
        match self {
            SourceCategory::CashDeposit => "cash",
            SourceCategory::DomesticEquity => "equity",
            SourceCategory::InvestmentTrust => "trust",
            SourceCategory::Bond => "bond",
            SourceCategory::Pension => "pension",
            SourceCategory::Other(_) => "other",
        }
    }
}

/// What a table column holds, decided by its header caption
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnRole {
    Ignore,
    Amount,
    Name,
    Profit,
    Account,
}

impl ColumnRole {
    pub fn from_header(caption: &str) -> Self {
        match caption.trim() {
            "種類・名称" | "銘柄名" | "名称" | "Name" => ColumnRole::Name,
            "残高" | "評価額" | "現在価値" | "Amount" | "Balance" | "Value" => ColumnRole::Amount,
            "評価損益" | "Profit" => ColumnRole::Profit,
            "保有金融機関" | "Account" | "Institution" => ColumnRole::Account,
            _ => ColumnRole::Ignore,
        }
    }
}

/// One row of a tokenized table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "cells", rename_all = "lowercase")]
pub enum TableRow {
    Header(Vec<String>),
    Data(Vec<String>),
}

/// SourceTable - one asset section as delivered by the table source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceTable {
    /// Section heading, e.g. "投資信託"
    pub category: String,
    pub rows: Vec<TableRow>,
}

impl SourceTable {
    pub fn new(category: impl Into<String>) -> Self {
        SourceTable {
            category: category.into(),
            rows: Vec::new(),
        }
    }

    pub fn source_category(&self) -> SourceCategory {
        SourceCategory::from_label(&self.category)
    }

    /// Builder pattern: append a header row
    pub fn with_header<S: AsRef<str>>(mut self, cells: &[S]) -> Self {
        self.rows.push(TableRow::Header(to_cells(cells)));
        self
    }

    /// Builder pattern: append a data row
    pub fn with_data<S: AsRef<str>>(mut self, cells: &[S]) -> Self {
        self.rows.push(TableRow::Data(to_cells(cells)));
        self
    }
}

fn to_cells<S: AsRef<str>>(cells: &[S]) -> Vec<String> {
    cells.iter().map(|c| c.as_ref().to_string()).collect()
}

/// RawHolding - extractor output, before the classifier assigns a genre
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawHolding {
    pub account: String,
    pub name: String,
    pub amount: i64,
    pub profit: i64,
}

impl RawHolding {
    pub fn new(name: impl Into<String>, amount: i64, profit: i64) -> Self {
        RawHolding {
            name: name.into(),
            amount,
            profit,
            ..Default::default()
        }
    }

    /// Builder pattern: add the holding account
    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = account.into();
        self
    }

    /// Attach the classified genre
    pub fn into_holding(self, genre: impl Into<String>) -> Holding {
        Holding {
            account: self.account,
            name: self.name,
            amount: self.amount,
            profit: self.profit,
            genre: genre.into(),
        }
    }
}

/// Holding - one classified position; immutable once built
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    pub account: String,
    pub name: String,
    pub amount: i64,
    pub profit: i64,
    pub genre: String,
}

// ============================================================================
// TABLE PARSER
// ============================================================================

/// TableParser - walks the rows of one table keeping the active column roles
pub struct TableParser {
    label: String,
    category: SourceCategory,
    roles: Option<Vec<ColumnRole>>,
}

impl TableParser {
    pub fn new(label: &str) -> Self {
        TableParser {
            label: label.to_string(),
            category: SourceCategory::from_label(label),
            roles: None,
        }
    }

    /// Extract every holding of a table
    pub fn extract(table: &SourceTable) -> Result<Vec<RawHolding>> {
        let mut parser = TableParser::new(&table.category);
        let mut holdings = Vec::new();

        for (index, row) in table.rows.iter().enumerate() {
            if let Some(holding) = parser.parse_row(index, row)? {
                holdings.push(holding);
            }
        }

        info!(
            table = %table.category,
            category = parser.category.code(),
            holdings = holdings.len(),
            "extracted table"
        );
        Ok(holdings)
    }

    /// Column roles declared by the latest header row
    pub fn roles(&self) -> Option<&[ColumnRole]> {
        self.roles.as_deref()
    }

    /// Feed one row; header rows update the roles, data rows become holdings
    pub fn parse_row(&mut self, index: usize, row: &TableRow) -> Result<Option<RawHolding>> {
        match row {
            TableRow::Header(captions) => {
                let roles: Vec<ColumnRole> =
                    captions.iter().map(|c| ColumnRole::from_header(c)).collect();
                debug!(table = %self.label, ?roles, "header row");
                self.roles = Some(roles);
                Ok(None)
            }
            // Header-only rows nested in the table body carry no cells
            TableRow::Data(cells) if cells.is_empty() => Ok(None),
            TableRow::Data(cells) => {
                let roles = self.roles.as_ref().ok_or_else(|| PortfolioError::MissingHeader {
                    category: self.label.clone(),
                    row: index,
                })?;
                Ok(Some(self.build_holding(roles, cells)))
            }
        }
    }

    fn build_holding(&self, roles: &[ColumnRole], cells: &[String]) -> RawHolding {
        let mut holding = RawHolding::default();

        for (role, cell) in roles.iter().zip(cells) {
            match role {
                ColumnRole::Name => holding.name = normalize_width(cell.trim()),
                ColumnRole::Amount => holding.amount = parse_amount(cell),
                ColumnRole::Profit => holding.profit = parse_amount(cell),
                ColumnRole::Account => holding.account = normalize_width(cell.trim()),
                ColumnRole::Ignore => {}
            }
        }

        // Pension plans are listed without an institution
        if self.category == SourceCategory::Pension && holding.account.is_empty() {
            holding.account = self.category.heading().to_string();
        }

        holding
    }
}

// ============================================================================
// INPUT LOADERS
// ============================================================================

/// Load tables from a `.json` or `.csv` export, chosen by extension
pub fn load_tables(path: &Path) -> Result<Vec<SourceTable>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match extension.as_deref() {
        Some("json") => load_tables_json(path),
        Some("csv") => load_tables_csv(path),
        _ => Err(PortfolioError::UnsupportedInput(path.to_path_buf())),
    }
}

/// JSON format: `[{"category": "...", "rows": [{"kind": "header", "cells": [...]}]}]`
pub fn load_tables_json(path: &Path) -> Result<Vec<SourceTable>> {
    let content = fs::read_to_string(path).map_err(|source| PortfolioError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let tables: Vec<SourceTable> = serde_json::from_str(&content)?;
    Ok(tables)
}

/// CSV format: headerless records tagged by their first field
///
/// `caption,<heading>` starts a table, `th,...` is a header row and
/// `td,...` a data row of the current table.
pub fn load_tables_csv(path: &Path) -> Result<Vec<SourceTable>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut tables: Vec<SourceTable> = Vec::new();

    for (index, result) in reader.records().enumerate() {
        let record = result?;
        let line = index + 1;
        let tag = record.get(0).unwrap_or("").trim();
        let cells: Vec<String> = record.iter().skip(1).map(str::to_string).collect();

        match tag {
            "caption" => {
                let heading = cells.first().cloned().unwrap_or_default();
                tables.push(SourceTable::new(heading));
            }
            "th" | "td" => {
                let table = tables.last_mut().ok_or_else(|| PortfolioError::RowBeforeCaption {
                    line,
                    tag: tag.to_string(),
                })?;
                let row = if tag == "th" {
                    TableRow::Header(cells)
                } else {
                    TableRow::Data(cells)
                };
                table.rows.push(row);
            }
            other => {
                return Err(PortfolioError::UnknownRowTag {
                    line,
                    tag: other.to_string(),
                })
            }
        }
    }

    Ok(tables)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn trust_table() -> SourceTable {
        SourceTable::new("投資信託")
            .with_header(&["銘柄名", "保有数", "評価額", "評価損益", "保有金融機関", "取得日"])
            .with_data(&["ｅＭＡＸＩＳ　Ｓｌｉｍ　全世界株式", "1,000口", "1,200,000円", "200,000円", "ＳＢＩ証券", "2020/01/01"])
            .with_data(&["ニッセイ外国株式インデックス", "10口", "500,000円", "-20,000円", "楽天証券", ""])
    }

    #[test]
    fn test_source_category_from_heading() {
        assert_eq!(SourceCategory::from_label("預金・現金・暗号資産"), SourceCategory::CashDeposit);
        assert_eq!(SourceCategory::from_label("株式（現物）"), SourceCategory::DomesticEquity);
        assert_eq!(SourceCategory::from_label("投資信託"), SourceCategory::InvestmentTrust);
        assert_eq!(SourceCategory::from_label("債券"), SourceCategory::Bond);
        assert_eq!(SourceCategory::from_label(" 年金 "), SourceCategory::Pension);
        assert_eq!(SourceCategory::from_label("Pension"), SourceCategory::Pension);
        assert_eq!(
            SourceCategory::from_label("ポイント"),
            SourceCategory::Other("ポイント".to_string())
        );
    }

    #[test]
    fn test_column_role_from_header() {
        assert_eq!(ColumnRole::from_header("種類・名称"), ColumnRole::Name);
        assert_eq!(ColumnRole::from_header("現在価値"), ColumnRole::Amount);
        assert_eq!(ColumnRole::from_header("評価損益"), ColumnRole::Profit);
        assert_eq!(ColumnRole::from_header("保有金融機関"), ColumnRole::Account);
        assert_eq!(ColumnRole::from_header("取得日"), ColumnRole::Ignore);
    }

    #[test]
    fn test_extract_positional_columns() {
        let holdings = TableParser::extract(&trust_table()).unwrap();

        assert_eq!(holdings.len(), 2);
        assert_eq!(holdings[0].name, "eMAXIS Slim 全世界株式");
        assert_eq!(holdings[0].amount, 1_200_000);
        assert_eq!(holdings[0].profit, 200_000);
        assert_eq!(holdings[0].account, "SBI証券");
        assert_eq!(holdings[1].profit, -20_000);
    }

    #[test]
    fn test_extract_skips_empty_data_rows() {
        let table = SourceTable::new("預金・現金・暗号資産")
            .with_header(&["種類・名称", "残高", "保有金融機関"])
            .with_data::<&str>(&[])
            .with_data(&["普通預金", "10,000円", "ゆうちょ銀行"]);

        let holdings = TableParser::extract(&table).unwrap();
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].amount, 10_000);
    }

    #[test]
    fn test_extract_ignores_columns_beyond_roles() {
        let table = SourceTable::new("債券")
            .with_header(&["銘柄名", "現在価値"])
            .with_data(&["個人向け国債", "100,000円", "extra", "999"]);

        let holdings = TableParser::extract(&table).unwrap();
        assert_eq!(holdings[0], RawHolding::new("個人向け国債", 100_000, 0));
    }

    #[test]
    fn test_later_header_replaces_roles() {
        let table = SourceTable::new("投資信託")
            .with_header(&["銘柄名", "評価額"])
            .with_data(&["A", "100"])
            .with_header(&["評価額", "銘柄名"])
            .with_data(&["200", "B"]);

        let holdings = TableParser::extract(&table).unwrap();
        assert_eq!(holdings[1].name, "B");
        assert_eq!(holdings[1].amount, 200);
    }

    #[test]
    fn test_pension_account_defaults_to_heading() {
        let table = SourceTable::new("年金")
            .with_header(&["名称", "現在価値", "評価損益"])
            .with_data(&["確定拠出年金 世界株式", "300,000円", "50,000円"]);

        let holdings = TableParser::extract(&table).unwrap();
        assert_eq!(holdings[0].account, "年金");
    }

    #[test]
    fn test_data_row_before_header_fails() {
        let table = SourceTable::new("債券").with_data(&["個人向け国債", "100,000円"]);

        let err = TableParser::extract(&table).unwrap_err();
        assert!(matches!(err, PortfolioError::MissingHeader { row: 0, .. }));
    }

    #[test]
    fn test_load_tables_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[{{"category": "債券", "rows": [
                {{"kind": "header", "cells": ["銘柄名", "現在価値"]}},
                {{"kind": "data", "cells": ["米国債 (ドル建)", "50,000円"]}}
            ]}}]"#
        )
        .unwrap();

        let tables = load_tables(file.path()).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].source_category(), SourceCategory::Bond);
        assert_eq!(tables[0].rows.len(), 2);
    }

    #[test]
    fn test_load_tables_csv() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "caption,預金・現金・暗号資産").unwrap();
        writeln!(file, "th,種類・名称,残高,保有金融機関").unwrap();
        writeln!(file, "td,普通預金,\"1,000円\",みずほ銀行").unwrap();
        writeln!(file, "caption,株式（現物）").unwrap();
        writeln!(file, "th,銘柄名,評価額").unwrap();
        writeln!(file, "td,トヨタ自動車,\"250,000円\"").unwrap();
        file.flush().unwrap();

        let tables = load_tables(file.path()).unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[1].category, "株式（現物）");

        let holdings = TableParser::extract(&tables[0]).unwrap();
        assert_eq!(holdings[0].amount, 1_000);
        assert_eq!(holdings[0].account, "みずほ銀行");
    }

    #[test]
    fn test_load_tables_csv_row_before_caption() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "td,普通預金,1000").unwrap();
        file.flush().unwrap();

        let err = load_tables(file.path()).unwrap_err();
        assert!(matches!(err, PortfolioError::RowBeforeCaption { line: 1, .. }));
    }

    #[test]
    fn test_load_tables_unsupported_extension() {
        let err = load_tables(Path::new("portfolio.xlsx")).unwrap_err();
        assert!(matches!(err, PortfolioError::UnsupportedInput(_)));
    }
}
