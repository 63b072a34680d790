// Portfolio Sunburst - Core Library
// Exposes all modules for use in the CLI, the chart server, and tests

pub mod error;
pub mod normalize;
pub mod parser;      // Row Extractor + table loaders
pub mod rules;       // Genre Classifier
pub mod taxonomy;    // Parent map, skeleton, colours
pub mod aggregation; // Aggregation Tree
pub mod chart;       // Chart Data Adapter
pub mod report;
pub mod settings;

// Re-export commonly used types
pub use error::{PortfolioError, Result};
pub use normalize::{format_thousands, normalize_width, parse_amount};
pub use parser::{
    ColumnRole, Holding, RawHolding, SourceCategory, SourceTable, TableParser, TableRow,
    load_tables, load_tables_csv, load_tables_json,
};
pub use rules::{GenreClassifier, GenreRule};
pub use taxonomy::{labels, CategoryRegistry};
pub use aggregation::{AssetTree, CategoryNode, DisplayNode, ProfitRate};
pub use chart::{ChartDocument, Layout, PlotConfig, SunburstTrace};
pub use report::{classify_tables, PortfolioReport};
pub use settings::Settings;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
