// 🎨 Chart Data Adapter - flattened nodes → one Plotly sunburst trace
//
// Plotly wants parallel arrays (labels, parents, values, ...) rather than
// node records; field names below follow Plotly's JSON schema.

use crate::aggregation::DisplayNode;
use crate::normalize::format_thousands;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// TRACE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub size: u32,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerLine {
    pub width: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub line: MarkerLine,
    pub colors: Vec<String>,
}

/// SunburstTrace - the single trace handed to the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SunburstTrace {
    #[serde(rename = "type")]
    pub trace_type: String,
    pub labels: Vec<String>,
    pub parents: Vec<String>,
    pub values: Vec<i64>,
    pub text: Vec<String>,
    pub hovertext: Vec<String>,
    pub branchvalues: String,
    pub outsidetextfont: Font,
    pub marker: Marker,
}

impl SunburstTrace {
    pub fn from_nodes(nodes: &[DisplayNode]) -> Self {
        let mut trace = SunburstTrace {
            trace_type: "sunburst".to_string(),
            labels: Vec::with_capacity(nodes.len()),
            parents: Vec::with_capacity(nodes.len()),
            values: Vec::with_capacity(nodes.len()),
            text: Vec::with_capacity(nodes.len()),
            hovertext: Vec::with_capacity(nodes.len()),
            branchvalues: "total".to_string(),
            outsidetextfont: Font {
                size: 20,
                color: "#377eb8".to_string(),
            },
            marker: Marker {
                line: MarkerLine { width: 2 },
                colors: Vec::with_capacity(nodes.len()),
            },
        };

        for node in nodes {
            trace.labels.push(node.name.clone());
            trace.parents.push(node.parent.clone());
            trace.values.push(node.amount);
            trace.text.push(display_text(node));
            trace.hovertext.push(hover_text(node));
            trace.marker.colors.push(node.color.clone());
        }

        trace
    }
}

fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}%", v),
        None => "n/a".to_string(),
    }
}

/// `12,345<br />40.0% (12.5%)`; the root shows only its amount
pub fn display_text(node: &DisplayNode) -> String {
    let amount = format_thousands(node.amount);
    if node.is_root() {
        return amount;
    }

    format!(
        "{}<br />{} ({})",
        amount,
        format_percent(node.percent_of_parent),
        format_percent(node.percent_of_total)
    )
}

/// `40.0% (12.5%)<br />+1,234 +11.1%`; the root shows only the profit line
pub fn hover_text(node: &DisplayNode) -> String {
    let sign = if node.profit > 0 { "+" } else { "" };
    let profit = format!("{}{} {}", sign, format_thousands(node.profit), node.profit_rate);
    if node.is_root() {
        return profit;
    }

    format!(
        "{} ({})<br />{}",
        format_percent(node.percent_of_parent),
        format_percent(node.percent_of_total),
        profit
    )
}

// ============================================================================
// LAYOUT & DOCUMENT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub b: u32,
    pub t: u32,
}

/// Square plot without margins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub margin: Margin,
    pub width: u32,
    pub height: u32,
}

impl Layout {
    pub fn square(size: u32) -> Self {
        Self::sized(size, size)
    }

    pub fn sized(width: u32, height: u32) -> Self {
        Layout {
            margin: Margin { l: 0, r: 0, b: 0, t: 0 },
            width,
            height,
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        Layout::square(700)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotConfig {
    pub display_mode_bar: bool,
}

impl Default for PlotConfig {
    fn default() -> Self {
        PlotConfig {
            display_mode_bar: false,
        }
    }
}

/// ChartDocument - everything `Plotly.newPlot(el, data, layout, config)` takes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDocument {
    pub data: Vec<SunburstTrace>,
    pub layout: Layout,
    pub config: PlotConfig,
    pub generated_at: DateTime<Utc>,
}

impl ChartDocument {
    pub fn new(nodes: &[DisplayNode], layout: Layout) -> Self {
        ChartDocument {
            data: vec![SunburstTrace::from_nodes(nodes)],
            layout,
            config: PlotConfig::default(),
            generated_at: Utc::now(),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

// ============================================================================
// TESTS
// ============================================================================
