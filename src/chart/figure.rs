// =============================================================================
// Figure model — serialises to plotly.js figure JSON
// =============================================================================
//
// Only the subset of the Plotly schema the dashboard emits is modelled. Optional
// attributes are skipped when unset so the browser applies Plotly's defaults.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::Serialize;

/// `{"data": [...], "layout": {...}}`, ready for `Plotly.newPlot`.
#[derive(Debug, Clone, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl Figure {
    /// Number of distinct vertical panels the traces are drawn on.
    pub fn panel_count(&self) -> usize {
        let mut axes: Vec<&str> = self.data.iter().map(Trace::yaxis).collect();
        axes.sort_unstable();
        axes.dedup();
        axes.len()
    }

    /// Number of buckets in the candlestick trace (0 if there is none).
    pub fn candlestick_points(&self) -> usize {
        self.data
            .iter()
            .find_map(|t| match t {
                Trace::Candlestick(c) => Some(c.x.len()),
                Trace::Bar(_) => None,
            })
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Candlestick(CandlestickTrace),
    Bar(BarTrace),
}

impl Trace {
    fn yaxis(&self) -> &str {
        match self {
            Self::Candlestick(c) => c.yaxis,
            Self::Bar(b) => b.yaxis,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CandlestickTrace {
    pub x: Vec<DateTime<Utc>>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    pub xaxis: &'static str,
    pub yaxis: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct BarTrace {
    pub x: Vec<DateTime<Utc>>,
    pub y: Vec<f64>,
    pub name: &'static str,
    pub marker: Marker,
    pub xaxis: &'static str,
    pub yaxis: &'static str,
}

/// Per-bar colours with a shared opacity.
#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    pub color: Vec<&'static str>,
    pub opacity: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    pub showlegend: bool,
    pub paper_bgcolor: &'static str,
    pub plot_bgcolor: &'static str,
    pub font: Font,
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub xaxis2: Axis,
    pub yaxis2: Axis,
}

#[derive(Debug, Clone, Serialize)]
pub struct Font {
    pub color: &'static str,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Axis {
    pub anchor: &'static str,
    pub domain: [f64; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showticklabels: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rangeslider: Option<RangeSlider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gridcolor: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gridwidth: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RangeSlider {
    pub visible: bool,
}
