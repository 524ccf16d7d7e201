// =============================================================================
// Candlestick + volume renderer
// =============================================================================
//
// Plots the most recent CHART_WINDOW hourly candles as two stacked panels that
// share the time axis:
//
//   ┌──────────────────────────┐  yaxis  (70 %)  candlesticks
//   ├──────────────────────────┤  yaxis2 (30 %)  volume bars, green/red
//   └──────────────────────────┘
//
// Dark theme, fixed 1200x800 canvas, no legend, no range slider.
// =============================================================================

use tracing::debug;

use crate::chart::figure::{
    Axis, BarTrace, CandlestickTrace, Figure, Font, Layout, Marker, RangeSlider, Trace,
};
use crate::error::ChartError;
use crate::market_data::Candle;

/// Trailing window: 7 days of 1h candles.
pub const CHART_WINDOW: usize = 168;

const CANVAS_WIDTH: u32 = 1200;
const CANVAS_HEIGHT: u32 = 800;
const PRICE_PANEL_SHARE: f64 = 0.7;
const VERTICAL_SPACING: f64 = 0.01;
const VOLUME_OPACITY: f64 = 0.6;
const GRID_COLOR: &str = "lightgrey";
const BACKGROUND: &str = "#000000";

/// Direction of one bucket. A flat candle (close == open) counts as bearish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Bullish,
    Bearish,
}

impl Direction {
    pub fn of(candle: &Candle) -> Self {
        if candle.close > candle.open {
            Self::Bullish
        } else {
            Self::Bearish
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Self::Bullish => "green",
            Self::Bearish => "red",
        }
    }
}

/// The trailing `CHART_WINDOW` candles, or all of them if there are fewer.
pub fn window(candles: &[Candle]) -> &[Candle] {
    &candles[candles.len().saturating_sub(CHART_WINDOW)..]
}

/// Build the two-panel figure for `candles` (ascending by time).
pub fn plot_candles(candles: &[Candle]) -> Result<Figure, ChartError> {
    let offset = candles.len().saturating_sub(CHART_WINDOW);
    let data = window(candles);
    validate(data, offset)?;

    let x: Vec<_> = data.iter().map(|c| c.timestamp).collect();
    let colors: Vec<&'static str> = data.iter().map(|c| Direction::of(c).color()).collect();

    let price = CandlestickTrace {
        x: x.clone(),
        open: data.iter().map(|c| c.open).collect(),
        high: data.iter().map(|c| c.high).collect(),
        low: data.iter().map(|c| c.low).collect(),
        close: data.iter().map(|c| c.close).collect(),
        xaxis: "x",
        yaxis: "y",
    };

    let volume = BarTrace {
        x,
        y: data.iter().map(|c| c.volume).collect(),
        name: "Volume",
        marker: Marker {
            color: colors,
            opacity: VOLUME_OPACITY,
        },
        xaxis: "x2",
        yaxis: "y2",
    };

    debug!(
        input = candles.len(),
        plotted = data.len(),
        "candlestick figure built"
    );

    Ok(Figure {
        data: vec![Trace::Candlestick(price), Trace::Bar(volume)],
        layout: dark_layout(),
    })
}

/// Fail fast on input that would produce a misleading chart. `offset` maps
/// window positions back to indices in the caller's slice.
fn validate(data: &[Candle], offset: usize) -> Result<(), ChartError> {
    if data.is_empty() {
        return Err(ChartError::EmptySeries);
    }

    for (i, c) in data.iter().enumerate() {
        let fields = [
            ("open", c.open),
            ("high", c.high),
            ("low", c.low),
            ("close", c.close),
            ("volume", c.volume),
        ];
        if let Some((field, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ChartError::NonFinite {
                index: offset + i,
                field: *field,
            });
        }
    }

    if let Some(pos) = data.windows(2).position(|w| w[1].timestamp <= w[0].timestamp) {
        return Err(ChartError::Unordered {
            index: offset + pos + 1,
        });
    }

    Ok(())
}

fn dark_layout() -> Layout {
    // Row heights share what is left after the gap between panels.
    let usable = 1.0 - VERTICAL_SPACING;
    let volume_top = usable * (1.0 - PRICE_PANEL_SHARE);
    let price_bottom = volume_top + VERTICAL_SPACING;

    Layout {
        width: CANVAS_WIDTH,
        height: CANVAS_HEIGHT,
        showlegend: false,
        paper_bgcolor: BACKGROUND,
        plot_bgcolor: BACKGROUND,
        font: Font { color: "white" },
        xaxis: Axis {
            anchor: "y",
            domain: [0.0, 1.0],
            matches: Some("x2"),
            showticklabels: Some(false),
            rangeslider: Some(RangeSlider { visible: false }),
            ..grid_axis()
        },
        yaxis: Axis {
            anchor: "x",
            domain: [price_bottom, 1.0],
            ..grid_axis()
        },
        xaxis2: Axis {
            anchor: "y2",
            domain: [0.0, 1.0],
            ..grid_axis()
        },
        yaxis2: Axis {
            anchor: "x2",
            domain: [0.0, volume_top],
            ..grid_axis()
        },
    }
}

fn grid_axis() -> Axis {
    Axis {
        gridcolor: Some(GRID_COLOR),
        gridwidth: Some(1),
        ..Axis::default()
    }
}
