//! Chart payload for the candlestick renderer.
//!
//! The renderer takes one candlestick series (`[open, close, low, high]` per
//! bar) and any number of line overlays aligned to the same x-axis. Indicator
//! output plugs in directly as an overlay.

use academy_core::{AcademyError, Bar, IndicatorSeries};
use serde::{Deserialize, Serialize};

use crate::indicators::*;

pub const SMA_COLORS: [&str; 4] = ["#fbbf24", "#8b5cf6", "#38bdf8", "#f472b6"];
pub const BAND_COLOR: &str = "#6b7280";
pub const RSI_COLOR: &str = "#f59e0b";
pub const SUPPORT_COLOR: &str = "#10b981";
pub const RESISTANCE_COLOR: &str = "#ef4444";
pub const HIGHLIGHT_COLOR: &str = "rgba(251, 191, 36, 0.2)";

/// A named line aligned with the candles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    pub name: String,
    pub color: String,
    pub values: IndicatorSeries,
}

impl Overlay {
    pub fn new(name: impl Into<String>, color: impl Into<String>, values: IndicatorSeries) -> Self {
        Self { name: name.into(), color: color.into(), values }
    }
}

/// Horizontal price level (support / resistance)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub name: String,
    pub value: f64,
    pub color: String,
}

impl Level {
    pub fn support(name: impl Into<String>, value: f64) -> Self {
        Self { name: name.into(), value, color: SUPPORT_COLOR.to_string() }
    }

    pub fn resistance(name: impl Into<String>, value: f64) -> Self {
        Self { name: name.into(), value, color: RESISTANCE_COLOR.to_string() }
    }
}

/// Shaded bar range, inclusive on both ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    pub start: usize,
    pub end: usize,
    pub color: String,
}

/// Which indicators the analysis chart carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSettings {
    pub title: String,
    pub sma_periods: Vec<usize>,
    pub bollinger_period: usize,
    pub bollinger_multiplier: f64,
    pub rsi_period: usize,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            title: "EUR/USD - Technical Analysis".to_string(),
            sma_periods: vec![20, 50],
            bollinger_period: BollingerBands::DEFAULT_PERIOD,
            bollinger_multiplier: BollingerBands::DEFAULT_MULTIPLIER,
            rsi_period: DEFAULT_RSI_PERIOD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPayload {
    pub title: String,
    /// x-axis labels, one per candle (empty string when the bar is undated)
    pub labels: Vec<String>,
    /// `[open, close, low, high]`
    pub candles: Vec<[f64; 4]>,
    pub overlays: Vec<Overlay>,
    /// Bounded 0-100 series drawn on their own axis
    pub oscillators: Vec<Overlay>,
    pub levels: Vec<Level>,
    pub highlights: Vec<Highlight>,
}

impl ChartPayload {
    /// Candlesticks only
    pub fn new(title: impl Into<String>, bars: &[Bar]) -> Self {
        Self {
            title: title.into(),
            labels: bars
                .iter()
                .map(|b| b.date.map(|d| d.to_string()).unwrap_or_default())
                .collect(),
            candles: bars.iter().map(|b| [b.open, b.close, b.low, b.high]).collect(),
            overlays: Vec::new(),
            oscillators: Vec::new(),
            levels: Vec::new(),
            highlights: Vec::new(),
        }
    }

    /// Candlesticks with SMA, Bollinger and RSI series per `settings`
    pub fn analysis(bars: &[Bar], settings: &ChartSettings) -> Result<Self, AcademyError> {
        let mut chart = Self::new(settings.title.clone(), bars);

        for (i, &period) in settings.sma_periods.iter().enumerate() {
            let color = SMA_COLORS[i % SMA_COLORS.len()];
            chart.add_overlay(Overlay::new(format!("SMA {}", period), color, sma(bars, period)))?;
        }

        let bb = bollinger_bands(bars, settings.bollinger_period, settings.bollinger_multiplier);
        chart.add_overlay(Overlay::new("BB Upper", BAND_COLOR, bb.upper))?;
        chart.add_overlay(Overlay::new("BB Lower", BAND_COLOR, bb.lower))?;

        let rsi_name = format!("RSI {}", settings.rsi_period);
        chart.add_oscillator(Overlay::new(rsi_name, RSI_COLOR, rsi(bars, settings.rsi_period)))?;

        tracing::debug!(
            "Built analysis chart '{}': {} candles, {} overlays",
            chart.title,
            chart.candles.len(),
            chart.overlays.len()
        );
        Ok(chart)
    }

    fn check_aligned(&self, overlay: &Overlay) -> Result<(), AcademyError> {
        if overlay.values.len() != self.candles.len() {
            return Err(AcademyError::InvalidChart(format!(
                "overlay '{}' has {} values for {} candles",
                overlay.name,
                overlay.values.len(),
                self.candles.len()
            )));
        }
        Ok(())
    }

    pub fn add_overlay(&mut self, overlay: Overlay) -> Result<(), AcademyError> {
        self.check_aligned(&overlay)?;
        self.overlays.push(overlay);
        Ok(())
    }

    pub fn add_oscillator(&mut self, overlay: Overlay) -> Result<(), AcademyError> {
        self.check_aligned(&overlay)?;
        self.oscillators.push(overlay);
        Ok(())
    }

    /// Add horizontal price levels. Non-finite prices are rejected and none
    /// of the batch is added.
    pub fn add_levels(&mut self, levels: impl IntoIterator<Item = Level>) -> Result<(), AcademyError> {
        let levels: Vec<Level> = levels.into_iter().collect();
        if let Some(bad) = levels.iter().find(|l| !l.value.is_finite()) {
            return Err(AcademyError::InvalidChart(format!(
                "level '{}' has non-finite price {}",
                bad.name, bad.value
            )));
        }
        self.levels.extend(levels);
        Ok(())
    }

    pub fn highlight(&mut self, start: usize, end: usize, color: Option<&str>) -> Result<(), AcademyError> {
        if start > end || end >= self.candles.len() {
            return Err(AcademyError::InvalidChart(format!(
                "highlight {}..={} outside 0..{}",
                start,
                end,
                self.candles.len()
            )));
        }
        self.highlights.push(Highlight {
            start,
            end,
            color: color.unwrap_or(HIGHLIGHT_COLOR).to_string(),
        });
        Ok(())
    }

    pub fn overlay(&self, name: &str) -> Option<&Overlay> {
        self.overlays.iter().chain(&self.oscillators).find(|o| o.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bars(n: usize) -> Vec<Bar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..n)
            .map(|i| {
                let c = 1.10 + 0.001 * i as f64;
                Bar::new(c - 0.0005, c + 0.001, c - 0.001, c)
                    .with_date(start + chrono::Duration::days(i as i64))
            })
            .collect()
    }

    #[test]
    fn test_candles_use_open_close_low_high_order() {
        let bar = Bar::new(1.0, 4.0, 0.5, 2.0);
        let chart = ChartPayload::new("t", &[bar]);

        assert_eq!(chart.candles, vec![[1.0, 2.0, 0.5, 4.0]]);
        assert_eq!(chart.labels, vec![String::new()]);
    }

    #[test]
    fn test_analysis_chart_series_aligned() {
        let bars = bars(60);
        let chart = ChartPayload::analysis(&bars, &ChartSettings::default()).unwrap();

        assert_eq!(chart.labels[0], "2024-01-01");
        assert_eq!(chart.overlays.len(), 4);
        for overlay in chart.overlays.iter().chain(&chart.oscillators) {
            assert_eq!(overlay.values.len(), 60);
        }

        let sma50 = chart.overlay("SMA 50").unwrap();
        assert_eq!(warmup_len(&sma50.values), 49);
        assert_eq!(sma50.color, "#8b5cf6");
        assert!(chart.overlay("RSI 14").is_some());
    }

    #[test]
    fn test_misaligned_overlay_rejected() {
        let mut chart = ChartPayload::new("t", &bars(5));
        let err = chart.add_overlay(Overlay::new("bad", "#fff", vec![None; 4])).unwrap_err();

        assert!(matches!(err, AcademyError::InvalidChart(_)));
        assert!(chart.overlays.is_empty());
    }

    #[test]
    fn test_highlight_bounds() {
        let mut chart = ChartPayload::new("t", &bars(10));

        assert!(chart.highlight(2, 5, None).is_ok());
        assert_eq!(chart.highlights[0].color, HIGHLIGHT_COLOR);
        assert!(chart.highlight(5, 2, None).is_err());
        assert!(chart.highlight(8, 10, Some("red")).is_err());
    }

    #[test]
    fn test_non_finite_level_rejected() {
        let mut chart = ChartPayload::new("t", &bars(10));

        let err = chart
            .add_levels([Level::support("Support 1", 1.175), Level::resistance("Broken", f64::NAN)])
            .unwrap_err();
        assert!(matches!(err, AcademyError::InvalidChart(_)));
        assert!(chart.levels.is_empty());

        assert!(chart.add_levels([Level::support("Far", f64::INFINITY)]).is_err());
        assert!(chart.add_levels([Level::support("Support 1", 1.175)]).is_ok());
        assert_eq!(chart.levels.len(), 1);
    }

    #[test]
    fn test_payload_serializes_absent_as_null() {
        let mut chart = ChartPayload::new("t", &bars(3));
        chart.add_overlay(Overlay::new("SMA 2", "#fbbf24", sma(&bars(3), 2))).unwrap();
        chart
            .add_levels([Level::support("Support 1", 1.175), Level::resistance("Resistance 1", 1.19)])
            .unwrap();

        let json = serde_json::to_value(&chart).unwrap();
        assert!(json["overlays"][0]["values"][0].is_null());
        assert!(json["overlays"][0]["values"][1].is_number());
        assert_eq!(json["levels"][1]["color"], RESISTANCE_COLOR);
    }
}
