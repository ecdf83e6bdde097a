use academy_core::{Bar, IndicatorSeries};

/// Close prices of a bar sequence
pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Simple Moving Average over raw values, aligned with `data`
pub fn sma_values(data: &[f64], period: usize) -> IndicatorSeries {
    let mut result = vec![None; data.len()];
    if period == 0 || data.len() < period {
        return result;
    }

    for i in period - 1..data.len() {
        let sum: f64 = data[i + 1 - period..=i].iter().sum();
        result[i] = Some(sum / period as f64);
    }
    result
}

/// Simple Moving Average of closes
pub fn sma(bars: &[Bar], period: usize) -> IndicatorSeries {
    sma_values(&closes(bars), period)
}

/// Bollinger Bands
#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub upper: IndicatorSeries,
    pub middle: IndicatorSeries,
    pub lower: IndicatorSeries,
}

impl BollingerBands {
    pub const DEFAULT_PERIOD: usize = 20;
    pub const DEFAULT_MULTIPLIER: f64 = 2.0;

    pub fn len(&self) -> usize {
        self.middle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middle.is_empty()
    }

    /// upper - lower at `i`, if defined
    pub fn width(&self, i: usize) -> Option<f64> {
        match (self.upper.get(i).copied().flatten(), self.lower.get(i).copied().flatten()) {
            (Some(u), Some(l)) => Some(u - l),
            _ => None,
        }
    }
}

/// Population variance of each trailing window around its own mean
pub fn rolling_variance(data: &[f64], period: usize) -> IndicatorSeries {
    let means = sma_values(data, period);
    means
        .iter()
        .enumerate()
        .map(|(i, mean)| {
            mean.map(|mean| {
                let slice = &data[i + 1 - period..=i];
                slice.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / period as f64
            })
        })
        .collect()
}

pub fn bollinger_bands(bars: &[Bar], period: usize, multiplier: f64) -> BollingerBands {
    let data = closes(bars);
    let middle = sma_values(&data, period);
    let variance = rolling_variance(&data, period);

    let mut upper = Vec::with_capacity(middle.len());
    let mut lower = Vec::with_capacity(middle.len());

    for (mean, var) in middle.iter().zip(&variance) {
        match (mean, var) {
            (Some(mean), Some(var)) => {
                let std = var.sqrt();
                upper.push(Some(mean + multiplier * std));
                lower.push(Some(mean - multiplier * std));
            }
            _ => {
                upper.push(None);
                lower.push(None);
            }
        }
    }

    BollingerBands {
        upper,
        middle,
        lower,
    }
}

pub const DEFAULT_RSI_PERIOD: usize = 14;

/// RSI from summed gains and losses over one window.
///
/// No losses reads as 100; a window with no movement at all reads as a
/// neutral 50.
fn rsi_from_sums(gains: f64, losses: f64) -> f64 {
    if losses == 0.0 {
        return if gains == 0.0 { 50.0 } else { 100.0 };
    }
    let rs = gains / losses;
    100.0 - (100.0 / (1.0 + rs))
}

/// Relative Strength Index over the trailing `period` close-to-close changes.
///
/// Uses plain sums per window (not Wilder smoothing). The first `period`
/// positions are `None`.
pub fn rsi(bars: &[Bar], period: usize) -> IndicatorSeries {
    let data = closes(bars);
    let mut result = vec![None; data.len()];
    if period == 0 || data.len() < period + 1 {
        return result;
    }

    for i in period..data.len() {
        let mut gains = 0.0;
        let mut losses = 0.0;

        for j in i + 1 - period..=i {
            let change = data[j] - data[j - 1];
            if change > 0.0 {
                gains += change;
            } else {
                losses -= change;
            }
        }

        result[i] = Some(rsi_from_sums(gains, losses));
    }

    result
}

/// Number of leading `None` entries
pub fn warmup_len(series: &[Option<f64>]) -> usize {
    series.iter().take_while(|v| v.is_none()).count()
}

/// Last defined value
pub fn last_value(series: &[Option<f64>]) -> Option<f64> {
    series.iter().rev().find_map(|v| *v)
}
