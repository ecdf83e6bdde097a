//! Deterministic sample market data.
//!
//! There is no live feed; charts are drawn over a seeded random walk with a
//! slow sine-shaped drift so indicators have something to show.

use academy_core::Bar;
use chrono::{Duration, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub bars: usize,
    pub start_price: f64,
    pub start_date: NaiveDate,
    pub seed: u64,
    pub volatility: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            bars: 60,
            start_price: 1.18,
            start_date: Utc::now().date_naive() - Duration::days(60),
            seed: 42,
            volatility: 0.005,
        }
    }
}

/// Generate `config.bars` daily bars.
///
/// Each step moves the base price by `sin(i/10) * 0.002` plus uniform noise
/// of width `volatility`; open and close jitter around the base and the
/// wicks extend past them.
pub fn generate_bars(config: &SampleConfig) -> Vec<Bar> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut base = config.start_price;
    let mut bars = Vec::with_capacity(config.bars);

    for i in 0..config.bars {
        let trend = (i as f64 / 10.0).sin() * 0.002;
        let noise = (rng.gen::<f64>() - 0.5) * config.volatility;
        base += trend + noise;

        let open = base + (rng.gen::<f64>() - 0.5) * 0.001;
        let close = base + (rng.gen::<f64>() - 0.5) * 0.001;
        let high = open.max(close) + rng.gen::<f64>() * 0.002;
        let low = open.min(close) - rng.gen::<f64>() * 0.002;

        bars.push(Bar::new(open, high, low, close).with_date(config.start_date + Duration::days(i as i64)));
    }

    tracing::debug!("Generated {} sample bars (seed {})", bars.len(), config.seed);
    bars
}
