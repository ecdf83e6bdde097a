use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use technical_analysis::ChartSettings;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcademyConfig {
    // Content
    pub catalog_path: Option<PathBuf>,   // built-in catalog when unset
    pub progress_path: Option<PathBuf>,  // in-memory progress when unset

    // Sample chart data
    pub sample_bars: usize,              // 60
    pub sample_seed: u64,                // 42
    pub start_price: f64,                // 1.18

    // Indicators
    pub sma_periods: Vec<usize>,         // 20, 50
    pub bollinger_period: usize,         // 20
    pub bollinger_multiplier: f64,       // 2.0
    pub rsi_period: usize,               // 14
}

impl AcademyConfig {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            catalog_path: env::var("ACADEMY_CATALOG_PATH").ok().map(PathBuf::from),
            progress_path: env::var("ACADEMY_PROGRESS_PATH").ok().map(PathBuf::from),

            sample_bars: env::var("ACADEMY_SAMPLE_BARS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .context("ACADEMY_SAMPLE_BARS must be a count")?,
            sample_seed: env::var("ACADEMY_SAMPLE_SEED")
                .unwrap_or_else(|_| "42".to_string())
                .parse()
                .context("ACADEMY_SAMPLE_SEED must be an integer")?,
            start_price: env::var("ACADEMY_START_PRICE")
                .unwrap_or_else(|_| "1.18".to_string())
                .parse()
                .context("ACADEMY_START_PRICE must be a number")?,

            sma_periods: parse_periods(
                &env::var("ACADEMY_SMA_PERIODS").unwrap_or_else(|_| "20,50".to_string()),
            )?,
            bollinger_period: env::var("ACADEMY_BB_PERIOD")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .context("ACADEMY_BB_PERIOD must be a count")?,
            bollinger_multiplier: env::var("ACADEMY_BB_MULTIPLIER")
                .unwrap_or_else(|_| "2.0".to_string())
                .parse()
                .context("ACADEMY_BB_MULTIPLIER must be a number")?,
            rsi_period: env::var("ACADEMY_RSI_PERIOD")
                .unwrap_or_else(|_| "14".to_string())
                .parse()
                .context("ACADEMY_RSI_PERIOD must be a count")?,
        };

        Ok(config)
    }

    pub fn chart_settings(&self) -> ChartSettings {
        ChartSettings {
            sma_periods: self.sma_periods.clone(),
            bollinger_period: self.bollinger_period,
            bollinger_multiplier: self.bollinger_multiplier,
            rsi_period: self.rsi_period,
            ..ChartSettings::default()
        }
    }
}

/// Comma-separated list of periods, e.g. "20,50"
pub fn parse_periods(raw: &str) -> Result<Vec<usize>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<usize>().with_context(|| format!("invalid period '{}'", s)))
        .collect()
}
