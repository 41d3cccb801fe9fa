//! # strategy — Pluggable decision strategies
//!
//! Every strategy maps a stream of prices to one [`Signal`] per price and
//! owns whatever history it needs. The [`StrategyEngine`] holds one
//! *primary* strategy whose signal drives trading, plus optional *shadow*
//! strategies that see the same ticks but are only logged, never merged
//! into the decision.

use std::collections::VecDeque;
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use anyhow::bail;
use tracing::debug;

use crate::models::Signal;

// ─── Strategy Capability ──────────────────────────────────────────────────────

pub trait Strategy: Send {
    fn name(&self) -> &'static str;

    /// Observe `price` and return the decision for it.
    fn evaluate(&mut self, price: f64) -> Signal;
}

// ─── Moving Average ───────────────────────────────────────────────────────────

/// Compare each price against the mean of the last `window` prices
/// (the current one included).
///
/// Keeps only the trailing window; the mean is re-summed from it on every
/// tick, never carried forward between ticks.
/// Until `window` prices have been seen the answer is always Hold.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    window: NonZeroUsize,
    recent: VecDeque<f64>,
}

impl MovingAverage {
    pub fn new(window: NonZeroUsize) -> Self {
        Self {
            window,
            recent: VecDeque::with_capacity(window.get()),
        }
    }
}

impl Strategy for MovingAverage {
    fn name(&self) -> &'static str {
        "moving_average"
    }

    fn evaluate(&mut self, price: f64) -> Signal {
        if self.recent.len() == self.window.get() {
            self.recent.pop_front();
        }
        self.recent.push_back(price);

        if self.recent.len() < self.window.get() {
            return Signal::Hold;
        }

        let mean = self.recent.iter().sum::<f64>() / self.window.get() as f64;
        Signal::from_comparison(price, mean)
    }
}

// ─── Momentum ─────────────────────────────────────────────────────────────────

/// Compare each price against the one before it.
#[derive(Debug, Clone, Default)]
pub struct Momentum {
    /// `None` until the first price arrives.
    last: Option<f64>,
}

impl Momentum {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Strategy for Momentum {
    fn name(&self) -> &'static str {
        "momentum"
    }

    fn evaluate(&mut self, price: f64) -> Signal {
        let signal = match self.last {
            Some(last) => Signal::from_comparison(price, last),
            None => Signal::Hold,
        };
        self.last = Some(price);
        signal
    }
}

// ─── Strategy Selection ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    MovingAverage,
    Momentum,
}

impl StrategyKind {
    pub fn build(self, ma_window: NonZeroUsize) -> Box<dyn Strategy> {
        match self {
            StrategyKind::MovingAverage => Box::new(MovingAverage::new(ma_window)),
            StrategyKind::Momentum => Box::new(Momentum::new()),
        }
    }

    /// The kind that is not `self`.
    pub fn other(self) -> Self {
        match self {
            StrategyKind::MovingAverage => StrategyKind::Momentum,
            StrategyKind::Momentum => StrategyKind::MovingAverage,
        }
    }
}

impl FromStr for StrategyKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "moving_average" | "ma" => Ok(StrategyKind::MovingAverage),
            "momentum" => Ok(StrategyKind::Momentum),
            other => bail!("Unknown strategy: '{other}'. Use 'moving_average' or 'momentum'"),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::MovingAverage => write!(f, "moving_average"),
            StrategyKind::Momentum => write!(f, "momentum"),
        }
    }
}

// ─── Engine ───────────────────────────────────────────────────────────────────

pub struct StrategyEngine {
    primary:     Box<dyn Strategy>,
    shadows:     Vec<Box<dyn Strategy>>,
    evaluations: u64,
}

impl StrategyEngine {
    pub fn new(primary: Box<dyn Strategy>) -> Self {
        Self {
            primary,
            shadows: Vec::new(),
            evaluations: 0,
        }
    }

    /// Add a strategy that is evaluated on every tick for comparison only.
    pub fn with_shadow(mut self, shadow: Box<dyn Strategy>) -> Self {
        self.shadows.push(shadow);
        self
    }

    pub fn primary_name(&self) -> &'static str {
        self.primary.name()
    }

    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    /// Run every strategy on `price`; only the primary's signal is returned.
    pub fn evaluate(&mut self, price: f64) -> Signal {
        self.evaluations += 1;
        let signal = self.primary.evaluate(price);

        for shadow in &mut self.shadows {
            let shadow_signal = shadow.evaluate(price);
            debug!(
                strategy = shadow.name(),
                signal   = %shadow_signal,
                primary  = %signal,
                "Shadow strategy signal"
            );
        }

        signal
    }
}
