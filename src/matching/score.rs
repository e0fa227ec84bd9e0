//! Ratio and score arithmetic. Everything here is a pure function of its inputs.

/// Lower bound of the "exceeds recommended" tier
pub const RECOMMENDED_RATIO: f64 = 1.0;

/// Lower bound of the "near recommended" tier
pub const NEAR_RATIO: f64 = 0.8;

/// Per-resource ratios against the recommended tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceRatios {
    pub cpu: f64,
    pub gpu: f64,
    pub ram: f64,
    pub vram: f64,
}

impl ResourceRatios {
    /// Bottleneck ratio: the system is only as good as its weakest resource
    pub fn performance_ratio(&self) -> f64 {
        self.cpu.min(self.gpu).min(self.ram).min(self.vram)
    }
}

/// `user / recommended` for a benchmark score, or 1.0 when the user left the component out
pub fn benchmark_ratio(user_score: Option<u32>, recommended_score: u32) -> f64 {
    match user_score {
        Some(score) => f64::from(score) / f64::from(recommended_score),
        None => 1.0,
    }
}

/// `user / recommended` for a memory amount
pub fn memory_ratio(user_amount: f64, recommended_amount: f64) -> f64 {
    user_amount / recommended_amount
}

/// Map a performance ratio onto the three ranking tiers:
/// `>= 2` exceeds recommended, `[1.8, 2)` near recommended, `< 0.8` minimum only.
pub fn tier_score(performance_ratio: f64) -> f64 {
    if performance_ratio >= RECOMMENDED_RATIO {
        2.0 + (performance_ratio - 1.0) * 0.5
    } else if performance_ratio >= NEAR_RATIO {
        1.0 + performance_ratio
    } else {
        performance_ratio
    }
}
