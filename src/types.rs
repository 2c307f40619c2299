// =============================================================================
// Shared types used across the MBR dashboard
// =============================================================================

use serde::{Deserialize, Serialize};

/// Which way a KPI has to move to count as an improvement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HigherIsBetter => write!(f, "HigherIsBetter"),
            Self::LowerIsBetter => write!(f, "LowerIsBetter"),
        }
    }
}

/// Red / Amber / Green status of a KPI against its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rag {
    Green,
    Amber,
    Red,
}

impl Rag {
    /// Traffic-light glyph used by the console table.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Green => "🟢",
            Self::Amber => "🟠",
            Self::Red => "🔴",
        }
    }
}

impl std::fmt::Display for Rag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Green => write!(f, "Green"),
            Self::Amber => write!(f, "Amber"),
            Self::Red => write!(f, "Red"),
        }
    }
}

/// Severity of a risk narrative banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "ERROR"),
            Self::Warning => write!(f, "WARNING"),
        }
    }
}

/// Round `value` to `decimals` places, half away from zero.
pub fn round_dp(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_dp_basic() {
        assert_eq!(round_dp(8.333_333, 2), 8.33);
        assert_eq!(round_dp(-0.201_005, 2), -0.2);
        assert_eq!(round_dp(23.96, 1), 24.0);
        assert_eq!(round_dp(0.0, 2), 0.0);
    }

    #[test]
    fn rag_symbols_are_distinct() {
        assert_ne!(Rag::Green.symbol(), Rag::Amber.symbol());
        assert_ne!(Rag::Amber.symbol(), Rag::Red.symbol());
        assert_eq!(Rag::Red.to_string(), "Red");
    }
}
