//! Shared configuration, colors, constant tags and helpers.
//!
//! # Invariants
//! - Configuration is passed explicitly; nothing here is global or mutable.
//! - Randomness is seeded and reproducible.

pub mod config;
pub mod constants;
pub mod helpers;
pub mod types;

pub use config::{
    BalanceConfig, CameraConfig, CanvasConfig, ColorPalette, ConfigError, DebugConfig,
    GameConfig, GridConfig, PerformanceConfig, ScaleMode, SpeedConfig, ZIndex,
};
pub use helpers::Rng;
pub use types::{Color, ColorParseError};

pub fn crate_info() -> &'static str {
    "pvz-common v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("common"));
    }
}
