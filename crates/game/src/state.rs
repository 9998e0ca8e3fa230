use pvz_common::BalanceConfig;
use serde::{Deserialize, Serialize};

/// Player-facing game state.
///
/// Only `is_playing` and `is_paused` change during a session; the balance
/// numbers are carried for the HUD and future gameplay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub budget: u32,
    pub base_health: u32,
    pub wave: u32,
    pub max_waves: u32,
    pub is_playing: bool,
    pub is_paused: bool,
}

impl GameState {
    pub fn new(balance: &BalanceConfig) -> Self {
        Self {
            budget: balance.initial_budget,
            base_health: balance.base_health,
            wave: 1,
            max_waves: balance.max_waves,
            is_playing: false,
            is_paused: false,
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(&BalanceConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_from_balance_numbers() {
        let state = GameState::default();
        assert_eq!(state.budget, 200);
        assert_eq!(state.base_health, 100);
        assert_eq!(state.wave, 1);
        assert_eq!(state.max_waves, 5);
        assert!(!state.is_playing);
        assert!(!state.is_paused);
    }

    #[test]
    fn serializes_with_field_names() {
        let json = serde_json::to_value(GameState::default()).unwrap();
        assert_eq!(json["base_health"], 100);
        assert_eq!(json["is_paused"], false);
    }
}
