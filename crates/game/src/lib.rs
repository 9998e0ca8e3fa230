//! Game orchestration: state, entity collections and their wiring onto the
//! fixed-timestep loop and the layered renderer.
//!
//! # Invariants
//! - Entity updates run in a fixed order: demo objects, units, zombies,
//!   projectiles, effects. Rendering uses the same order.
//! - Dead entities are removed at the end of each update tick; survivors keep
//!   their relative order.
//! - Configuration is passed in at construction; nothing reads global state.

pub mod demo;
pub mod entity;
pub mod game;
pub mod input;
pub mod state;

pub use entity::{DemoSquare, Effect, Projectile, Steppable, Unit, Zombie};
pub use game::{Game, GameError, Scene};
pub use input::InputAction;
pub use state::GameState;

pub fn crate_info() -> &'static str {
    "pvz-game v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("game"));
    }
}
