//! Type tags for entities, states and game events.
//!
//! Only the tag vocabulary lives here; gameplay systems that branch on these
//! tags are built on top.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! tag_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $tag:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Stable lowercase tag, identical to the serialized form.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $tag),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

tag_enum! {
    /// Facing / travel direction on the grid.
    Direction {
        Left => "left",
        Right => "right",
        Up => "up",
        Down => "down",
    }
}

tag_enum! {
    /// Animation / behaviour state of an entity.
    EntityState {
        Idle => "idle",
        Walk => "walk",
        Run => "run",
        Attack => "attack",
        Shoot => "shoot",
        Reload => "reload",
        Death => "death",
        Disabled => "disabled",
    }
}

tag_enum! {
    /// Placeable player units: police, defenses and equipment.
    UnitType {
        Patrol => "patrol",
        Swat => "swat",
        Sniper => "sniper",
        Flamethrower => "flamethrower",
        Dispatcher => "dispatcher",
        Medic => "medic",
        K9 => "k9",
        Helicopter => "helicopter",
        Barricade => "barricade",
        PoliceCar => "police_car",
        ArmoredVehicle => "armored_vehicle",
        Flashbang => "flashbang",
        Claymore => "claymore",
        ElectricFence => "electric_fence",
    }
}

impl UnitType {
    /// Static defenses and equipment, as opposed to police officers.
    pub fn is_defense(&self) -> bool {
        matches!(
            self,
            UnitType::Barricade
                | UnitType::PoliceCar
                | UnitType::ArmoredVehicle
                | UnitType::Flashbang
                | UnitType::Claymore
                | UnitType::ElectricFence
        )
    }
}

tag_enum! {
    ZombieType {
        Basic => "basic",
        Helmet => "helmet",
        Biker => "biker",
        Shield => "shield",
        Sprinter => "sprinter",
        Tank => "tank",
        Bomber => "bomber",
        Armored => "armored",
        Boss => "boss",
    }
}

tag_enum! {
    ProjectileType {
        Bullet => "bullet",
        SniperBullet => "sniper_bullet",
        FireStream => "fire_stream",
        ElectricArc => "electric_arc",
    }
}

tag_enum! {
    EffectType {
        Explosion => "explosion",
        Blood => "blood",
        MuzzleFlash => "muzzle_flash",
        Smoke => "smoke",
        Fire => "fire",
        Electric => "electric",
        Heal => "heal",
    }
}

tag_enum! {
    /// Names of game-level events.
    GameEvent {
        UnitPlaced => "unit_placed",
        UnitDestroyed => "unit_destroyed",
        ZombieSpawned => "zombie_spawned",
        ZombieKilled => "zombie_killed",
        WaveStart => "wave_start",
        WaveComplete => "wave_complete",
        LevelWin => "level_win",
        LevelLose => "level_lose",
        BudgetChanged => "budget_changed",
        HealthChanged => "health_changed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_match_serde_names() {
        for unit in UnitType::ALL {
            let json = serde_json::to_string(unit).unwrap();
            assert_eq!(json, format!("\"{}\"", unit.as_str()));
        }
        for event in GameEvent::ALL {
            let json = serde_json::to_string(event).unwrap();
            assert_eq!(json, format!("\"{event}\""));
        }
    }

    #[test]
    fn multi_word_tags() {
        assert_eq!(UnitType::PoliceCar.as_str(), "police_car");
        assert_eq!(ProjectileType::SniperBullet.as_str(), "sniper_bullet");
        let parsed: EffectType = serde_json::from_str("\"muzzle_flash\"").unwrap();
        assert_eq!(parsed, EffectType::MuzzleFlash);
    }

    #[test]
    fn defense_split() {
        assert!(UnitType::Barricade.is_defense());
        assert!(!UnitType::Swat.is_defense());
    }

    #[test]
    fn vocabulary_sizes() {
        assert_eq!(UnitType::ALL.len(), 14);
        assert_eq!(ZombieType::ALL.len(), 9);
        assert_eq!(EntityState::ALL.len(), 8);
        assert_eq!(Direction::ALL.len(), 4);
    }
}
