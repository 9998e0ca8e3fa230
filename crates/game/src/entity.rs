//! Entities driven by the game: demo squares, units, zombies, projectiles and
//! effects.
//!
//! Each entity moves itself and flags its own death; the game removes dead
//! entities at the end of the update tick.

use glam::Vec2;
use pvz_common::constants::{EffectType, EntityState, ProjectileType, UnitType, ZombieType};
use pvz_common::{Color, ColorPalette};
use pvz_render::Context2d;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Something the game updates every fixed step and draws every frame.
pub trait Steppable {
    /// Advance by `dt` seconds.
    fn update(&mut self, dt: f64);

    fn render(&self, ctx: &mut dyn Context2d);

    /// Dead entities are removed by the game at the end of the tick.
    fn is_dead(&self) -> bool;
}

/// Coloured square that drifts right and wraps around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoSquare {
    /// Centre of the square.
    pub position: Vec2,
    pub size: Vec2,
    pub color: Color,
    /// Horizontal speed in px/s.
    pub speed: f32,
    /// Once `position.x` passes this, it jumps back to `wrap_to`.
    pub wrap_at: f32,
    pub wrap_to: f32,
}

impl Steppable for DemoSquare {
    fn update(&mut self, dt: f64) {
        self.position.x += self.speed * dt as f32;
        if self.position.x > self.wrap_at {
            self.position.x = self.wrap_to;
        }
    }

    fn render(&self, ctx: &mut dyn Context2d) {
        let corner = self.position - self.size / 2.0;
        ctx.set_fill_style(self.color);
        ctx.fill_rect(corner.x, corner.y, self.size.x, self.size.y);
        ctx.set_stroke_style(Color::WHITE);
        ctx.set_line_width(2.0);
        ctx.stroke_rect(corner.x, corner.y, self.size.x, self.size.y);
    }

    fn is_dead(&self) -> bool {
        false
    }
}

/// A placed police unit or defense. Stationary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub kind: UnitType,
    pub position: Vec2,
    pub color: Color,
    pub state: EntityState,
    dead: bool,
}

impl Unit {
    const RADIUS: f32 = 30.0;

    pub fn new(kind: UnitType, position: Vec2, palette: &ColorPalette) -> Self {
        let color = if kind.is_defense() {
            palette.defense
        } else {
            palette.police
        };
        Self {
            kind,
            position,
            color,
            state: EntityState::Idle,
            dead: false,
        }
    }

    pub fn kill(&mut self) {
        self.dead = true;
        self.state = EntityState::Death;
    }
}

impl Steppable for Unit {
    fn update(&mut self, _dt: f64) {}

    fn render(&self, ctx: &mut dyn Context2d) {
        ctx.set_fill_style(self.color);
        if self.kind.is_defense() {
            let side = Self::RADIUS * 2.0;
            ctx.fill_rect(
                self.position.x - Self::RADIUS,
                self.position.y - Self::RADIUS,
                side,
                side,
            );
        } else {
            ctx.begin_path();
            ctx.arc(self.position.x, self.position.y, Self::RADIUS, 0.0, TAU);
            ctx.fill();
        }
    }

    fn is_dead(&self) -> bool {
        self.dead
    }
}

/// A zombie walking left along its lane until it reaches the base line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zombie {
    pub kind: ZombieType,
    pub position: Vec2,
    /// Walking speed in px/s.
    pub speed: f32,
    pub color: Color,
    pub state: EntityState,
    /// X coordinate where the zombie stops, if any.
    pub base_x: Option<f32>,
    dead: bool,
}

impl Zombie {
    const SIZE: Vec2 = Vec2::new(40.0, 70.0);

    pub fn new(kind: ZombieType, position: Vec2, speed: f32, palette: &ColorPalette) -> Self {
        Self {
            kind,
            position,
            speed,
            color: palette.zombie,
            state: EntityState::Walk,
            base_x: None,
            dead: false,
        }
    }

    /// Stop at `base_x` instead of walking on forever.
    pub fn with_base(mut self, base_x: f32) -> Self {
        self.base_x = Some(base_x);
        self
    }

    pub fn kill(&mut self) {
        self.dead = true;
        self.state = EntityState::Death;
    }

    pub fn reached_base(&self) -> bool {
        self.base_x.is_some_and(|base| self.position.x <= base)
    }
}

impl Steppable for Zombie {
    fn update(&mut self, dt: f64) {
        if self.dead || self.reached_base() {
            return;
        }
        let x = self.position.x - self.speed * dt as f32;
        self.position.x = self.base_x.map_or(x, |base| x.max(base));
        if self.reached_base() {
            self.state = EntityState::Attack;
        }
    }

    fn render(&self, ctx: &mut dyn Context2d) {
        let corner = self.position - Self::SIZE / 2.0;
        ctx.set_fill_style(self.color);
        ctx.fill_rect(corner.x, corner.y, Self::SIZE.x, Self::SIZE.y);
    }

    fn is_dead(&self) -> bool {
        self.dead
    }
}

/// A shot travelling in a straight line. Dies once it leaves `[min_x, max_x]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub kind: ProjectileType,
    pub position: Vec2,
    /// Velocity in px/s.
    pub velocity: Vec2,
    pub color: Color,
    pub min_x: f32,
    pub max_x: f32,
    dead: bool,
}

impl Projectile {
    const RADIUS: f32 = 5.0;

    pub fn new(
        kind: ProjectileType,
        position: Vec2,
        velocity: Vec2,
        bounds: (f32, f32),
        palette: &ColorPalette,
    ) -> Self {
        Self {
            kind,
            position,
            velocity,
            color: palette.projectile,
            min_x: bounds.0,
            max_x: bounds.1,
            dead: false,
        }
    }

    pub fn kill(&mut self) {
        self.dead = true;
    }
}

impl Steppable for Projectile {
    fn update(&mut self, dt: f64) {
        self.position += self.velocity * dt as f32;
        if self.position.x < self.min_x || self.position.x > self.max_x {
            self.dead = true;
        }
    }

    fn render(&self, ctx: &mut dyn Context2d) {
        ctx.set_fill_style(self.color);
        ctx.begin_path();
        ctx.arc(self.position.x, self.position.y, Self::RADIUS, 0.0, TAU);
        ctx.fill();
    }

    fn is_dead(&self) -> bool {
        self.dead
    }
}

/// Short-lived visual effect that fades out over its lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub kind: EffectType,
    pub position: Vec2,
    pub radius: f32,
    pub color: Color,
    /// Total lifetime in seconds.
    pub lifetime: f32,
    /// Seconds left.
    pub remaining: f32,
}

impl Effect {
    pub fn new(kind: EffectType, position: Vec2, radius: f32, color: Color, lifetime: f32) -> Self {
        Self {
            kind,
            position,
            radius,
            color,
            lifetime,
            remaining: lifetime,
        }
    }

    /// Fraction of the lifetime left, in `[0, 1]`.
    pub fn fade(&self) -> f32 {
        if self.lifetime <= 0.0 {
            return 0.0;
        }
        (self.remaining / self.lifetime).clamp(0.0, 1.0)
    }
}

impl Steppable for Effect {
    fn update(&mut self, dt: f64) {
        self.remaining -= dt as f32;
    }

    fn render(&self, ctx: &mut dyn Context2d) {
        ctx.set_fill_style(self.color.with_alpha(self.color.a * self.fade()));
        ctx.begin_path();
        ctx.arc(self.position.x, self.position.y, self.radius, 0.0, TAU);
        ctx.fill();
    }

    fn is_dead(&self) -> bool {
        self.remaining <= 0.0
    }
}
