use crate::entity::DemoSquare;
use glam::Vec2;
use pvz_common::{Color, GameConfig, Rng};

/// Seed used when the caller does not pick one.
pub const DEFAULT_SEED: u64 = 0x5eed_2024;

const SQUARE_SIZE: f32 = 40.0;
const SPAWN_X: (f32, f32) = (200.0, 1000.0);
const SPEED: (f32, f32) = (20.0, 100.0);

const COLORS: [Color; 5] = [
    Color::rgb(0x4c, 0xaf, 0x50),
    Color::rgb(0x21, 0x96, 0xf3),
    Color::rgb(0xff, 0x98, 0x00),
    Color::rgb(0xf4, 0x43, 0x36),
    Color::rgb(0x9c, 0x27, 0xb0),
];

/// One drifting square per lane (up to five), centred vertically in its row.
///
/// Squares start at a random x in `[200, 1000)`, move right at a random speed
/// in `[20, 100)` px/s and wrap back to the grid's left edge after leaving
/// the canvas.
pub fn demo_squares(config: &GameConfig, rng: &mut Rng) -> Vec<DemoSquare> {
    let lanes = config.grid.rows.min(COLORS.len() as u32);
    (0..lanes)
        .map(|row| DemoSquare {
            position: Vec2::new(
                rng.range(SPAWN_X.0, SPAWN_X.1),
                config.grid.row_center_y(row),
            ),
            size: Vec2::splat(SQUARE_SIZE),
            color: COLORS[row as usize],
            speed: rng.range(SPEED.0, SPEED.1),
            wrap_at: config.canvas.width as f32,
            wrap_to: config.grid.offset_x,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_squares_one_per_row() {
        let config = GameConfig::default();
        let squares = demo_squares(&config, &mut Rng::with_seed(1));
        assert_eq!(squares.len(), 5);
        for (row, sq) in squares.iter().enumerate() {
            assert_eq!(sq.position.y, config.grid.row_center_y(row as u32));
            assert!((200.0..1000.0).contains(&sq.position.x));
            assert!((20.0..100.0).contains(&sq.speed));
            assert_eq!(sq.color, COLORS[row]);
            assert_eq!(sq.wrap_at, 1280.0);
            assert_eq!(sq.wrap_to, 100.0);
        }
    }

    #[test]
    fn same_seed_same_layout() {
        let config = GameConfig::default();
        let a = demo_squares(&config, &mut Rng::with_seed(7));
        let b = demo_squares(&config, &mut Rng::with_seed(7));
        assert_eq!(a, b);
    }

    #[test]
    fn fewer_rows_fewer_squares() {
        let mut config = GameConfig::default();
        config.grid.rows = 3;
        assert_eq!(demo_squares(&config, &mut Rng::with_seed(1)).len(), 3);
    }
}
