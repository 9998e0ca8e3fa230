//! Game configuration.
//!
//! Configuration is an explicit value handed to constructors; nothing reads
//! it from process-wide state. Every field has a default, so a JSON file only
//! needs to mention what it overrides.

use crate::types::Color;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Errors from loading or validating a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Root configuration record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub version: String,
    pub canvas: CanvasConfig,
    pub grid: GridConfig,
    pub game: BalanceConfig,
    pub performance: PerformanceConfig,
    pub debug: DebugConfig,
    pub camera: CameraConfig,
    pub colors: ColorPalette,
    pub z_index: ZIndex,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            version: "0.1.0".into(),
            canvas: CanvasConfig::default(),
            grid: GridConfig::default(),
            game: BalanceConfig::default(),
            performance: PerformanceConfig::default(),
            debug: DebugConfig::default(),
            camera: CameraConfig::default(),
            colors: ColorPalette::default(),
            z_index: ZIndex::default(),
        }
    }
}

impl GameConfig {
    /// Parse and validate a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Pretty-printed JSON form of this configuration.
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the loop or renderer cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
            ConfigError::Invalid {
                field,
                reason: reason.into(),
            }
        }

        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(invalid("canvas", "width and height must be non-zero"));
        }
        if self.grid.rows == 0 || self.grid.cols == 0 {
            return Err(invalid("grid", "rows and cols must be non-zero"));
        }
        if self.grid.cell_size <= 0.0 {
            return Err(invalid("grid.cell_size", "must be positive"));
        }
        if self.performance.target_fps == 0 {
            return Err(invalid("performance.target_fps", "must be non-zero"));
        }
        if self.performance.max_frame_time_ms == 0 {
            return Err(invalid("performance.max_frame_time_ms", "must be non-zero"));
        }
        if self.camera.min_zoom <= 0.0 || self.camera.min_zoom > self.camera.max_zoom {
            return Err(invalid(
                "camera",
                format!(
                    "zoom bounds [{}, {}] must be positive and ordered",
                    self.camera.min_zoom, self.camera.max_zoom
                ),
            ));
        }
        Ok(())
    }
}

/// How the logical canvas is fitted into its container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMode {
    /// Letterbox: largest size that fits, aspect ratio preserved.
    #[default]
    Fit,
    /// Cover the container, aspect ratio preserved, overflow cropped.
    Fill,
    /// Match the container exactly.
    Stretch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Logical drawing resolution.
    pub width: u32,
    pub height: u32,
    pub background_color: Color,
    pub scale_mode: ScaleMode,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            background_color: Color::rgb(0x1a, 0x1a, 0x1a),
            scale_mode: ScaleMode::Fit,
        }
    }
}

/// Lane grid geometry. Rows are lanes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub rows: u32,
    pub cols: u32,
    pub cell_size: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub line_color: Color,
    pub line_width: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: 5,
            cols: 10,
            cell_size: 96.0,
            offset_x: 100.0,
            offset_y: 100.0,
            line_color: Color::rgba(76, 175, 80, 0.2),
            line_width: 1.0,
        }
    }
}

impl GridConfig {
    /// Total grid width in pixels.
    pub fn width(&self) -> f32 {
        self.cols as f32 * self.cell_size
    }

    /// Total grid height in pixels.
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.cell_size
    }

    /// Vertical center of a lane.
    pub fn row_center_y(&self, row: u32) -> f32 {
        self.offset_y + row as f32 * self.cell_size + self.cell_size / 2.0
    }

    /// Horizontal center of a column.
    pub fn col_center_x(&self, col: u32) -> f32 {
        self.offset_x + col as f32 * self.cell_size + self.cell_size / 2.0
    }

    /// X coordinate of the right edge of the grid.
    pub fn right_edge(&self) -> f32 {
        self.offset_x + self.width()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedConfig {
    pub normal: f32,
    pub fast: f32,
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            normal: 1.0,
            fast: 2.0,
        }
    }
}

/// Economy and wave numbers. Read by the game state; no system consumes
/// them yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceConfig {
    pub initial_budget: u32,
    pub budget_generation: u32,
    pub budget_interval_ms: u64,
    pub base_health: u32,
    pub max_waves: u32,
    pub wave_delay_ms: u64,
    pub zombie_spawn_interval_ms: u64,
    pub speeds: SpeedConfig,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            initial_budget: 200,
            budget_generation: 25,
            budget_interval_ms: 10_000,
            base_health: 100,
            max_waves: 5,
            wave_delay_ms: 15_000,
            zombie_spawn_interval_ms: 2_000,
            speeds: SpeedConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Fixed simulation rate in steps per second.
    pub target_fps: u32,
    /// Upper clamp for a single frame delta.
    pub max_frame_time_ms: u64,
    pub max_particles: u32,
    pub enable_shadows: bool,
    pub enable_effects: bool,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            target_fps: 60,
            max_frame_time_ms: 250,
            max_particles: 100,
            enable_shadows: true,
            enable_effects: true,
        }
    }
}

impl PerformanceConfig {
    /// Duration of one simulation step, truncated to whole nanoseconds.
    pub fn fixed_time_step(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.target_fps.max(1)))
    }

    pub fn max_frame_time(&self) -> Duration {
        Duration::from_millis(self.max_frame_time_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub enabled: bool,
    pub show_fps: bool,
    pub show_grid: bool,
    pub show_hitboxes: bool,
    pub show_paths: bool,
    /// Default log filter for the application shell (`error`, `warn`,
    /// `info`, `debug`, `trace`, or `off`).
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            show_fps: true,
            show_grid: true,
            show_hitboxes: false,
            show_paths: false,
            log_level: "info".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.5,
            max_zoom: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorPalette {
    pub police: Color,
    pub zombie: Color,
    pub projectile: Color,
    pub defense: Color,
    pub grid: Color,
    pub selection: Color,
    pub range_indicator: Color,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self {
            police: Color::rgb(0x21, 0x96, 0xf3),
            zombie: Color::rgb(0xf4, 0x43, 0x36),
            projectile: Color::rgb(0xff, 0xeb, 0x3b),
            defense: Color::rgb(0x9e, 0x9e, 0x9e),
            grid: Color::rgba(76, 175, 80, 0.2),
            selection: Color::rgba(76, 175, 80, 0.5),
            range_indicator: Color::rgba(33, 150, 243, 0.2),
        }
    }
}

/// Paint order of the render layers, lowest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZIndex {
    pub background: i32,
    pub grid: i32,
    pub defense: i32,
    pub zombies: i32,
    pub police: i32,
    pub projectiles: i32,
    pub effects: i32,
    pub ui: i32,
}

impl Default for ZIndex {
    fn default() -> Self {
        Self {
            background: 0,
            grid: 1,
            defense: 10,
            zombies: 20,
            police: 30,
            projectiles: 40,
            effects: 50,
            ui: 100,
        }
    }
}

impl ZIndex {
    /// Every declared layer index.
    pub fn all(&self) -> [i32; 8] {
        [
            self.background,
            self.grid,
            self.defense,
            self.zombies,
            self.police,
            self.projectiles,
            self.effects,
            self.ui,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.canvas.width, 1280);
        assert_eq!(config.grid.rows, 5);
        assert_eq!(config.performance.target_fps, 60);
    }

    #[test]
    fn fixed_step_from_target_rate() {
        let perf = PerformanceConfig::default();
        assert_eq!(perf.fixed_time_step(), Duration::from_nanos(16_666_666));
        assert_eq!(perf.max_frame_time(), Duration::from_millis(250));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            GameConfig::from_json_str(r#"{ "performance": { "target_fps": 30 } }"#).unwrap();
        assert_eq!(config.performance.target_fps, 30);
        assert_eq!(config.performance.max_frame_time_ms, 250);
        assert_eq!(config.grid, GridConfig::default());
    }

    #[test]
    fn json_round_trip() {
        let config = GameConfig::default();
        let json = config.to_json_pretty().unwrap();
        assert!(json.contains("\"background_color\": \"#1a1a1a\""));
        let back = GameConfig::from_json_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn rejects_zero_rate() {
        let err =
            GameConfig::from_json_str(r#"{ "performance": { "target_fps": 0 } }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "performance.target_fps",
                ..
            }
        ));
    }

    #[test]
    fn rejects_inverted_zoom_bounds() {
        let mut config = GameConfig::default();
        config.camera.min_zoom = 3.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bad_color() {
        let err = GameConfig::from_json_str(r#"{ "canvas": { "background_color": "nope" } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "debug": {{ "show_fps": false }} }}"#).unwrap();
        let config = GameConfig::load(file.path()).unwrap();
        assert!(!config.debug.show_fps);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = GameConfig::load(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn grid_geometry() {
        let grid = GridConfig::default();
        assert_eq!(grid.width(), 960.0);
        assert_eq!(grid.height(), 480.0);
        assert_eq!(grid.row_center_y(0), 148.0);
        assert_eq!(grid.right_edge(), 1060.0);
    }

    #[test]
    fn z_index_is_ascending() {
        let z = ZIndex::default().all();
        assert!(z.windows(2).all(|w| w[0] < w[1]));
    }
}
