use crate::demo::{DEFAULT_SEED, demo_squares};
use crate::entity::{DemoSquare, Effect, Projectile, Steppable, Unit, Zombie};
use crate::input::InputAction;
use crate::state::GameState;
use glam::Vec2;
use pvz_common::{Color, ConfigError, GameConfig, Rng};
use pvz_kernel::{
    Clock, Engine, FrameScheduler, FrameStats, LoopConfig, LoopHooks, PumpOutcome, RunSummary,
};
use pvz_render::{Canvas, Label, Paint, RenderError, Renderer, Shadow, TextAlign, TextStyle};

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("renderer: {0}")]
    Render(#[from] RenderError),
    #[error("config: {0}")]
    Config(#[from] ConfigError),
}

const TITLE: &str = "STAGE 2: the game loop is running!";
const TITLE_COLOR: Color = Color::rgb(0x4c, 0xaf, 0x50);
const HINT_COLOR: Color = Color::rgb(0xaa, 0xaa, 0xaa);
const PAUSE_DIM: Color = Color::rgba(0, 0, 0, 0.7);
const TITLE_SHADOW: Shadow = Shadow {
    color: Color::rgba(0, 0, 0, 0.5),
    blur: 4.0,
    offset: Vec2::new(2.0, 2.0),
};

fn step_all<T: Steppable>(items: &mut [T], dt: f64) {
    for item in items {
        item.update(dt);
    }
}

/// Drop dead entries, keeping survivors in order. Returns how many went.
fn remove_dead<T: Steppable>(items: &mut Vec<T>) -> usize {
    let before = items.len();
    items.retain(|item| !item.is_dead());
    before - items.len()
}

/// Everything the loop callbacks touch: renderer, state and entities.
///
/// Kept apart from the [`Engine`] so the engine can borrow it mutably as its
/// [`LoopHooks`] while pumping.
pub struct Scene<V: Canvas> {
    renderer: Renderer<V>,
    config: GameConfig,
    state: GameState,
    demo: Vec<DemoSquare>,
    units: Vec<Unit>,
    zombies: Vec<Zombie>,
    projectiles: Vec<Projectile>,
    effects: Vec<Effect>,
}

impl<V: Canvas> Scene<V> {
    /// Advance every entity by one fixed step, then drop the dead ones.
    /// Does nothing unless the game is playing.
    pub fn update(&mut self, dt: f64) {
        if !self.state.is_playing {
            return;
        }
        step_all(&mut self.demo, dt);
        step_all(&mut self.units, dt);
        step_all(&mut self.zombies, dt);
        step_all(&mut self.projectiles, dt);
        step_all(&mut self.effects, dt);
        self.cleanup();
    }

    /// Remove dead units, zombies, projectiles and effects.
    pub fn cleanup(&mut self) -> usize {
        let removed = remove_dead(&mut self.units)
            + remove_dead(&mut self.zombies)
            + remove_dead(&mut self.projectiles)
            + remove_dead(&mut self.effects);
        if removed > 0 {
            tracing::debug!(removed, "dead entities removed");
        }
        removed
    }

    pub fn render(&mut self, _dt: f64, stats: &FrameStats) {
        self.renderer.begin_frame();

        if self.config.debug.show_grid {
            self.renderer.draw_grid();
        }

        let ctx = self.renderer.context_mut();
        for item in &self.demo {
            item.render(ctx);
        }
        for item in &self.units {
            item.render(ctx);
        }
        for item in &self.zombies {
            item.render(ctx);
        }
        for item in &self.projectiles {
            item.render(ctx);
        }
        for item in &self.effects {
            item.render(ctx);
        }

        self.render_ui(stats);
        self.renderer.draw_fps(stats.fps);

        if self.state.is_paused {
            self.render_pause_overlay();
        }

        self.renderer.end_frame();
    }

    fn render_ui(&mut self, stats: &FrameStats) {
        let ui = self.config.z_index.ui;
        let center_x = self.renderer.width() as f32 / 2.0;

        let mut title = Label::new(
            TITLE,
            Vec2::new(center_x, self.config.grid.offset_y - 20.0),
            TextStyle::new("bold 24px Arial", TITLE_COLOR, TextAlign::Center),
        );
        if self.config.performance.enable_shadows {
            title = title.with_shadow(TITLE_SHADOW);
        }
        self.renderer.add_to_layer(ui, Box::new(title));

        let lines = [
            "Moving squares demonstrate the game loop".to_string(),
            "Press SPACE to pause".to_string(),
            format!("FPS: {} | DeltaTime: {:.2}ms", stats.fps, stats.delta_time * 1000.0),
        ];
        let style = TextStyle::new("14px Arial", Color::WHITE, TextAlign::Center);
        let mut y = self.renderer.height() as f32 - 80.0;
        for line in lines {
            self.renderer.add_to_layer(
                ui,
                Box::new(Label::new(line, Vec2::new(center_x, y), style.clone())),
            );
            y += 20.0;
        }

        self.renderer.render_layers();
    }

    fn render_pause_overlay(&mut self) {
        let size = Vec2::new(self.renderer.width() as f32, self.renderer.height() as f32);
        let center = size / 2.0;
        self.renderer.draw_rect(Vec2::ZERO, size, PAUSE_DIM, Paint::Fill);
        self.renderer.draw_text(
            "PAUSED",
            center,
            &TextStyle::new("bold 48px Arial", Color::WHITE, TextAlign::Center),
        );
        self.renderer.draw_text(
            "Press SPACE to continue",
            center + Vec2::new(0.0, 50.0),
            &TextStyle::new("20px Arial", HINT_COLOR, TextAlign::Center),
        );
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn renderer(&self) -> &Renderer<V> {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut Renderer<V> {
        &mut self.renderer
    }

    pub fn demo_objects(&self) -> &[DemoSquare] {
        &self.demo
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn zombies(&self) -> &[Zombie] {
        &self.zombies
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn units_mut(&mut self) -> &mut [Unit] {
        &mut self.units
    }

    pub fn zombies_mut(&mut self) -> &mut [Zombie] {
        &mut self.zombies
    }

    pub fn projectiles_mut(&mut self) -> &mut [Projectile] {
        &mut self.projectiles
    }

    pub fn effects_mut(&mut self) -> &mut [Effect] {
        &mut self.effects
    }
}

impl<V: Canvas> LoopHooks for Scene<V> {
    fn update(&mut self, dt: f64) {
        Scene::update(self, dt);
    }

    fn render(&mut self, dt: f64, stats: &FrameStats) {
        Scene::render(self, dt, stats);
    }
}

/// The game: one [`Engine`] driving one [`Scene`].
///
/// # Invariants
/// - `state().is_paused` mirrors the engine's pause flag.
/// - Entities are only updated while `state().is_playing`.
pub struct Game<C: Clock, V: Canvas> {
    engine: Engine<C>,
    scene: Scene<V>,
}

impl<C: Clock, V: Canvas> Game<C, V> {
    pub fn new(canvas: V, clock: C, config: GameConfig) -> Result<Self, GameError> {
        Self::with_seed(canvas, clock, config, DEFAULT_SEED)
    }

    /// Like [`Game::new`], with an explicit seed for demo object placement.
    pub fn with_seed(
        canvas: V,
        clock: C,
        config: GameConfig,
        seed: u64,
    ) -> Result<Self, GameError> {
        config.validate()?;
        let renderer = Renderer::new(canvas, &config)?;
        let engine = Engine::new(LoopConfig::from(&config), clock);
        let demo = demo_squares(&config, &mut Rng::with_seed(seed));
        let state = GameState::new(&config.game);
        tracing::info!(demo_objects = demo.len(), seed, "game initialized");
        Ok(Self {
            engine,
            scene: Scene {
                renderer,
                config,
                state,
                demo,
                units: Vec::new(),
                zombies: Vec::new(),
                projectiles: Vec::new(),
                effects: Vec::new(),
            },
        })
    }

    pub fn start(&mut self) {
        self.scene.state.is_playing = true;
        self.engine.start();
        self.scene.state.is_paused = self.engine.is_paused();
        tracing::info!("game started");
    }

    pub fn stop(&mut self) {
        self.scene.state.is_playing = false;
        self.engine.stop();
        tracing::info!("game stopped");
    }

    /// Toggle pause and return the new pause flag.
    pub fn toggle_pause(&mut self) -> bool {
        self.scene.state.is_paused = self.engine.toggle_pause();
        self.scene.state.is_paused
    }

    /// Apply a player action. Returns false for actions that are not
    /// implemented yet.
    pub fn handle_action(&mut self, action: InputAction) -> bool {
        match action {
            InputAction::TogglePause => {
                self.toggle_pause();
                true
            }
            InputAction::SpeedUp
            | InputAction::SpeedDown
            | InputAction::ToggleSpeed
            | InputAction::OpenSettings => {
                tracing::debug!(?action, "action not implemented");
                false
            }
        }
    }

    /// Process one frame of the loop.
    pub fn pump(&mut self) -> PumpOutcome {
        self.engine.pump(&mut self.scene)
    }

    /// Start and drive the loop with `scheduler` until it ends.
    pub fn run(&mut self, scheduler: &mut dyn FrameScheduler) -> RunSummary {
        self.start();
        pvz_kernel::run(&mut self.engine, &mut self.scene, scheduler)
    }

    /// One fixed-step update, as the engine would run it.
    pub fn update(&mut self, dt: f64) {
        self.engine.update(dt, &mut self.scene);
    }

    /// One render, as the engine would run it.
    pub fn render(&mut self, dt: f64) {
        self.engine.render(dt, &mut self.scene);
    }

    pub fn add_unit(&mut self, unit: Unit) {
        self.scene.units.push(unit);
    }

    pub fn add_zombie(&mut self, zombie: Zombie) {
        self.scene.zombies.push(zombie);
    }

    pub fn add_projectile(&mut self, projectile: Projectile) {
        self.scene.projectiles.push(projectile);
    }

    pub fn add_effect(&mut self, effect: Effect) {
        self.scene.effects.push(effect);
    }

    pub fn state(&self) -> &GameState {
        &self.scene.state
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.scene.renderer.resize(width, height);
    }

    pub fn engine(&self) -> &Engine<C> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine<C> {
        &mut self.engine
    }

    pub fn scene(&self) -> &Scene<V> {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene<V> {
        &mut self.scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pvz_common::constants::{EffectType, ProjectileType, UnitType, ZombieType};
    use pvz_kernel::{ManualClock, SimulatedScheduler};
    use pvz_render::{DrawCommand, RecordingCanvas};
    use std::time::Duration;

    type TestGame = Game<ManualClock, RecordingCanvas>;

    fn game_with(config: GameConfig) -> (TestGame, ManualClock) {
        let clock = ManualClock::new();
        let game = Game::new(RecordingCanvas::new(1280, 720), clock.clone(), config).unwrap();
        (game, clock)
    }

    fn game() -> (TestGame, ManualClock) {
        game_with(GameConfig::default())
    }

    fn zombie_at(x: f32) -> Zombie {
        Zombie::new(
            ZombieType::Basic,
            Vec2::new(x, 148.0),
            0.0,
            &Default::default(),
        )
    }

    fn texts(game: &TestGame) -> Vec<String> {
        game.scene()
            .renderer()
            .context()
            .texts()
            .map(str::to_string)
            .collect()
    }

    fn take_commands(game: &mut TestGame) -> Vec<DrawCommand> {
        game.scene_mut().renderer_mut().context_mut().take_commands()
    }

    #[test]
    fn detached_canvas_is_a_render_error() {
        let result = Game::new(
            RecordingCanvas::detached(1280, 720),
            ManualClock::new(),
            GameConfig::default(),
        );
        assert!(matches!(
            result,
            Err(GameError::Render(RenderError::ContextUnavailable))
        ));
    }

    #[test]
    fn invalid_config_is_a_config_error() {
        let mut config = GameConfig::default();
        config.performance.target_fps = 0;
        let result = Game::new(RecordingCanvas::new(1, 1), ManualClock::new(), config);
        assert!(matches!(result, Err(GameError::Config(_))));
    }

    #[test]
    fn update_is_noop_until_started() {
        let (mut game, _) = game();
        let before = game.scene().demo_objects().to_vec();
        game.update(0.1);
        assert_eq!(game.scene().demo_objects(), before.as_slice());

        game.start();
        game.update(0.1);
        assert_ne!(game.scene().demo_objects(), before.as_slice());
    }

    #[test]
    fn cleanup_keeps_survivors_in_order() {
        let (mut game, _) = game();
        for i in 0..5 {
            game.add_zombie(zombie_at(100.0 * i as f32));
        }
        game.scene_mut().zombies_mut()[1].kill();
        game.scene_mut().zombies_mut()[3].kill();

        game.start();
        game.update(1.0 / 60.0);

        let xs: Vec<f32> = game.scene().zombies().iter().map(|z| z.position.x).collect();
        assert_eq!(xs, [0.0, 200.0, 400.0]);
    }

    #[test]
    fn cleanup_is_per_collection() {
        let (mut game, _) = game();
        let palette = game.scene().config().colors.clone();
        let mut dead_unit = Unit::new(UnitType::Swat, Vec2::ZERO, &palette);
        dead_unit.kill();
        game.add_unit(dead_unit);
        game.add_unit(Unit::new(UnitType::Patrol, Vec2::ZERO, &palette));
        game.add_zombie(zombie_at(500.0));
        game.add_effect(Effect::new(EffectType::Blood, Vec2::ZERO, 5.0, Color::WHITE, 0.01));

        game.start();
        game.update(0.02);

        assert_eq!(game.scene().units().len(), 1);
        assert_eq!(game.scene().units()[0].kind, UnitType::Patrol);
        assert_eq!(game.scene().zombies().len(), 1);
        assert!(game.scene().effects().is_empty());
    }

    #[test]
    fn projectiles_leaving_the_grid_are_removed() {
        let (mut game, _) = game();
        let palette = game.scene().config().colors.clone();
        game.add_projectile(Projectile::new(
            ProjectileType::Bullet,
            Vec2::new(1050.0, 148.0),
            Vec2::new(600.0, 0.0),
            (100.0, 1060.0),
            &palette,
        ));
        game.start();
        game.update(0.1);
        assert!(game.scene().projectiles().is_empty());
    }

    #[test]
    fn add_methods_append() {
        let (mut game, _) = game();
        game.add_zombie(zombie_at(1.0));
        game.add_zombie(zombie_at(2.0));
        assert_eq!(game.scene().zombies().len(), 2);
        assert_eq!(game.scene().zombies()[1].position.x, 2.0);
    }

    #[test]
    fn five_steps_in_one_pump() {
        let (mut game, clock) = game();
        game.start();
        let step = game.engine().fixed_time_step();
        clock.advance(step * 5);

        match game.pump() {
            PumpOutcome::Continue(report) => assert_eq!(report.fixed_steps, 5),
            PumpOutcome::Stopped => panic!("engine should be running"),
        }
        let cmds = game.scene().renderer().context().commands();
        assert_eq!(cmds.iter().filter(|c| **c == DrawCommand::Save).count(), 1);
        assert_eq!(game.scene().renderer().context().save_depth(), 0);
    }

    #[test]
    fn frame_paint_order() {
        let (mut game, clock) = game();
        game.add_zombie(zombie_at(600.0));
        game.start();
        clock.advance(Duration::from_millis(20));
        game.pump();

        let cmds = game.scene().renderer().context().commands();
        let index_of = |pred: fn(&DrawCommand) -> bool| cmds.iter().position(pred).unwrap();

        let background =
            index_of(|c| matches!(c, DrawCommand::FillRect { width, .. } if *width == 1280.0));
        let save = index_of(|c| *c == DrawCommand::Save);
        let grid_border =
            index_of(|c| matches!(c, DrawCommand::StrokeRect { width, .. } if *width == 960.0));
        let zombie =
            index_of(|c| matches!(c, DrawCommand::FillRect { height, .. } if *height == 70.0));
        let title = index_of(|c| matches!(c, DrawCommand::FillText { text, .. } if text == TITLE));
        let fps = index_of(|c| matches!(c, DrawCommand::FillText { text, .. } if text == "FPS: 0"));
        let restore = index_of(|c| *c == DrawCommand::Restore);

        assert!(background < save);
        assert!(save < grid_border);
        assert!(grid_border < zombie);
        assert!(zombie < title);
        assert!(title < fps);
        assert!(fps < restore);
        assert_eq!(restore, cmds.len() - 1);
    }

    #[test]
    fn ui_lines_in_order() {
        let (mut game, clock) = game();
        game.start();
        clock.advance(Duration::from_millis(20));
        game.pump();
        let texts = texts(&game);
        assert_eq!(texts[0], TITLE);
        assert_eq!(texts[1], "Moving squares demonstrate the game loop");
        assert_eq!(texts[2], "Press SPACE to pause");
        assert_eq!(texts[3], "FPS: 0 | DeltaTime: 20.00ms");
        assert_eq!(texts[4], "FPS: 0");
        assert_eq!(texts.len(), 5);
    }

    #[test]
    fn pause_overlay_and_frozen_entities() {
        let (mut game, clock) = game();
        game.add_zombie(
            Zombie::new(ZombieType::Basic, Vec2::new(600.0, 148.0), 50.0, &Default::default()),
        );
        game.start();
        assert!(game.toggle_pause());
        assert!(game.state().is_paused);
        take_commands(&mut game);

        clock.advance(Duration::from_millis(100));
        match game.pump() {
            PumpOutcome::Continue(report) => {
                assert!(report.paused);
                assert_eq!(report.fixed_steps, 0);
            }
            PumpOutcome::Stopped => panic!("engine should be running"),
        }
        assert_eq!(game.scene().zombies()[0].position.x, 600.0);

        let cmds = game.scene().renderer().context().commands();
        assert!(cmds.contains(&DrawCommand::SetFillStyle(PAUSE_DIM)));
        let texts = texts(&game);
        assert_eq!(texts[texts.len() - 2], "PAUSED");
        assert_eq!(texts[texts.len() - 1], "Press SPACE to continue");

        assert!(!game.toggle_pause());
        assert!(!game.state().is_paused);
    }

    #[test]
    fn no_pause_overlay_while_running() {
        let (mut game, clock) = game();
        game.start();
        clock.advance(Duration::from_millis(20));
        game.pump();
        assert!(!texts(&game).iter().any(|t| t == "PAUSED"));
    }

    #[test]
    fn shadows_follow_config() {
        let mut config = GameConfig::default();
        config.performance.enable_shadows = false;
        let (mut game, _) = game_with(config);
        game.start();
        game.render(0.0);
        let cmds = game.scene().renderer().context().commands();
        assert!(!cmds.iter().any(|c| matches!(c, DrawCommand::SetShadow(_))));

        let (mut game, _) = game_with(GameConfig::default());
        game.start();
        game.render(0.0);
        let cmds = game.scene().renderer().context().commands();
        assert!(cmds.contains(&DrawCommand::SetShadow(TITLE_SHADOW)));
        assert!(cmds.contains(&DrawCommand::SetShadow(Shadow::NONE)));
    }

    #[test]
    fn grid_can_be_hidden() {
        let mut config = GameConfig::default();
        config.debug.show_grid = false;
        let (mut game, _) = game_with(config);
        game.render(0.0);
        let cmds = game.scene().renderer().context().commands();
        assert!(!cmds.contains(&DrawCommand::SetLineWidth(3.0)));
    }

    #[test]
    fn restart_after_pause_resumes_unpaused() {
        let (mut game, clock) = game();
        game.add_zombie(
            Zombie::new(ZombieType::Basic, Vec2::new(600.0, 148.0), 50.0, &Default::default()),
        );
        game.start();
        assert!(game.toggle_pause());
        game.stop();
        game.start();
        assert_eq!(game.engine().is_paused(), game.state().is_paused);
        assert!(!game.state().is_paused);
        take_commands(&mut game);

        clock.advance(Duration::from_millis(100));
        game.pump();
        assert!(game.scene().zombies()[0].position.x < 600.0);
        assert!(!texts(&game).iter().any(|t| t == "PAUSED"));
    }

    #[test]
    fn stop_ends_pumping() {
        let (mut game, clock) = game();
        game.start();
        game.stop();
        clock.advance(Duration::from_millis(20));
        assert_eq!(game.pump(), PumpOutcome::Stopped);
        assert!(!game.state().is_playing);
    }

    #[test]
    fn actions() {
        let (mut game, _) = game();
        game.start();
        assert!(game.handle_action(InputAction::TogglePause));
        assert!(game.state().is_paused);
        assert!(!game.handle_action(InputAction::SpeedUp));
        assert!(!game.handle_action(InputAction::OpenSettings));
        assert!(game.state().is_paused);
    }

    #[test]
    fn resize_reaches_the_canvas() {
        let (mut game, _) = game();
        game.resize(640, 360);
        assert_eq!(game.scene().renderer().canvas().width(), 640);
        assert_eq!(game.scene().renderer().height(), 360);
    }

    #[test]
    fn simulated_run() {
        let (mut game, clock) = game();
        let mut scheduler = SimulatedScheduler::new(clock, Duration::from_millis(50), 20);
        let summary = game.run(&mut scheduler);
        assert_eq!(summary.frames, 21);
        // 1000ms at 16.666666ms per step.
        assert_eq!(summary.fixed_steps, 60);
        assert_eq!(game.engine().fps(), 21);
        assert!(game.state().is_playing);
    }
}
