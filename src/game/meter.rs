use crate::config::{LifeMeterMetrics, Preferences};
use crate::error::LifeError;
use crate::game::drain::{DrainMode, DrainModeResolver};
use crate::game::flare::FlareGauge;
use crate::game::health::{AlphaBlend, HealthState, HealthStateEvaluator};
use crate::game::judgment::{HoldNoteScore, Judgment, TapNoteScore};
use crate::game::life::{LifeAccumulator, LifeState};
use crate::game::nonstop::NonstopProgression;
use crate::game::stage::{PlayerNumber, PlayerOptions, StageContext};
use crate::notify::{LifeChanged, LifeObserver};
use log::info;

const HOW_TO_PLAY_W2_LIFE: f32 = 0.008;
const HOW_TO_PLAY_MISS_LIFE: f32 = 0.08;

/// One player's life bar: resolves judgments for the active drain, runs
/// them through the accumulator and tells observers about the result.
pub struct LifeMeter {
    player: PlayerNumber,
    metrics: LifeMeterMetrics,
    prefs: Preferences,
    options: PlayerOptions,
    resolver: DrainModeResolver,
    accumulator: LifeAccumulator,
    evaluator: HealthStateEvaluator,
    progression: NonstopProgression,
    state: LifeState,
    failed: bool,
    passing_alpha: AlphaBlend,
    hot_alpha: AlphaBlend,
    observers: Vec<Box<dyn LifeObserver>>,
}

impl LifeMeter {
    pub fn new(
        player: PlayerNumber,
        metrics: LifeMeterMetrics,
        prefs: Preferences,
    ) -> Result<Self, LifeError> {
        metrics.validate()?;
        let progression = NonstopProgression::from_preferences(&prefs)?;

        let options = PlayerOptions::default();
        Ok(Self {
            player,
            resolver: DrainModeResolver::new(options.drain, &metrics, &prefs),
            accumulator: LifeAccumulator::new(options.drain, &metrics, &prefs, false),
            evaluator: HealthStateEvaluator::new(&metrics, options.passmark, false),
            progression,
            state: LifeState::new(options.drain.starting_life(metrics.initial_value)),
            failed: false,
            passing_alpha: AlphaBlend::default(),
            hot_alpha: AlphaBlend::default(),
            observers: Vec::new(),
            metrics,
            prefs,
            options,
        })
    }

    pub fn subscribe(&mut self, observer: Box<dyn LifeObserver>) {
        self.observers.push(observer);
    }

    /// Prepares the bar for a new chart.
    pub fn load(&mut self, options: PlayerOptions, stage: &StageContext) {
        let mode = options.drain;
        let merciful_beginner = self.prefs.merciful_beginner && stage.is_beginner_regular_play();

        self.options = options;
        self.resolver = DrainModeResolver::new(mode, &self.metrics, &self.prefs);
        self.accumulator = LifeAccumulator::new(mode, &self.metrics, &self.prefs, merciful_beginner);
        self.evaluator =
            HealthStateEvaluator::new(&self.metrics, options.passmark, mode.is_floating_flare());
        self.progression.reset(self.prefs.progressive_lifebar);
        self.state = LifeState::new(mode.starting_life(self.metrics.initial_value));
        self.failed = false;
        self.passing_alpha = AlphaBlend::default();
        self.hot_alpha = AlphaBlend::default();

        info!(
            "Loaded life meter for {}: drain {}, life {:.3}{}",
            self.player,
            mode,
            self.state.percentage,
            if merciful_beginner { ", merciful beginner" } else { "" }
        );
        self.after_life_changed();
    }

    pub fn change_life(&mut self, judgment: Judgment) -> Result<(), LifeError> {
        let hot = self.is_hot();
        let resolution = self.resolver.resolve(judgment, &mut self.state, hot)?;

        if let Some(index) = resolution.flare_index {
            info!(
                "{} dropped from Floating Flare gauge {} to {}",
                self.player,
                self.state.floating_flare_index + 1,
                index + 1
            );
            self.state.floating_flare_index = index;
        }
        if let Some(life) = resolution.life_override {
            self.set_life(life);
        }
        self.change_life_by(resolution.delta);
        Ok(())
    }

    #[inline(always)]
    pub fn change_life_tap(&mut self, score: TapNoteScore) -> Result<(), LifeError> {
        self.change_life(Judgment::Tap(score))
    }

    #[inline(always)]
    pub fn change_life_hold(&mut self, score: HoldNoteScore) -> Result<(), LifeError> {
        self.change_life(Judgment::Hold(score))
    }

    /// Feeds a raw delta through the accumulator. Non-finite deltas are
    /// dropped.
    pub fn change_life_by(&mut self, delta: f32) {
        let applied = self
            .accumulator
            .apply(&mut self.state, delta, &self.progression, self.failed);
        if applied.is_some() {
            self.after_life_changed();
        }
    }

    /// Ignored when `value` is not finite.
    pub fn set_life(&mut self, value: f32) {
        if self.accumulator.set_absolute(&mut self.state, value) {
            self.after_life_changed();
        }
    }

    /// A row the player never stepped on. Only costs life when the theme
    /// asks for it.
    pub fn handle_tap_score_none(&mut self) -> Result<(), LifeError> {
        if self.metrics.penalize_tap_score_none {
            self.change_life_tap(TapNoteScore::None)
        } else {
            Ok(())
        }
    }

    pub fn update(&mut self, dt: f32) {
        let passing = self.passing_alpha.advance(!self.is_failing(), dt);
        let hot = self.hot_alpha.advance(self.is_hot(), dt);
        for observer in &mut self.observers {
            observer.alphas_changed(self.player, passing, hot);
        }
    }

    /// Call at every stage boundary.
    pub fn update_nonstop_lifebar(&mut self, stage: &StageContext) {
        self.progression.update(stage, &self.prefs, &self.metrics);
    }

    /// Sets up the bar for the How To Play demo: enough misses to look
    /// scary, offset by the W2s the demo player will hit.
    pub fn fill_for_how_to_play(&mut self, w2s: u32, misses: u32) {
        self.progression.disable_progressive();
        let d = self.progression.life_difficulty();
        let for_w2 = w2s as f32 * d * HOW_TO_PLAY_W2_LIFE;
        let for_miss = misses as f32 / d * HOW_TO_PLAY_MISS_LIFE;
        self.state.percentage = (for_miss - for_w2).clamp(0.0, 1.0);
        self.after_life_changed();
    }

    /// Pushed in by whoever tracks stage stats. A failed player's bar stops
    /// moving.
    pub fn set_failed(&mut self, failed: bool) {
        self.failed = failed;
    }

    pub const fn is_failed(&self) -> bool {
        self.failed
    }

    fn snapshot(&self) -> LifeChanged {
        let life = self.state.percentage;
        LifeChanged {
            player: self.player,
            life,
            hot: self.is_hot(),
            danger: self.is_in_danger(),
            failing: self.is_failing(),
            health: self.health_state(),
        }
    }

    fn after_life_changed(&mut self) {
        let event = self.snapshot();
        for observer in &mut self.observers {
            observer.life_changed(&event);
        }
    }

    #[inline(always)]
    pub const fn life(&self) -> f32 {
        self.state.percentage
    }

    pub fn is_hot(&self) -> bool {
        self.evaluator.is_hot(self.state.percentage)
    }

    pub fn is_failing(&self) -> bool {
        self.evaluator.is_failing(self.state.percentage)
    }

    pub fn is_in_danger(&self) -> bool {
        self.evaluator
            .is_in_danger(self.state.percentage, self.state.floating_flare_index)
    }

    pub fn danger_should_comment(&self) -> bool {
        self.evaluator
            .danger_should_comment(self.state.percentage, self.state.floating_flare_index)
    }

    pub fn health_state(&self) -> HealthState {
        self.evaluator
            .health_state(self.state.percentage, self.state.floating_flare_index)
    }

    pub fn danger_visible(&self) -> bool {
        self.evaluator
            .danger_visible(self.state.percentage, self.state.floating_flare_index)
    }

    pub const fn floating_flare_index(&self) -> usize {
        self.state.floating_flare_index
    }

    /// The gauge currently in play, for any Flare drain.
    pub fn flare_gauge(&self) -> Option<FlareGauge> {
        match self.options.drain {
            DrainMode::Flare(gauge) => Some(gauge),
            DrainMode::FloatingFlare => FlareGauge::from_index(self.state.floating_flare_index),
            _ => None,
        }
    }

    pub const fn life_difficulty(&self) -> f32 {
        self.progression.life_difficulty()
    }

    pub const fn combo(&self) -> u32 {
        self.state.combo
    }

    pub const fn miss_combo(&self) -> u32 {
        self.state.miss_combo
    }

    pub const fn drain_mode(&self) -> DrainMode {
        self.options.drain
    }

    pub const fn player(&self) -> PlayerNumber {
        self.player
    }

    pub const fn passing_alpha(&self) -> f32 {
        self.passing_alpha.value()
    }

    pub const fn hot_alpha(&self) -> f32 {
        self.hot_alpha.value()
    }

    pub const fn state(&self) -> &LifeState {
        &self.state
    }
}
