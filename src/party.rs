//! The whole interactive state of one run, driven by pointer events and
//! frames on a single thread.

use crate::celebrate::{Celebration, Stage};
use crate::effects::{Effects, CELEBRATION_BURST};
use crate::flames::FlameStore;
use crate::hint::Hint;
use crate::model::Overlay;
use crate::pick::{resolve, Pointer, Surface};
use crate::scene::{Camera, Scene};
use crate::sim::{RotationMode, Simulator};
use crate::timers::{Deferred, Timers};
use crate::tween::{Easing, Property, Tweens};

pub(crate) const FLAME_FADE_MS: u64 = 350;

#[derive(Clone, Copy, Debug)]
pub(crate) struct PartyConfig {
    pub(crate) candles: usize,
    pub(crate) pick_radius: f32,
    pub(crate) rotation: RotationMode,
}

pub(crate) struct Party<E: Effects> {
    flames: FlameStore,
    celebration: Celebration,
    hint: Hint,
    tweens: Tweens,
    timers: Timers,
    sim: Simulator,
    scene: Scene,
    overlay: Overlay,
    effects: E,
}

impl<E: Effects> Party<E> {
    pub(crate) fn new(cfg: PartyConfig, effects: E, now_ms: u64) -> Self {
        let mut timers = Timers::default();
        let hint = Hint::arm(now_ms, &mut timers);
        Self {
            flames: FlameStore::new(cfg.candles),
            celebration: Celebration::default(),
            hint,
            tweens: Tweens::default(),
            timers,
            sim: Simulator::new(cfg.rotation),
            scene: Scene::new(cfg.candles, cfg.pick_radius),
            overlay: Overlay::default(),
            effects,
        }
    }

    /// Resolve a pointer-down and blow out whatever lit flame it hit.
    pub(crate) fn pointer_down(
        &mut self,
        now_ms: u64,
        pointer: Pointer,
        surface: &Surface,
        camera: &Camera,
    ) -> Option<usize> {
        let Some(index) = resolve(
            pointer,
            surface,
            camera,
            &self.scene,
            &self.flames,
            &self.celebration,
        ) else {
            tracing::debug!(x = pointer.x, y = pointer.y, "pointer missed");
            return None;
        };
        self.extinguish(now_ms, index)
    }

    /// Returns the index if this call put the flame out.
    pub(crate) fn extinguish(&mut self, now_ms: u64, index: usize) -> Option<usize> {
        let outcome = match self.flames.extinguish(index) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(%err, "extinguish ignored");
                if cfg!(debug_assertions) {
                    panic!("{err}");
                }
                return None;
            }
        };
        if outcome.already_out {
            tracing::debug!(candle = index, "already out");
            return None;
        }

        let candle = &self.scene.candles[index];
        self.tweens.animate(
            Property::FlameOpacity(index),
            candle.flame.opacity,
            0.0,
            FLAME_FADE_MS,
            Easing::EaseInOutQuad,
            now_ms,
        );
        self.tweens.animate(
            Property::FlameLight(index),
            candle.light,
            0.0,
            FLAME_FADE_MS,
            Easing::EaseInOutQuad,
            now_ms,
        );

        self.hint
            .on_interaction(now_ms, &mut self.timers, &mut self.tweens, &self.overlay);

        tracing::info!(
            candle = index,
            remaining = self.flames.lit_count(),
            "flame out"
        );

        if outcome.all_now_out {
            self.celebration.trigger(
                now_ms,
                Stage {
                    scene: &self.scene,
                    tweens: &mut self.tweens,
                    timers: &mut self.timers,
                    effects: &mut self.effects,
                },
            );
        }
        Some(index)
    }

    /// One frame: deferred jobs, transitions, then flicker and rotation.
    pub(crate) fn frame(&mut self, now_ms: u64) {
        for job in self.timers.take_due(now_ms) {
            tracing::debug!(?job, at_ms = now_ms, "timer fired");
            match job {
                Deferred::ShowHint => {
                    self.hint
                        .on_timer(self.celebration.is_triggered(), &mut self.overlay);
                }
                Deferred::ConfettiBurst => self.effects.burst(&CELEBRATION_BURST),
            }
        }
        self.tweens
            .advance(now_ms, &mut self.scene, &mut self.overlay);
        self.sim.tick(
            now_ms,
            &self.flames,
            self.celebration.rotation_enabled(),
            &mut self.scene,
        );
    }

    pub(crate) fn scene(&self) -> &Scene {
        &self.scene
    }

    pub(crate) fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub(crate) fn flames(&self) -> &FlameStore {
        &self.flames
    }

    pub(crate) fn celebration(&self) -> &Celebration {
        &self.celebration
    }

    pub(crate) fn hint(&self) -> &Hint {
        &self.hint
    }

    #[cfg(test)]
    pub(crate) fn tweens(&self) -> &Tweens {
        &self.tweens
    }

    pub(crate) fn effects(&self) -> &E {
        &self.effects
    }

    pub(crate) fn effects_mut(&mut self) -> &mut E {
        &mut self.effects
    }
}
