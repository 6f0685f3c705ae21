use crate::effects::{Effects, CELEBRATION_BURST};
use crate::model::Rgb;
use crate::scene::Scene;
use crate::timers::{Deferred, Timers};
use crate::tween::{Easing, Property, Tweens};

pub(crate) const CELEBRATION_BACKGROUND: Rgb = Rgb::hex(0xffe6ef);
pub(crate) const BACKGROUND_FADE_MS: u64 = 1800;
pub(crate) const LIGHT_RAMP_MS: u64 = 1400;
pub(crate) const OVERHEAD_TARGET: f32 = 70.0;
pub(crate) const HEMI_TARGET: f32 = 2.2;
pub(crate) const BANNER_FADE_MS: u64 = 1200;
pub(crate) const SECOND_BURST_DELAY_MS: u64 = 400;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Phase {
    Idle,
    Triggered,
}

/// Everything the celebration touches, borrowed for the trigger call.
pub(crate) struct Stage<'a, E: Effects> {
    pub(crate) scene: &'a Scene,
    pub(crate) tweens: &'a mut Tweens,
    pub(crate) timers: &'a mut Timers,
    pub(crate) effects: &'a mut E,
}

#[derive(Clone, Debug)]
pub(crate) struct Celebration {
    phase: Phase,
    rotation_enabled: bool,
    triggered_at: Option<u64>,
}

impl Default for Celebration {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            rotation_enabled: false,
            triggered_at: None,
        }
    }
}

impl Celebration {
    pub(crate) fn phase(&self) -> Phase {
        self.phase
    }

    pub(crate) fn is_triggered(&self) -> bool {
        self.phase == Phase::Triggered
    }

    pub(crate) fn rotation_enabled(&self) -> bool {
        self.rotation_enabled
    }

    pub(crate) fn triggered_at(&self) -> Option<u64> {
        self.triggered_at
    }

    /// Idle -> Triggered. Starts every celebration effect at once and returns
    /// true; any later call returns false and does nothing.
    pub(crate) fn trigger<E: Effects>(&mut self, now_ms: u64, stage: Stage<'_, E>) -> bool {
        if self.phase == Phase::Triggered {
            return false;
        }
        self.phase = Phase::Triggered;
        self.triggered_at = Some(now_ms);

        let Stage {
            scene,
            tweens,
            timers,
            effects,
        } = stage;

        tweens.animate(
            Property::Background {
                from: scene.background,
                to: CELEBRATION_BACKGROUND,
            },
            0.0,
            1.0,
            BACKGROUND_FADE_MS,
            Easing::EaseInOutQuad,
            now_ms,
        );
        tweens.animate(
            Property::OverheadLight,
            scene.overhead_light,
            OVERHEAD_TARGET,
            LIGHT_RAMP_MS,
            Easing::EaseInOutQuad,
            now_ms,
        );
        tweens.animate(
            Property::HemiLight,
            scene.hemi_light,
            HEMI_TARGET,
            LIGHT_RAMP_MS,
            Easing::EaseInOutQuad,
            now_ms,
        );

        self.rotation_enabled = true;

        effects.burst(&CELEBRATION_BURST);
        timers.schedule(now_ms + SECOND_BURST_DELAY_MS, Deferred::ConfettiBurst);

        tweens.animate(
            Property::BannerOpacity,
            0.0,
            1.0,
            BANNER_FADE_MS,
            Easing::EaseInOutQuad,
            now_ms,
        );

        tracing::info!(at_ms = now_ms, "celebration triggered");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::Burst;
    use crate::model::Overlay;

    #[derive(Default)]
    struct Recorder {
        bursts: usize,
    }

    impl Effects for Recorder {
        fn burst(&mut self, _burst: &Burst) {
            self.bursts += 1;
        }
    }

    struct Rig {
        scene: Scene,
        overlay: Overlay,
        tweens: Tweens,
        timers: Timers,
        fx: Recorder,
        celebration: Celebration,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                scene: Scene::new(3, 0.2),
                overlay: Overlay::default(),
                tweens: Tweens::default(),
                timers: Timers::default(),
                fx: Recorder::default(),
                celebration: Celebration::default(),
            }
        }

        fn trigger(&mut self, now: u64) -> bool {
            self.celebration.trigger(
                now,
                Stage {
                    scene: &self.scene,
                    tweens: &mut self.tweens,
                    timers: &mut self.timers,
                    effects: &mut self.fx,
                },
            )
        }
    }

    #[test]
    fn trigger_starts_everything_at_once() {
        let mut rig = Rig::new();
        assert!(!rig.celebration.rotation_enabled());
        assert!(rig.trigger(10_000));

        assert_eq!(rig.celebration.phase(), Phase::Triggered);
        assert!(rig.celebration.rotation_enabled());
        assert_eq!(rig.celebration.triggered_at(), Some(10_000));
        assert_eq!(rig.fx.bursts, 1);
        assert_eq!(rig.timers.len(), 1);
        assert_eq!(rig.tweens.active(), 4);
        for p in [
            Property::OverheadLight,
            Property::HemiLight,
            Property::BannerOpacity,
        ] {
            assert!(rig.tweens.is_animating(&p), "{p:?}");
        }
    }

    #[test]
    fn second_trigger_is_inert() {
        let mut rig = Rig::new();
        assert!(rig.trigger(0));
        assert!(!rig.trigger(5));
        assert_eq!(rig.fx.bursts, 1);
        assert_eq!(rig.timers.len(), 1);
        assert_eq!(rig.tweens.started(), 4);
    }

    #[test]
    fn second_burst_is_a_deferred_timer() {
        let mut rig = Rig::new();
        rig.trigger(1000);
        assert!(rig.timers.take_due(1399).is_empty());
        assert_eq!(rig.timers.take_due(1400), vec![Deferred::ConfettiBurst]);
    }

    #[test]
    fn ramps_finish_on_their_targets() {
        let mut rig = Rig::new();
        rig.trigger(0);
        rig.tweens.advance(700, &mut rig.scene, &mut rig.overlay);
        assert!(rig.scene.overhead_light > 0.0 && rig.scene.overhead_light < OVERHEAD_TARGET);
        assert!(rig.overlay.banner > 0.0 && rig.overlay.banner < 1.0);

        rig.tweens.advance(BACKGROUND_FADE_MS, &mut rig.scene, &mut rig.overlay);
        assert_eq!(rig.scene.overhead_light, OVERHEAD_TARGET);
        assert_eq!(rig.scene.hemi_light, HEMI_TARGET);
        assert_eq!(rig.scene.background, CELEBRATION_BACKGROUND);
        assert_eq!(rig.overlay.banner, 1.0);
        assert_eq!(rig.tweens.active(), 0);
    }
}
