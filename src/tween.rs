//! Time-bounded property interpolation, advanced by the frame loop.

use crate::model::{clamp01, lerp, Overlay, Rgb};
use crate::scene::Scene;
use std::mem::discriminant;

/// Below this opacity a flame is hidden and no longer drawn.
pub(crate) const VISIBLE_THRESHOLD: f32 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Easing {
    EaseInOutQuad,
}

impl Easing {
    pub(crate) fn apply(self, t: f32) -> f32 {
        let t = clamp01(t);
        match self {
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - u * u / 2.0
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Property {
    FlameOpacity(usize),
    FlameLight(usize),
    /// Driven 0..1 as a mix factor between the two colors.
    Background { from: Rgb, to: Rgb },
    OverheadLight,
    HemiLight,
    HintOpacity,
    BannerOpacity,
}

impl Property {
    fn same_target(&self, other: &Property) -> bool {
        match (self, other) {
            (Property::FlameOpacity(a), Property::FlameOpacity(b))
            | (Property::FlameLight(a), Property::FlameLight(b)) => a == b,
            _ => discriminant(self) == discriminant(other),
        }
    }

    fn write(&self, v: f32, scene: &mut Scene, overlay: &mut Overlay) {
        match *self {
            Property::FlameOpacity(i) => {
                if let Some(c) = scene.candles.get_mut(i) {
                    c.flame.opacity = v;
                    c.flame.visible = v > VISIBLE_THRESHOLD;
                }
            }
            Property::FlameLight(i) => {
                if let Some(c) = scene.candles.get_mut(i) {
                    c.light = v;
                }
            }
            Property::Background { from, to } => scene.background = from.mix(to, v),
            Property::OverheadLight => scene.overhead_light = v,
            Property::HemiLight => scene.hemi_light = v,
            Property::HintOpacity => overlay.hint = v,
            Property::BannerOpacity => overlay.banner = v,
        }
    }

    fn finish(&self, to: f32, scene: &mut Scene) {
        if let Property::FlameOpacity(i) = *self {
            if let Some(c) = scene.candles.get_mut(i) {
                c.flame.visible = to > VISIBLE_THRESHOLD;
            }
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Tween {
    pub(crate) property: Property,
    from: f32,
    to: f32,
    start_ms: u64,
    duration_ms: u64,
    easing: Easing,
}

impl Tween {
    pub(crate) fn progress(&self, now_ms: u64) -> f32 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        let elapsed = now_ms.saturating_sub(self.start_ms);
        clamp01(elapsed as f32 / self.duration_ms as f32)
    }

    pub(crate) fn value_at(&self, now_ms: u64) -> f32 {
        lerp(self.from, self.to, self.easing.apply(self.progress(now_ms)))
    }

    pub(crate) fn is_finished(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.start_ms) >= self.duration_ms
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Tweens {
    active: Vec<Tween>,
    started: u64,
}

impl Tweens {
    /// Start a tween; a running tween on the same property is replaced.
    pub(crate) fn animate(
        &mut self,
        property: Property,
        from: f32,
        to: f32,
        duration_ms: u64,
        easing: Easing,
        now_ms: u64,
    ) {
        self.active.retain(|t| !t.property.same_target(&property));
        self.active.push(Tween {
            property,
            from,
            to,
            start_ms: now_ms,
            duration_ms,
            easing,
        });
        self.started += 1;
    }

    /// Write current values into the scene; finished tweens land exactly on
    /// their target and are dropped.
    pub(crate) fn advance(&mut self, now_ms: u64, scene: &mut Scene, overlay: &mut Overlay) {
        self.active.retain(|t| {
            t.property.write(t.value_at(now_ms), scene, overlay);
            if t.is_finished(now_ms) {
                t.property.finish(t.to, scene);
                false
            } else {
                true
            }
        });
    }

    #[cfg(test)]
    pub(crate) fn is_animating(&self, property: &Property) -> bool {
        self.active.iter().any(|t| t.property.same_target(property))
    }

    #[cfg(test)]
    pub(crate) fn active(&self) -> usize {
        self.active.len()
    }

    /// Total tweens ever started.
    #[cfg(test)]
    pub(crate) fn started(&self) -> u64 {
        self.started
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts() -> (Scene, Overlay) {
        (Scene::new(3, 0.2), Overlay::default())
    }

    #[test]
    fn ease_in_out_quad_shape() {
        let e = Easing::EaseInOutQuad;
        assert_eq!(e.apply(0.0), 0.0);
        assert_eq!(e.apply(1.0), 1.0);
        assert!((e.apply(0.5) - 0.5).abs() < 1e-6);
        assert!((e.apply(0.25) - 0.125).abs() < 1e-6);
        assert!((e.apply(0.75) - 0.875).abs() < 1e-6);
        assert_eq!(e.apply(-3.0), 0.0);
        assert_eq!(e.apply(7.0), 1.0);
    }

    #[test]
    fn flame_fade_hides_below_threshold_and_on_completion() {
        let (mut scene, mut overlay) = parts();
        let mut tweens = Tweens::default();
        tweens.animate(Property::FlameOpacity(1), 1.0, 0.0, 350, Easing::EaseInOutQuad, 1000);

        tweens.advance(1000 + 175, &mut scene, &mut overlay);
        assert!((scene.candles[1].flame.opacity - 0.5).abs() < 1e-4);
        assert!(scene.candles[1].flame.visible);

        // ease tail: 0.96 of the way, opacity ~0.0032
        tweens.advance(1000 + 336, &mut scene, &mut overlay);
        assert!(scene.candles[1].flame.opacity < VISIBLE_THRESHOLD);
        assert!(!scene.candles[1].flame.visible);

        tweens.advance(1000 + 350, &mut scene, &mut overlay);
        assert_eq!(scene.candles[1].flame.opacity, 0.0);
        assert!(!scene.candles[1].flame.visible);
        assert_eq!(tweens.active(), 0);
    }

    #[test]
    fn late_frame_lands_on_target() {
        let (mut scene, mut overlay) = parts();
        let mut tweens = Tweens::default();
        tweens.animate(Property::OverheadLight, 0.0, 70.0, 1400, Easing::EaseInOutQuad, 0);
        tweens.advance(90_000, &mut scene, &mut overlay);
        assert_eq!(scene.overhead_light, 70.0);
        assert_eq!(tweens.active(), 0);
    }

    #[test]
    fn same_property_replaces_running_tween() {
        let (mut scene, mut overlay) = parts();
        let mut tweens = Tweens::default();
        tweens.animate(Property::HintOpacity, 0.0, 1.0, 500, Easing::EaseInOutQuad, 0);
        tweens.animate(Property::FlameLight(0), 0.5, 0.0, 350, Easing::EaseInOutQuad, 0);
        tweens.animate(Property::FlameLight(2), 0.5, 0.0, 350, Easing::EaseInOutQuad, 0);
        tweens.animate(Property::HintOpacity, 1.0, 0.0, 500, Easing::EaseInOutQuad, 100);
        assert_eq!(tweens.active(), 3);
        assert_eq!(tweens.started(), 4);

        tweens.advance(350, &mut scene, &mut overlay);
        assert!((overlay.hint - 0.5).abs() < 1e-6);
        assert!(tweens.is_animating(&Property::HintOpacity));
        assert!(!tweens.is_animating(&Property::FlameLight(1)));
    }

    #[test]
    fn background_mixes_colors() {
        let (mut scene, mut overlay) = parts();
        let to = Rgb::hex(0xffe6ef);
        let mut tweens = Tweens::default();
        tweens.animate(
            Property::Background { from: Rgb::BLACK, to },
            0.0,
            1.0,
            1800,
            Easing::EaseInOutQuad,
            0,
        );
        tweens.advance(900, &mut scene, &mut overlay);
        assert_eq!(scene.background, Rgb::BLACK.mix(to, 0.5));
        tweens.advance(1800, &mut scene, &mut overlay);
        assert_eq!(scene.background, to);
    }

    #[test]
    fn zero_duration_applies_immediately() {
        let (mut scene, mut overlay) = parts();
        let mut tweens = Tweens::default();
        tweens.animate(Property::BannerOpacity, 0.0, 1.0, 0, Easing::EaseInOutQuad, 42);
        tweens.advance(42, &mut scene, &mut overlay);
        assert_eq!(overlay.banner, 1.0);
        assert_eq!(tweens.active(), 0);
    }
}
