use crate::flames::FlameStore;
use crate::scene::Scene;
use serde::{Deserialize, Serialize};

pub(crate) const ROTATION_PER_FRAME: f32 = 0.005;
/// Same visual speed as `ROTATION_PER_FRAME` at 60 fps.
pub(crate) const ROTATION_PER_SEC: f32 = 0.3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub(crate) enum RotationMode {
    /// Fixed step per rendered frame; speed follows the frame rate.
    PerFrame,
    /// Scaled by elapsed time.
    Timed,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Flicker {
    pub(crate) scale_x: f32,
    pub(crate) scale_y: f32,
    pub(crate) light: f32,
}

/// Flicker for candle `i` at `now_ms`. No hidden state: dropped frames do not
/// change what any later frame shows.
pub(crate) fn flicker(now_ms: u64, i: usize) -> Flicker {
    let t = now_ms as f64;
    let i = i as f64;
    Flicker {
        scale_y: (1.0 + 0.18 * (t * 0.008 + i * 0.7).sin()) as f32,
        scale_x: (1.0 + 0.08 * (t * 0.012 + i * 1.1).cos()) as f32,
        light: (0.4 + 0.25 * (t * 0.01 + i).sin().abs()) as f32,
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Simulator {
    mode: RotationMode,
    last_ms: Option<u64>,
}

impl Simulator {
    pub(crate) fn new(mode: RotationMode) -> Self {
        Self {
            mode,
            last_ms: None,
        }
    }

    pub(crate) fn tick(
        &mut self,
        now_ms: u64,
        flames: &FlameStore,
        rotation_enabled: bool,
        scene: &mut Scene,
    ) {
        let dt_ms = self
            .last_ms
            .map(|last| now_ms.saturating_sub(last))
            .unwrap_or(0);
        self.last_ms = Some(now_ms);

        if rotation_enabled {
            scene.rotation += match self.mode {
                RotationMode::PerFrame => ROTATION_PER_FRAME,
                RotationMode::Timed => ROTATION_PER_SEC * dt_ms as f32 / 1000.0,
            };
        }

        for (i, candle) in scene.candles.iter_mut().enumerate() {
            // out flames belong to their fade tween, never to the flicker
            if !flames.is_lit(i) {
                continue;
            }
            let f = flicker(now_ms, i);
            candle.flame.scale_x = f.scale_x;
            candle.flame.scale_y = f.scale_y;
            candle.light = f.light;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flicker_matches_closed_form() {
        let f = flicker(1234, 5);
        let t = 1234.0f64;
        assert!((f.scale_y as f64 - (1.0 + 0.18 * (t * 0.008 + 3.5).sin())).abs() < 1e-6);
        assert!((f.scale_x as f64 - (1.0 + 0.08 * (t * 0.012 + 5.5).cos())).abs() < 1e-6);
        assert!((f.light as f64 - (0.4 + 0.25 * (t * 0.01 + 5.0).sin().abs())).abs() < 1e-6);
        assert_eq!(flicker(1234, 5), f);
    }

    #[test]
    fn flicker_stays_in_band() {
        for now in (0..20_000).step_by(37) {
            for i in 0..18 {
                let f = flicker(now, i);
                assert!((0.82..=1.18).contains(&f.scale_y));
                assert!((0.92..=1.08).contains(&f.scale_x));
                assert!((0.4..=0.65).contains(&f.light));
            }
        }
    }

    #[test]
    fn frame_density_does_not_matter() {
        let flames = FlameStore::new(4);
        let mut dense = Scene::new(4, 0.2);
        let mut sparse = Scene::new(4, 0.2);
        let mut a = Simulator::new(RotationMode::PerFrame);
        let mut b = Simulator::new(RotationMode::PerFrame);
        for now in (0..=1000).step_by(16) {
            a.tick(now, &flames, false, &mut dense);
        }
        b.tick(992, &flames, false, &mut sparse);
        for i in 0..4 {
            assert_eq!(dense.candles[i].flame, sparse.candles[i].flame);
            assert_eq!(dense.candles[i].light, sparse.candles[i].light);
        }
    }

    #[test]
    fn extinguished_candles_are_left_alone() {
        let mut flames = FlameStore::new(3);
        let mut scene = Scene::new(3, 0.2);
        let mut sim = Simulator::new(RotationMode::PerFrame);
        flames.extinguish(1).unwrap();
        scene.candles[1].flame.opacity = 0.0;
        scene.candles[1].flame.visible = false;
        scene.candles[1].light = 0.0;
        let frozen = scene.candles[1].clone();

        for now in [100, 200, 5000] {
            sim.tick(now, &flames, false, &mut scene);
            assert_eq!(scene.candles[1].flame, frozen.flame);
            assert_eq!(scene.candles[1].light, 0.0);
        }
        assert_eq!(scene.candles[0].light, flicker(5000, 0).light);
    }

    #[test]
    fn rotation_per_frame_ignores_time() {
        let flames = FlameStore::new(1);
        let mut scene = Scene::new(1, 0.2);
        let mut sim = Simulator::new(RotationMode::PerFrame);
        sim.tick(0, &flames, false, &mut scene);
        assert_eq!(scene.rotation, 0.0);
        sim.tick(10, &flames, true, &mut scene);
        sim.tick(5000, &flames, true, &mut scene);
        assert!((scene.rotation - 2.0 * ROTATION_PER_FRAME).abs() < 1e-7);
    }

    #[test]
    fn timed_rotation_follows_the_clock() {
        let flames = FlameStore::new(1);
        let mut scene = Scene::new(1, 0.2);
        let mut sim = Simulator::new(RotationMode::Timed);
        sim.tick(0, &flames, true, &mut scene);
        assert_eq!(scene.rotation, 0.0);
        sim.tick(2000, &flames, true, &mut scene);
        assert!((scene.rotation - 0.6).abs() < 1e-5);
    }
}
