use crate::model::Rgb;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// One cannon of a burst. Angle in degrees, 90 = straight up; origin in
/// normalized screen coordinates (y grows downward).
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Cannon {
    pub(crate) particles: u32,
    pub(crate) angle_deg: f32,
    pub(crate) spread_deg: f32,
    pub(crate) origin: (f32, f32),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Burst {
    pub(crate) cannons: &'static [Cannon],
    pub(crate) palette: &'static [Rgb],
}

pub(crate) const CONFETTI_PALETTE: [Rgb; 5] = [
    Rgb::hex(0xffcad4),
    Rgb::hex(0xfff5d7),
    Rgb::hex(0xffe6ef),
    Rgb::hex(0xff5e7e),
    Rgb::hex(0xffffff),
];

pub(crate) const CELEBRATION_BURST: Burst = Burst {
    cannons: &[
        Cannon {
            particles: 80,
            angle_deg: 65.0,
            spread_deg: 100.0,
            origin: (0.2, 0.4),
        },
        Cannon {
            particles: 60,
            angle_deg: 130.0,
            spread_deg: 100.0,
            origin: (0.9, 0.3),
        },
    ],
    palette: &CONFETTI_PALETTE,
};

/// Fire-and-forget visual effects.
pub(crate) trait Effects {
    fn burst(&mut self, burst: &Burst);
}

/* -----------------------------
   Confetti particles
------------------------------ */

// Motion is tuned in "reference pixels" per 60 Hz tick, then normalized.
const TICK_SECS: f32 = 1.0 / 60.0;
const REF_PX: f32 = 900.0;
const START_VELOCITY: f32 = 45.0;
const DECAY: f32 = 0.9;
const GRAVITY: f32 = 3.0;
const LIFE_TICKS: u32 = 200;
const GLYPHS: [char; 5] = ['▪', '•', '▴', '◆', '*'];

#[derive(Clone, Debug)]
pub(crate) struct Particle {
    pub(crate) x: f32,
    pub(crate) y: f32,
    angle: f32,
    velocity: f32,
    wobble: f32,
    wobble_speed: f32,
    tick: u32,
    pub(crate) color: Rgb,
    pub(crate) glyph: char,
}

impl Particle {
    /// 1 when fresh, 0 when about to expire.
    pub(crate) fn fade(&self) -> f32 {
        1.0 - self.tick as f32 / LIFE_TICKS as f32
    }

    fn step(&mut self) {
        self.x += self.angle.cos() * self.velocity / REF_PX;
        self.y += (self.angle.sin() * self.velocity + GRAVITY) / REF_PX;
        self.velocity *= DECAY;
        self.wobble += self.wobble_speed;
        self.x += self.wobble.cos() * 0.6 / REF_PX;
        self.tick += 1;
    }
}

pub(crate) struct Confetti {
    particles: Vec<Particle>,
    rng: StdRng,
    accum: f32,
    bursts: u32,
}

impl Confetti {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            particles: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
            accum: 0.0,
            bursts: 0,
        }
    }

    pub(crate) fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub(crate) fn bursts(&self) -> u32 {
        self.bursts
    }

    /// Advance by real elapsed time in fixed ticks.
    pub(crate) fn step(&mut self, dt_secs: f32) {
        if self.particles.is_empty() {
            self.accum = 0.0;
            return;
        }
        self.accum += dt_secs.clamp(0.0, 0.25);
        while self.accum >= TICK_SECS {
            self.accum -= TICK_SECS;
            for p in &mut self.particles {
                p.step();
            }
            self.particles
                .retain(|p| p.tick < LIFE_TICKS && p.y < 1.2 && p.x > -0.2 && p.x < 1.2);
        }
    }

    fn spawn(&mut self, cannon: &Cannon, palette: &[Rgb]) {
        let spread = cannon.spread_deg.to_radians();
        for _ in 0..cannon.particles {
            // screen y grows downward, so "up" is a negative angle
            let angle = -cannon.angle_deg.to_radians() + (0.5 * spread - self.rng.gen::<f32>() * spread);
            let velocity = START_VELOCITY * 0.5 + self.rng.gen::<f32>() * START_VELOCITY;
            let color = if palette.is_empty() {
                Rgb::WHITE
            } else {
                palette[self.rng.gen_range(0..palette.len())]
            };
            self.particles.push(Particle {
                x: cannon.origin.0,
                y: cannon.origin.1,
                angle,
                velocity,
                wobble: self.rng.gen::<f32>() * 10.0,
                wobble_speed: 0.1 + self.rng.gen::<f32>() * 0.3,
                tick: 0,
                color,
                glyph: GLYPHS[self.rng.gen_range(0..GLYPHS.len())],
            });
        }
    }
}

impl Effects for Confetti {
    fn burst(&mut self, burst: &Burst) {
        for cannon in burst.cannons {
            self.spawn(cannon, burst.palette);
        }
        self.bursts += 1;
        tracing::debug!(
            bursts = self.bursts,
            live = self.particles.len(),
            "confetti burst"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_spawns_every_cannon() {
        let mut confetti = Confetti::new(7);
        confetti.burst(&CELEBRATION_BURST);
        assert_eq!(confetti.particles().len(), 140);
        assert_eq!(confetti.bursts(), 1);
        assert!(confetti
            .particles()
            .iter()
            .all(|p| CONFETTI_PALETTE.contains(&p.color)));
    }

    #[test]
    fn particles_launch_upward_then_expire() {
        let mut confetti = Confetti::new(1);
        confetti.burst(&Burst {
            cannons: &[Cannon {
                particles: 30,
                angle_deg: 90.0,
                spread_deg: 10.0,
                origin: (0.5, 0.5),
            }],
            palette: &CONFETTI_PALETTE,
        });
        confetti.step(TICK_SECS * 3.0 + 1e-4);
        assert!(confetti.particles().iter().all(|p| p.y < 0.5));

        for _ in 0..40 {
            confetti.step(0.1);
        }
        assert!(confetti.particles().is_empty());
    }

    #[test]
    fn same_seed_same_burst() {
        let mut a = Confetti::new(99);
        let mut b = Confetti::new(99);
        a.burst(&CELEBRATION_BURST);
        b.burst(&CELEBRATION_BURST);
        a.step(0.2);
        b.step(0.2);
        for (pa, pb) in a.particles().iter().zip(b.particles()) {
            assert_eq!((pa.x, pa.y, pa.glyph), (pb.x, pb.y, pb.glyph));
        }
    }
}
