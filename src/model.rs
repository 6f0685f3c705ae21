use std::ops::{Add, Mul, Sub};

pub(crate) const CANDLE_COUNT: usize = 18;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Rgb {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
}

impl Rgb {
    pub(crate) const BLACK: Rgb = Rgb::hex(0x000000);
    pub(crate) const WHITE: Rgb = Rgb::hex(0xffffff);

    pub(crate) const fn hex(v: u32) -> Self {
        Self {
            r: ((v >> 16) & 0xff) as u8,
            g: ((v >> 8) & 0xff) as u8,
            b: (v & 0xff) as u8,
        }
    }

    pub(crate) fn mix(self, other: Rgb, t: f32) -> Rgb {
        let t = clamp01(t);
        Rgb {
            r: lerp_u8(self.r, other.r, t),
            g: lerp_u8(self.g, other.g, t),
            b: lerp_u8(self.b, other.b, t),
        }
    }

    /// sRGB bytes to linear floats.
    pub(crate) fn linear(self) -> Vec3 {
        let f = |c: u8| (c as f32 / 255.0).powf(2.2);
        Vec3::new(f(self.r), f(self.g), f(self.b))
    }

    /// Linear floats back to sRGB bytes, clamped.
    pub(crate) fn from_linear(v: Vec3) -> Rgb {
        let f = |c: f32| (clamp01(c).powf(1.0 / 2.2) * 255.0 + 0.5) as u8;
        Rgb {
            r: f(v.x),
            g: f(v.y),
            b: f(v.z),
        }
    }

    pub(crate) fn luma(self) -> f32 {
        (0.2126 * self.r as f32 + 0.7152 * self.g as f32 + 0.0722 * self.b as f32) / 255.0
    }

    pub(crate) fn to_color(self) -> crossterm::style::Color {
        crossterm::style::Color::Rgb {
            r: self.r,
            g: self.g,
            b: self.b,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Vec3 {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) z: f32,
}

impl Vec3 {
    pub(crate) const UP: Vec3 = Vec3::new(0.0, 1.0, 0.0);

    pub(crate) const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub(crate) fn dot(self, o: Vec3) -> f32 {
        self.x * o.x + self.y * o.y + self.z * o.z
    }

    pub(crate) fn cross(self, o: Vec3) -> Vec3 {
        Vec3::new(
            self.y * o.z - self.z * o.y,
            self.z * o.x - self.x * o.z,
            self.x * o.y - self.y * o.x,
        )
    }

    pub(crate) fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub(crate) fn normalize(self) -> Vec3 {
        let l = self.length().max(1e-6);
        self * (1.0 / l)
    }

    pub(crate) fn hadamard(self, o: Vec3) -> Vec3 {
        Vec3::new(self.x * o.x, self.y * o.y, self.z * o.z)
    }

    /// Rotation about +y, same handedness as a scene-graph `rotation.y`.
    pub(crate) fn rot_y(self, ang: f32) -> Vec3 {
        let (s, c) = ang.sin_cos();
        Vec3::new(c * self.x + s * self.z, self.y, -s * self.x + c * self.z)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, o: Vec3) -> Vec3 {
        Vec3::new(self.x + o.x, self.y + o.y, self.z + o.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, o: Vec3) -> Vec3 {
        Vec3::new(self.x - o.x, self.y - o.y, self.z - o.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, k: f32) -> Vec3 {
        Vec3::new(self.x * k, self.y * k, self.z * k)
    }
}

/// Opacity of the two text elements drawn over the scene.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Overlay {
    pub(crate) hint: f32,
    pub(crate) banner: f32,
}

pub(crate) fn clamp01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

pub(crate) fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    lerp(a as f32, b as f32, t).round().clamp(0.0, 255.0) as u8
}
