use crate::model::{Rgb, Vec3};
use std::f32::consts::PI;

/* -----------------------------
   Layout constants (world units)
------------------------------ */

pub(crate) const HEART_RADIUS: f32 = 0.9;

pub(crate) const PLATE_RADIUS: f32 = 1.85;
pub(crate) const PLATE_Y: (f32, f32) = (-0.03, 0.05);
pub(crate) const BOTTOM_TIER_RADIUS: (f32, f32) = (1.5, 1.6);
pub(crate) const BOTTOM_TIER_Y: (f32, f32) = (0.0, 0.7);
pub(crate) const TOP_TIER_RADIUS: (f32, f32) = (1.0, 1.1);
pub(crate) const TOP_TIER_Y: (f32, f32) = (0.6, 1.1);

pub(crate) const CANDLE_RADIUS: f32 = 0.065;
pub(crate) const CANDLE_Y: (f32, f32) = (0.97, 1.29);
pub(crate) const FLAME_RADIUS: f32 = 0.07;
pub(crate) const FLAME_HEIGHT: f32 = 0.21;
pub(crate) const FLAME_CENTER_Y: f32 = 1.39;
pub(crate) const FLAME_LIGHT_Y: f32 = 1.33;

pub(crate) const PLATE_COLOR: Rgb = Rgb::hex(0xdeb887);
pub(crate) const BOTTOM_TIER_COLOR: Rgb = Rgb::hex(0xfff5d7);
pub(crate) const TOP_TIER_COLOR: Rgb = Rgb::hex(0xffcad4);
pub(crate) const CANDLE_COLOR: Rgb = Rgb::WHITE;
pub(crate) const FLAME_COLOR: Rgb = Rgb::hex(0xffa500);
pub(crate) const FLAME_LIGHT_COLOR: Rgb = Rgb::hex(0xffa040);

pub(crate) const FLAME_LIGHT_INTENSITY: f32 = 0.5;
pub(crate) const FLAME_LIGHT_DISTANCE: f32 = 1.2;

pub(crate) const OVERHEAD_LIGHT_POS: Vec3 = Vec3::new(0.0, 6.0, 3.0);
pub(crate) const OVERHEAD_LIGHT_COLOR: Rgb = Rgb::hex(0xffe6b0);
pub(crate) const OVERHEAD_LIGHT_DISTANCE: f32 = 30.0;
pub(crate) const HEMI_SKY: Rgb = Rgb::hex(0xfffbe6);
pub(crate) const HEMI_GROUND: Rgb = Rgb::hex(0xcad4ff);
pub(crate) const AMBIENT_INTENSITY: f32 = 0.18;

/// Heart parametric curve in the cake's xz-plane, one point per candle.
pub(crate) fn heart_points(count: usize, radius: f32) -> Vec<(f32, f32)> {
    (0..count)
        .map(|i| {
            let t = (i as f32 / count as f32) * 2.0 * PI;
            let x = radius * t.sin().powi(3);
            let z = -radius
                * (13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos())
                / 16.0;
            (x, z)
        })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct FlameVisual {
    pub(crate) opacity: f32,
    pub(crate) scale_x: f32,
    pub(crate) scale_y: f32,
    pub(crate) visible: bool,
}

impl Default for FlameVisual {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            scale_x: 1.0,
            scale_y: 1.0,
            visible: true,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Candle {
    pub(crate) x: f32,
    pub(crate) z: f32,
    pub(crate) flame: FlameVisual,
    pub(crate) light: f32,
}

/// Every mutable visual property of the cake scene.
#[derive(Clone, Debug)]
pub(crate) struct Scene {
    pub(crate) candles: Vec<Candle>,
    /// Cake group rotation about +y, radians.
    pub(crate) rotation: f32,
    pub(crate) overhead_light: f32,
    pub(crate) hemi_light: f32,
    pub(crate) ambient_light: f32,
    pub(crate) background: Rgb,
    pub(crate) pick_radius: f32,
}

impl Scene {
    pub(crate) fn new(count: usize, pick_radius: f32) -> Self {
        let candles = heart_points(count, HEART_RADIUS)
            .into_iter()
            .map(|(x, z)| Candle {
                x,
                z,
                flame: FlameVisual::default(),
                light: FLAME_LIGHT_INTENSITY,
            })
            .collect();
        Self {
            candles,
            rotation: 0.0,
            overhead_light: 0.0,
            hemi_light: 0.0,
            ambient_light: AMBIENT_INTENSITY,
            background: Rgb::BLACK,
            pick_radius,
        }
    }

    /// Group-local position lifted into world space.
    pub(crate) fn to_world(&self, local: Vec3) -> Vec3 {
        local.rot_y(self.rotation)
    }

    pub(crate) fn flame_center(&self, index: usize) -> Option<Vec3> {
        let c = self.candles.get(index)?;
        Some(self.to_world(Vec3::new(c.x, FLAME_CENTER_Y, c.z)))
    }

    /// The flame's cone as currently scaled by the flicker.
    pub(crate) fn flame_cone(&self, index: usize) -> Option<FlameCone> {
        let c = self.candles.get(index)?;
        let p = self.to_world(Vec3::new(c.x, 0.0, c.z));
        let half = 0.5 * FLAME_HEIGHT * c.flame.scale_y;
        Some(FlameCone {
            cx: p.x,
            cz: p.z,
            r: FLAME_RADIUS * c.flame.scale_x,
            base_y: FLAME_CENTER_Y - half,
            apex_y: FLAME_CENTER_Y + half,
        })
    }

    pub(crate) fn flame_light_pos(&self, index: usize) -> Option<Vec3> {
        let c = self.candles.get(index)?;
        Some(self.to_world(Vec3::new(c.x, FLAME_LIGHT_Y, c.z)))
    }
}

/* -----------------------------
   Camera + rays
------------------------------ */

#[derive(Clone, Copy, Debug)]
pub(crate) struct Ray {
    pub(crate) origin: Vec3,
    pub(crate) dir: Vec3,
}

impl Ray {
    pub(crate) fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Hit {
    pub(crate) index: usize,
    pub(crate) distance: f32,
}

/// Hit testing against a caller-chosen set of flames.
pub(crate) trait Raycast {
    fn intersect(&self, ray: &Ray, candidates: &[usize]) -> Option<Hit>;
}

impl Raycast for Scene {
    /// The flame cone the ray enters first. Only when no cone is hit does
    /// the pick margin apply: the flame whose center passes closest to the
    /// ray, if within `pick_radius`.
    fn intersect(&self, ray: &Ray, candidates: &[usize]) -> Option<Hit> {
        let direct = candidates
            .iter()
            .filter_map(|&index| {
                let distance = self.flame_cone(index)?.hit(ray)?;
                Some(Hit { index, distance })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance));
        if direct.is_some() {
            return direct;
        }

        candidates
            .iter()
            .filter_map(|&index| {
                let center = self.flame_center(index)?;
                let (along, miss) = ray_point_distance(ray, center)?;
                (miss <= self.pick_radius).then_some((miss, Hit { index, distance: along }))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, hit)| hit)
    }
}

/// Distance along the ray to the point's foot, and the perpendicular
/// distance from the ray to the point. `None` if the point is behind.
pub(crate) fn ray_point_distance(ray: &Ray, p: Vec3) -> Option<(f32, f32)> {
    let along = (p - ray.origin).dot(ray.dir);
    if along < 0.0 {
        return None;
    }
    Some((along, (ray.at(along) - p).length()))
}

/// Upright flame cone in world space, apex up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct FlameCone {
    pub(crate) cx: f32,
    pub(crate) cz: f32,
    pub(crate) r: f32,
    pub(crate) base_y: f32,
    pub(crate) apex_y: f32,
}

impl FlameCone {
    /// Nearest positive hit distance against the side or the base.
    pub(crate) fn hit(&self, ray: &Ray) -> Option<f32> {
        let h = self.apex_y - self.base_y;
        if h <= 1e-6 || self.r <= 1e-6 {
            return None;
        }
        let k = self.r / h;
        let k2 = k * k;
        let ox = ray.origin.x - self.cx;
        let oz = ray.origin.z - self.cz;
        let oy = self.apex_y - ray.origin.y;
        let (dx, dy, dz) = (ray.dir.x, ray.dir.y, ray.dir.z);

        // x² + z² = k² (apex_y - y)²
        let a = dx * dx + dz * dz - k2 * dy * dy;
        let b = 2.0 * (ox * dx + oz * dz + k2 * oy * dy);
        let c = ox * ox + oz * oz - k2 * oy * oy;

        let mut best: Option<f32> = None;
        let mut consider = |t: f32| {
            if t <= 0.0 {
                return;
            }
            let y = ray.origin.y + t * dy;
            if y >= self.base_y && y <= self.apex_y && best.map_or(true, |bt| t < bt) {
                best = Some(t);
            }
        };
        if a.abs() > 1e-9 {
            let disc = b * b - 4.0 * a * c;
            if disc >= 0.0 {
                let s = disc.sqrt();
                consider((-b - s) / (2.0 * a));
                consider((-b + s) / (2.0 * a));
            }
        }
        if dy.abs() > 1e-9 {
            let t = (self.base_y - ray.origin.y) / dy;
            let px = ox + t * dx;
            let pz = oz + t * dz;
            if px * px + pz * pz <= self.r * self.r {
                consider(t);
            }
        }
        best
    }
}

pub(crate) const CAMERA_POS: Vec3 = Vec3::new(0.0, 5.0, 7.0);
pub(crate) const CAMERA_TARGET: Vec3 = Vec3::new(0.0, 1.2, 0.0);
pub(crate) const CAMERA_FOV_DEG: f32 = 45.0;

#[derive(Clone, Copy, Debug)]
pub(crate) struct Camera {
    pos: Vec3,
    forward: Vec3,
    right: Vec3,
    up: Vec3,
    tan_half_fov: f32,
    aspect: f32,
}

impl Camera {
    pub(crate) fn new(aspect: f32) -> Self {
        Self::looking_at(CAMERA_POS, CAMERA_TARGET, CAMERA_FOV_DEG, aspect)
    }

    pub(crate) fn looking_at(pos: Vec3, target: Vec3, fov_deg: f32, aspect: f32) -> Self {
        let forward = (target - pos).normalize();
        let right = forward.cross(Vec3::UP).normalize();
        let up = right.cross(forward);
        Self {
            pos,
            forward,
            right,
            up,
            tan_half_fov: (fov_deg.to_radians() * 0.5).tan(),
            aspect: aspect.max(0.05),
        }
    }

    /// Ray through normalized device coordinates (-1..1, y up).
    pub(crate) fn ray(&self, ndc_x: f32, ndc_y: f32) -> Ray {
        let dir = self.forward
            + self.right * (ndc_x * self.tan_half_fov * self.aspect)
            + self.up * (ndc_y * self.tan_half_fov);
        Ray {
            origin: self.pos,
            dir: dir.normalize(),
        }
    }

    /// World point to NDC; `None` when behind the camera.
    #[cfg(test)]
    pub(crate) fn project(&self, p: Vec3) -> Option<(f32, f32)> {
        let v = p - self.pos;
        let depth = v.dot(self.forward);
        if depth <= 1e-4 {
            return None;
        }
        let x = v.dot(self.right) / (depth * self.tan_half_fov * self.aspect);
        let y = v.dot(self.up) / (depth * self.tan_half_fov);
        Some((x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heart_starts_at_the_notch() {
        let pts = heart_points(18, HEART_RADIUS);
        assert_eq!(pts.len(), 18);
        // t = 0: x = 0, z = -R * (13 - 5 - 2 - 1) / 16
        assert!(pts[0].0.abs() < 1e-6);
        assert!((pts[0].1 + HEART_RADIUS * 5.0 / 16.0).abs() < 1e-6);
    }

    #[test]
    fn heart_is_mirror_symmetric() {
        let pts = heart_points(18, HEART_RADIUS);
        for i in 1..9 {
            let (ax, az) = pts[i];
            let (bx, bz) = pts[18 - i];
            assert!((ax + bx).abs() < 1e-5);
            assert!((az - bz).abs() < 1e-5);
        }
    }

    #[test]
    fn camera_ray_hits_projected_flame() {
        let scene = Scene::new(18, 0.05);
        let cam = Camera::new(1.6);
        let center = scene.flame_center(4).unwrap();
        let (nx, ny) = cam.project(center).unwrap();
        let ray = cam.ray(nx, ny);
        let hit = scene.intersect(&ray, &[4]).unwrap();
        assert_eq!(hit.index, 4);
        assert!((ray.at(hit.distance) - center).length() <= 0.13);
    }

    /// Two candles side by side, looked at head-on along -z.
    fn pair(b: (f32, f32), pick_radius: f32) -> Scene {
        let mut scene = Scene::new(2, pick_radius);
        scene.candles[0].x = 0.0;
        scene.candles[0].z = 0.0;
        scene.candles[1].x = b.0;
        scene.candles[1].z = b.1;
        scene
    }

    fn along_z(x: f32) -> Ray {
        Ray {
            origin: Vec3::new(x, FLAME_CENTER_Y, 5.0),
            dir: Vec3::new(0.0, 0.0, -1.0),
        }
    }

    #[test]
    fn cone_hit_beats_a_nearer_margin() {
        // candle 1 sits in front, 0.1 to the side: inside the margin, outside its cone
        let scene = pair((0.1, 1.0), 0.3);
        let hit = scene.intersect(&along_z(0.0), &[0, 1]).unwrap();
        assert_eq!(hit.index, 0);
    }

    #[test]
    fn margin_ranks_by_distance_from_the_ray() {
        // the ray misses both cones; candle 1 is nearer the camera but farther
        // from the ray
        let scene = pair((0.25, 1.0), 0.3);
        let hit = scene.intersect(&along_z(0.12), &[0, 1]).unwrap();
        assert_eq!(hit.index, 0);
        assert!((hit.distance - 5.0).abs() < 1e-4);

        let tight = pair((0.25, 1.0), 0.1);
        assert!(tight.intersect(&along_z(0.12), &[0, 1]).is_none());
    }

    #[test]
    fn flame_cone_follows_flicker_scale() {
        let mut scene = Scene::new(1, 0.2);
        scene.candles[0].x = 0.0;
        scene.candles[0].z = 0.0;
        let ray = along_z(0.06);
        // radius at the center height is half the base radius
        assert!(scene.flame_cone(0).unwrap().hit(&ray).is_none());
        scene.candles[0].flame.scale_x = 2.0;
        assert!(scene.flame_cone(0).unwrap().hit(&ray).is_some());
    }

    #[test]
    fn cone_narrows_toward_apex() {
        let cone = FlameCone {
            cx: 0.0,
            cz: 0.0,
            r: 0.5,
            base_y: 0.0,
            apex_y: 1.0,
        };
        let at = |y: f32, x: f32| Ray {
            origin: Vec3::new(x, y, -5.0),
            dir: Vec3::new(0.0, 0.0, 1.0),
        };
        // radius at y=0.5 is 0.25
        assert!(cone.hit(&at(0.5, 0.2)).is_some());
        assert!(cone.hit(&at(0.5, 0.3)).is_none());
        assert!(cone.hit(&at(1.2, 0.0)).is_none());
        let t = cone.hit(&at(0.5, 0.0)).unwrap();
        assert!((t - 4.75).abs() < 1e-4);
    }

    #[test]
    fn points_behind_the_ray_are_ignored() {
        let ray = along_z(0.0);
        assert!(ray_point_distance(&ray, Vec3::new(0.0, 0.0, 6.0)).is_none());
        let (along, miss) = ray_point_distance(&ray, Vec3::new(0.3, FLAME_CENTER_Y, 1.0)).unwrap();
        assert!((along - 4.0).abs() < 1e-5);
        assert!((miss - 0.3).abs() < 1e-5);
    }

    #[test]
    fn rotation_moves_flames() {
        let mut scene = Scene::new(18, 0.1);
        let before = scene.flame_center(3).unwrap();
        scene.rotation = 1.0;
        let after = scene.flame_center(3).unwrap();
        assert!((before - after).length() > 0.1);
        assert!((before.y - after.y).abs() < 1e-6);
    }

    #[test]
    fn empty_candidates_never_hit() {
        let scene = Scene::new(18, 10.0);
        let ray = Camera::new(1.0).ray(0.0, 0.0);
        assert!(scene.intersect(&ray, &[]).is_none());
    }
}
