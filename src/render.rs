use crate::effects::Particle;
use crate::model::{Overlay, Rgb, Vec3};
use crate::pick::{Pointer, Surface};
use crate::scene::{
    Camera, FlameCone, Ray, Scene, BOTTOM_TIER_COLOR, BOTTOM_TIER_RADIUS, BOTTOM_TIER_Y,
    CANDLE_COLOR, CANDLE_RADIUS, CANDLE_Y, FLAME_CENTER_Y, FLAME_COLOR, FLAME_HEIGHT,
    FLAME_LIGHT_COLOR, FLAME_LIGHT_DISTANCE, HEMI_GROUND, HEMI_SKY, OVERHEAD_LIGHT_COLOR,
    OVERHEAD_LIGHT_DISTANCE, OVERHEAD_LIGHT_POS, PLATE_COLOR, PLATE_RADIUS, PLATE_Y,
    TOP_TIER_COLOR, TOP_TIER_RADIUS, TOP_TIER_Y,
};
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::f32::consts::PI;
use std::io::{self, Write};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
    pub(crate) bold: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg: Color::Black,
            bold: false,
        }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }
    pub(crate) fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    pub(crate) fn get(&self, x: u16, y: u16) -> Option<Cell> {
        (x < self.w && y < self.h).then(|| self.cells[self.idx(x, y)])
    }
    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }
    pub(crate) fn clear(&mut self, bg: Color) {
        for c in &mut self.cells {
            c.ch = ' ';
            c.fg = Color::White;
            c.bg = bg;
            c.bold = false;
        }
    }
}

pub(crate) struct Terminal {
    pub(crate) out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    pub(crate) prev: CellBuffer,
    pub(crate) cur: CellBuffer,
}

impl Terminal {
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            DisableLineWrap,
            terminal::Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        let (cols, rows) = terminal::size()?;
        Ok(Self {
            out,
            cols,
            rows,
            prev: CellBuffer::new(cols, rows),
            cur: CellBuffer::new(cols, rows),
        })
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            ResetColor,
            SetAttribute(Attribute::Reset),
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            EndSynchronizedUpdate,
            DisableMouseCapture,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub(crate) fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (c, r) = terminal::size()?;
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        self.cols = c;
        self.rows = r;
        self.prev = CellBuffer::new(c, r);
        self.cur = CellBuffer::new(c, r);
        queue!(self.out, Clear(ClearType::All))?;
        Ok(true)
    }

    pub(crate) fn present(&mut self, diff_only: bool) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bg = None;
        let mut last_bold = false;

        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if diff_only && c == self.prev.cells[i] {
                    continue;
                }

                queue!(self.out, cursor::MoveTo(x, y))?;

                if c.bold != last_bold {
                    let attr = if c.bold {
                        Attribute::Bold
                    } else {
                        Attribute::NormalIntensity
                    };
                    queue!(self.out, SetAttribute(attr))?;
                    last_bold = c.bold;
                }
                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg))?;
                    last_fg = Some(c.fg);
                }
                if last_bg != Some(c.bg) {
                    queue!(self.out, SetBackgroundColor(c.bg))?;
                    last_bg = Some(c.bg);
                }

                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(
            self.out,
            SetAttribute(Attribute::Reset),
            ResetColor,
            EndSynchronizedUpdate
        )?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }
}

/* -----------------------------
   Braille encoding: 2×4 pixels -> U+2800..U+28FF
------------------------------ */

fn braille_bit(dx: usize, dy: usize) -> u8 {
    // Dot mapping:
    // (0,0)=1 (0,1)=2 (0,2)=4 (0,3)=64
    // (1,0)=8 (1,1)=16 (1,2)=32 (1,3)=128
    match (dx, dy) {
        (0, 0) => 0x01,
        (0, 1) => 0x02,
        (0, 2) => 0x04,
        (0, 3) => 0x40,
        (1, 0) => 0x08,
        (1, 1) => 0x10,
        (1, 2) => 0x20,
        (1, 3) => 0x80,
        _ => 0x00,
    }
}

fn bayer_2x4_threshold(ix: usize, iy: usize) -> f32 {
    // 2x4 ordered dither, values 0..7 -> 0..1
    const M: [[u8; 2]; 4] = [[0, 4], [6, 2], [1, 5], [7, 3]];
    let v = M[iy & 3][ix & 1] as f32;
    (v + 0.5) / 8.0
}

/* -----------------------------
   Ray tracing the cake
------------------------------ */

/// Upright cylinder; only the side and the top cap are ever seen from the
/// camera, so the bottom cap is not tested.
#[derive(Clone, Copy, Debug)]
struct Cylinder {
    cx: f32,
    cz: f32,
    r: f32,
    y0: f32,
    y1: f32,
    albedo: Rgb,
}

impl Cylinder {
    fn hit(&self, ray: &Ray) -> Option<(f32, Vec3)> {
        let ox = ray.origin.x - self.cx;
        let oz = ray.origin.z - self.cz;
        let (dx, dy, dz) = (ray.dir.x, ray.dir.y, ray.dir.z);
        let mut best: Option<(f32, Vec3)> = None;

        let a = dx * dx + dz * dz;
        if a > 1e-9 {
            let b = 2.0 * (ox * dx + oz * dz);
            let c = ox * ox + oz * oz - self.r * self.r;
            let disc = b * b - 4.0 * a * c;
            if disc >= 0.0 {
                let t = (-b - disc.sqrt()) / (2.0 * a);
                let y = ray.origin.y + t * dy;
                if t > 0.0 && y >= self.y0 && y <= self.y1 {
                    let n = Vec3::new(ox + t * dx, 0.0, oz + t * dz).normalize();
                    best = Some((t, n));
                }
            }
        }

        if dy.abs() > 1e-9 {
            let t = (self.y1 - ray.origin.y) / dy;
            let px = ox + t * dx;
            let pz = oz + t * dz;
            if t > 0.0 && px * px + pz * pz <= self.r * self.r && best.map_or(true, |(bt, _)| t < bt) {
                best = Some((t, Vec3::UP));
            }
        }
        best
    }
}

struct PointLight {
    pos: Vec3,
    color: Vec3,
    intensity: f32,
    distance: f32,
}

/// Per-frame, world-space snapshot of the scene.
struct Frame {
    solids: Vec<Cylinder>,
    /// Visible flames with their opacity.
    flames: Vec<(FlameCone, f32)>,
    lights: Vec<PointLight>,
    ambient: Vec3,
    hemi_sky: Vec3,
    hemi_ground: Vec3,
    hemi: f32,
    bound: Cylinder,
}

impl Frame {
    fn build(scene: &Scene) -> Self {
        let mid = |r: (f32, f32)| 0.5 * (r.0 + r.1);
        let mut solids = vec![
            Cylinder {
                cx: 0.0,
                cz: 0.0,
                r: PLATE_RADIUS,
                y0: PLATE_Y.0,
                y1: PLATE_Y.1,
                albedo: PLATE_COLOR,
            },
            Cylinder {
                cx: 0.0,
                cz: 0.0,
                r: mid(BOTTOM_TIER_RADIUS),
                y0: BOTTOM_TIER_Y.0,
                y1: BOTTOM_TIER_Y.1,
                albedo: BOTTOM_TIER_COLOR,
            },
            Cylinder {
                cx: 0.0,
                cz: 0.0,
                r: mid(TOP_TIER_RADIUS),
                y0: TOP_TIER_Y.0,
                y1: TOP_TIER_Y.1,
                albedo: TOP_TIER_COLOR,
            },
        ];
        let mut flames = Vec::new();
        let mut lights = vec![PointLight {
            pos: OVERHEAD_LIGHT_POS,
            color: OVERHEAD_LIGHT_COLOR.linear(),
            intensity: scene.overhead_light,
            distance: OVERHEAD_LIGHT_DISTANCE,
        }];

        for (i, c) in scene.candles.iter().enumerate() {
            let p = scene.to_world(Vec3::new(c.x, 0.0, c.z));
            solids.push(Cylinder {
                cx: p.x,
                cz: p.z,
                r: CANDLE_RADIUS,
                y0: CANDLE_Y.0,
                y1: CANDLE_Y.1,
                albedo: CANDLE_COLOR,
            });
            if c.flame.visible && c.flame.opacity > 0.0 {
                if let Some(cone) = scene.flame_cone(i) {
                    flames.push((cone, c.flame.opacity));
                }
            }
            if c.light > 0.0 {
                if let Some(pos) = scene.flame_light_pos(i) {
                    lights.push(PointLight {
                        pos,
                        color: FLAME_LIGHT_COLOR.linear(),
                        intensity: c.light,
                        distance: FLAME_LIGHT_DISTANCE,
                    });
                }
            }
        }

        let top = FLAME_CENTER_Y + FLAME_HEIGHT;
        Self {
            solids,
            flames,
            lights,
            ambient: Rgb::WHITE.linear() * scene.ambient_light,
            hemi_sky: HEMI_SKY.linear(),
            hemi_ground: HEMI_GROUND.linear(),
            hemi: scene.hemi_light,
            bound: Cylinder {
                cx: 0.0,
                cz: 0.0,
                r: PLATE_RADIUS + 0.1,
                y0: PLATE_Y.0,
                y1: top,
                albedo: Rgb::BLACK,
            },
        }
    }

    fn shade(&self, p: Vec3, n: Vec3, albedo: Rgb) -> Rgb {
        let mut irradiance = self.ambient;
        if self.hemi > 0.0 {
            let w = 0.5 * n.y + 0.5;
            let sky = self.hemi_ground * (1.0 - w) + self.hemi_sky * w;
            irradiance = irradiance + sky * self.hemi;
        }
        for l in &self.lights {
            if l.intensity <= 0.0 {
                continue;
            }
            let to = l.pos - p;
            let d = to.length();
            let ndotl = n.dot(to * (1.0 / d.max(1e-6)));
            if ndotl <= 0.0 {
                continue;
            }
            let falloff = distance_attenuation(d, l.distance, 2.0);
            irradiance = irradiance + l.color * (l.intensity * ndotl * falloff);
        }
        // Lambert: albedo / π
        Rgb::from_linear(albedo.linear().hadamard(irradiance) * (1.0 / PI))
    }

    /// Color of one subpixel, or `None` for background.
    fn sample(&self, ray: &Ray, dither: f32) -> Option<Rgb> {
        let mut solid: Option<(f32, Vec3, Rgb)> = None;
        if self.bound.hit(ray).is_some() || ray.origin.y < self.bound.y1 {
            for s in &self.solids {
                if let Some((t, n)) = s.hit(ray) {
                    if solid.map_or(true, |(bt, _, _)| t < bt) {
                        solid = Some((t, n, s.albedo));
                    }
                }
            }
        }

        let mut flame: Option<(f32, f32)> = None;
        for (f, opacity) in &self.flames {
            if let Some(t) = f.hit(ray) {
                if flame.map_or(true, |(bt, _)| t < bt) {
                    flame = Some((t, *opacity));
                }
            }
        }

        let surface = solid.map(|(t, n, albedo)| (t, self.shade(ray.at(t), n, albedo)));
        match (surface, flame) {
            (Some((st, color)), Some((ft, alpha))) if ft < st => Some(color.mix(FLAME_COLOR, alpha)),
            (Some((_, color)), _) => Some(color),
            (None, Some((_, alpha))) => (alpha > dither).then_some(FLAME_COLOR),
            (None, None) => None,
        }
    }
}

/// three.js-style point light falloff with a smooth cutoff at `cutoff`.
fn distance_attenuation(d: f32, cutoff: f32, decay: f32) -> f32 {
    let mut falloff = 1.0 / d.powf(decay).max(0.01);
    if cutoff > 0.0 {
        let x = d / cutoff;
        let window = (1.0 - x * x * x * x).clamp(0.0, 1.0);
        falloff *= window * window;
    }
    falloff
}

pub(crate) fn draw_scene(
    buf: &mut CellBuffer,
    scene: &Scene,
    camera: &Camera,
    surface: &Surface,
    enable_color: bool,
) {
    let frame = Frame::build(scene);
    let bg = if enable_color {
        scene.background.to_color()
    } else {
        Color::Black
    };

    for cy in 0..buf.h {
        for cx in 0..buf.w {
            let mut mask: u8 = 0;
            let (mut sum_r, mut sum_g, mut sum_b, mut ink) = (0u32, 0u32, 0u32, 0u32);

            for dy in 0..4usize {
                for dx in 0..2usize {
                    let p = Pointer {
                        x: cx as f32 + (dx as f32 + 0.5) / 2.0,
                        y: cy as f32 + (dy as f32 + 0.5) / 4.0,
                    };
                    let Some((nx, ny)) = surface.to_ndc(p) else {
                        continue;
                    };
                    let ray = camera.ray(nx, ny);
                    let dither = bayer_2x4_threshold(cx as usize * 2 + dx, cy as usize * 4 + dy);
                    if let Some(c) = frame.sample(&ray, dither) {
                        mask |= braille_bit(dx, dy);
                        sum_r += c.r as u32;
                        sum_g += c.g as u32;
                        sum_b += c.b as u32;
                        ink += 1;
                    }
                }
            }

            if ink == 0 {
                continue;
            }
            let ch = char::from_u32(0x2800 + mask as u32).unwrap_or(' ');
            let fg = if enable_color {
                Color::Rgb {
                    r: (sum_r / ink) as u8,
                    g: (sum_g / ink) as u8,
                    b: (sum_b / ink) as u8,
                }
            } else {
                Color::White
            };
            buf.set(
                cx,
                cy,
                Cell {
                    ch,
                    fg,
                    bg,
                    bold: false,
                },
            );
        }
    }
}

pub(crate) fn draw_confetti(buf: &mut CellBuffer, particles: &[Particle], background: Rgb, enable_color: bool) {
    let (w, h) = (buf.w as f32, buf.h as f32);
    for p in particles {
        if p.x < 0.0 || p.y < 0.0 {
            continue;
        }
        let (x, y) = ((p.x * w) as u16, (p.y * h) as u16);
        let Some(under) = buf.get(x, y) else {
            continue;
        };
        let fg = if enable_color {
            background.mix(p.color, p.fade()).to_color()
        } else {
            Color::White
        };
        buf.set(
            x,
            y,
            Cell {
                ch: p.glyph,
                fg,
                bg: under.bg,
                bold: false,
            },
        );
    }
}

pub(crate) fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color, bold: bool) {
    for (i, ch) in s.chars().enumerate() {
        let xx = x.saturating_add(i as u16);
        if xx >= buf.w || y >= buf.h {
            break;
        }
        let bg = buf.cells[buf.idx(xx, y)].bg;
        buf.set(xx, y, Cell { ch, fg, bg, bold });
    }
}

pub(crate) const HINT_COLOR: Rgb = Rgb::hex(0xfff5d7);
pub(crate) const BANNER_COLOR: Rgb = Rgb::hex(0xff5e7e);
const TEXT_MIN_OPACITY: f32 = 0.05;

/// Hint near the bottom, banner near the top, both faded into the background.
pub(crate) fn draw_overlay(
    buf: &mut CellBuffer,
    overlay: &Overlay,
    hint: &str,
    banner: &str,
    background: Rgb,
    enable_color: bool,
) {
    if buf.h == 0 {
        return;
    }
    let bottom = buf.h.saturating_sub(3);
    let top = 2u16.min(buf.h - 1);
    let mut centered = |row: u16, text: &str, color: Rgb, opacity: f32, bold: bool| {
        if opacity < TEXT_MIN_OPACITY {
            return;
        }
        let len = text.chars().count() as u16;
        let x = buf.w.saturating_sub(len) / 2;
        let fg = if enable_color {
            background.mix(color, opacity).to_color()
        } else {
            Color::White
        };
        draw_text(buf, x, row, text, fg, bold);
    };
    centered(bottom, hint, HINT_COLOR, overlay.hint, false);
    centered(top, banner, BANNER_COLOR, overlay.banner, true);
}

pub(crate) fn draw_status(buf: &mut CellBuffer, lit: usize, total: usize, background: Rgb, enable_color: bool) {
    let fg = if enable_color {
        let ink = if background.luma() > 0.5 {
            Rgb::hex(0x6a5a60)
        } else {
            Rgb::hex(0x8a8a8a)
        };
        ink.to_color()
    } else {
        Color::White
    };
    let line = format!(" {lit}/{total} lit | q quit");
    draw_text(buf, 0, buf.h.saturating_sub(1), &line, fg, false);
}
