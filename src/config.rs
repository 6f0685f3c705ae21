use crate::sim::RotationMode;
use anyhow::{Context, Result};
use clap::Parser;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Parser, Debug, Clone)]
#[command(name = "birthdaycake")]
#[command(about = "Blow out the candles on a 3D birthday cake, right in the terminal", long_about = None)]
pub(crate) struct Args {
    /// FPS cap (render rate)
    #[arg(long)]
    pub(crate) fps: Option<u32>,

    /// Cake rotation once the party starts: per-frame or timed
    #[arg(long, value_enum)]
    pub(crate) rotation: Option<RotationMode>,

    /// Radius of the clickable area around each flame, in world units
    #[arg(long)]
    pub(crate) pick_radius: Option<f32>,

    /// Monochrome output
    #[arg(long, default_value_t = false)]
    pub(crate) no_color: bool,

    /// Confetti seed
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// Write the effective settings back to settings.json
    #[arg(long, default_value_t = false)]
    pub(crate) save_settings: bool,
}

impl Args {
    pub(crate) fn apply(&self, s: &mut Settings) {
        if let Some(fps) = self.fps {
            s.fps_cap = fps;
        }
        if let Some(rotation) = self.rotation {
            s.rotation = rotation;
        }
        if let Some(r) = self.pick_radius {
            s.pick_radius = r;
        }
        if self.no_color {
            s.enable_color = false;
        }
        if let Some(seed) = self.seed {
            s.seed = seed;
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) fps_cap: u32,
    pub(crate) enable_color: bool,
    pub(crate) rotation: RotationMode,
    pub(crate) pick_radius: f32,
    /// Terminal cell width / height.
    pub(crate) cell_aspect: f32,
    pub(crate) hint_text: String,
    pub(crate) banner_text: String,
    pub(crate) seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fps_cap: 60,
            enable_color: true,
            rotation: RotationMode::PerFrame,
            pick_radius: 0.2,
            cell_aspect: 0.5,
            hint_text: "Click a flame to blow it out".to_string(),
            banner_text: "Happy Birthday!".to_string(),
            seed: 0xCA4E_u64,
        }
    }
}

impl Settings {
    pub(crate) fn sanitized(mut self) -> Self {
        self.fps_cap = self.fps_cap.clamp(10, 240);
        if !self.pick_radius.is_finite() {
            self.pick_radius = Settings::default().pick_radius;
        }
        self.pick_radius = self.pick_radius.clamp(0.02, 1.0);
        if !self.cell_aspect.is_finite() {
            self.cell_aspect = Settings::default().cell_aspect;
        }
        self.cell_aspect = self.cell_aspect.clamp(0.2, 1.5);
        self
    }
}

pub(crate) struct Paths {
    pub(crate) settings_path: PathBuf,
    pub(crate) log_path: PathBuf,
}

pub(crate) fn project_paths() -> Result<Paths> {
    let proj = ProjectDirs::from("com", "birthdaycake", "BirthdayCake")
        .context("could not resolve project directories")?;
    let dir = proj.data_local_dir().to_path_buf();
    fs::create_dir_all(&dir)
        .with_context(|| format!("could not create {}", dir.display()))?;
    Ok(Paths {
        settings_path: dir.join("settings.json"),
        log_path: dir.join("birthdaycake.log"),
    })
}

pub(crate) fn load_settings(path: &Path) -> Settings {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            tracing::debug!(path = %path.display(), %err, "no settings file, using defaults");
            return Settings::default();
        }
    };
    match serde_json::from_str::<Settings>(&text) {
        Ok(s) => s,
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "unreadable settings, using defaults");
            Settings::default()
        }
    }
}

pub(crate) fn save_settings_atomic(path: &Path, s: &Settings) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(s)?;
    fs::write(&tmp, data).with_context(|| format!("writing {}", tmp.display()))?;
    atomic_rename(&tmp, path)?;
    Ok(())
}

fn atomic_rename(from: &Path, to: &Path) -> Result<()> {
    // rename-over-existing is not atomic on every platform
    if to.exists() {
        let _ = fs::remove_file(to);
    }
    fs::rename(from, to)?;
    Ok(())
}
