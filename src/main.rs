mod app;
mod celebrate;
mod config;
mod effects;
mod flames;
mod hint;
mod input;
mod logging;
mod model;
mod party;
mod pick;
mod render;
mod scene;
mod sim;
mod timers;
mod tween;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    app::run(config::Args::parse())
}
