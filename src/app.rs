use crate::config::{load_settings, project_paths, save_settings_atomic, Args, Paths, Settings};
use crate::effects::Confetti;
use crate::input::{collect_input_nonblocking, InputEvent};
use crate::model::CANDLE_COUNT;
use crate::party::{Party, PartyConfig};
use crate::pick::{Pointer, Surface};
use crate::render::{draw_confetti, draw_overlay, draw_scene, draw_status, Terminal};
use crate::scene::Camera;
use std::time::{Duration, Instant};

pub(crate) struct App {
    settings: Settings,
    party: Party<Confetti>,
    term: Terminal,
    started: Instant,
    should_quit: bool,
}

impl App {
    fn init(args: &Args, paths: &Paths) -> anyhow::Result<Self> {
        let mut settings = load_settings(&paths.settings_path);
        args.apply(&mut settings);
        let settings = settings.sanitized();

        if args.save_settings {
            save_settings_atomic(&paths.settings_path, &settings)?;
            tracing::info!(path = %paths.settings_path.display(), "settings saved");
        }

        let party = Party::new(
            PartyConfig {
                candles: CANDLE_COUNT,
                pick_radius: settings.pick_radius,
                rotation: settings.rotation,
            },
            Confetti::new(settings.seed),
            0,
        );

        let term = Terminal::begin()?;
        tracing::info!(cols = term.cols, rows = term.rows, fps = settings.fps_cap, "party started");

        Ok(Self {
            settings,
            party,
            term,
            started: Instant::now(),
            should_quit: false,
        })
    }

    fn now_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    fn surface(&self) -> Surface {
        Surface::terminal(self.term.cols, self.term.rows)
    }

    fn camera(&self) -> Camera {
        let rows = self.term.rows.max(1) as f32;
        Camera::new(self.term.cols as f32 * self.settings.cell_aspect / rows)
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let frame_dt = Duration::from_secs_f32(1.0 / self.settings.fps_cap as f32);
        let mut last_frame = Instant::now();

        while !self.should_quit {
            if self.term.resize_if_needed()? {
                tracing::debug!(cols = self.term.cols, rows = self.term.rows, "resized");
            }

            // input
            let (surface, camera) = (self.surface(), self.camera());
            let events = collect_input_nonblocking(frame_dt)?;
            for ev in events {
                match ev {
                    InputEvent::Quit => {
                        self.should_quit = true;
                        break;
                    }
                    InputEvent::PointerDown { column, row } => {
                        let now = self.now_ms();
                        self.party
                            .pointer_down(now, Pointer::from_cell(column, row), &surface, &camera);
                    }
                    // picked up by resize_if_needed next frame
                    InputEvent::Resize => {}
                }
            }

            // state
            let now = Instant::now();
            let real_dt = now.saturating_duration_since(last_frame);
            last_frame = now;
            self.party.frame(self.now_ms());
            self.party.effects_mut().step(real_dt.as_secs_f32());

            // render
            self.render_frame()?;

            // frame cap
            spin_sleep(frame_dt, Instant::now());
        }

        self.term.end()?;
        tracing::info!(
            lit = self.party.flames().lit_count(),
            phase = ?self.party.celebration().phase(),
            celebrated_at_ms = ?self.party.celebration().triggered_at(),
            bursts = self.party.effects().bursts(),
            hint = ?self.party.hint().state(),
            "party over"
        );
        Ok(())
    }

    fn render_frame(&mut self) -> anyhow::Result<()> {
        let color = self.settings.enable_color;
        let scene = self.party.scene();
        let background = scene.background;
        let bg = if color {
            background.to_color()
        } else {
            crossterm::style::Color::Black
        };
        let (surface, camera) = (self.surface(), self.camera());

        self.term.cur.clear(bg);
        draw_scene(&mut self.term.cur, scene, &camera, &surface, color);
        draw_confetti(&mut self.term.cur, self.party.effects().particles(), background, color);
        draw_overlay(
            &mut self.term.cur,
            self.party.overlay(),
            &self.settings.hint_text,
            &self.settings.banner_text,
            background,
            color,
        );
        let flames = self.party.flames();
        draw_status(&mut self.term.cur, flames.lit_count(), flames.len(), background, color);

        self.term.present(true)?;
        Ok(())
    }
}

pub(crate) fn run(args: Args) -> anyhow::Result<()> {
    let paths = project_paths()?;
    crate::logging::init_tracing(Some(paths.log_path.as_path()));

    let mut app = App::init(&args, &paths)?;
    let result = app.run();
    if result.is_err() {
        // leave the user with a usable terminal
        let _ = app.term.end();
    }
    result
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, now: Instant) {
    let end = now + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(left - Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}
