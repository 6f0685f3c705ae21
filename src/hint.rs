use crate::model::Overlay;
use crate::timers::{Deferred, TimerId, Timers};
use crate::tween::{Easing, Property, Tweens};

pub(crate) const HINT_DELAY_MS: u64 = 3000;
pub(crate) const HINT_FADE_MS: u64 = 500;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum HintState {
    NotShown,
    Shown,
    /// Terminal: the hint never appears again.
    Suppressed,
}

#[derive(Clone, Debug)]
pub(crate) struct Hint {
    state: HintState,
    timer: Option<TimerId>,
}

impl Hint {
    /// Hidden, with the show timer armed.
    pub(crate) fn arm(now_ms: u64, timers: &mut Timers) -> Self {
        let timer = timers.schedule(now_ms + HINT_DELAY_MS, Deferred::ShowHint);
        Self {
            state: HintState::NotShown,
            timer: Some(timer),
        }
    }

    pub(crate) fn state(&self) -> HintState {
        self.state
    }

    /// The show timer fired. State is re-checked here, not only at arm time.
    pub(crate) fn on_timer(&mut self, celebration_started: bool, overlay: &mut Overlay) -> bool {
        self.timer = None;
        if self.state != HintState::NotShown || celebration_started {
            tracing::debug!(state = ?self.state, celebration_started, "hint timer ignored");
            return false;
        }
        self.state = HintState::Shown;
        overlay.hint = 1.0;
        tracing::info!("hint shown");
        true
    }

    /// First successful extinguish. Returns true if a fade-out was started.
    pub(crate) fn on_interaction(
        &mut self,
        now_ms: u64,
        timers: &mut Timers,
        tweens: &mut Tweens,
        overlay: &Overlay,
    ) -> bool {
        if self.state == HintState::Suppressed {
            return false;
        }
        if let Some(id) = self.timer.take() {
            timers.cancel(id);
        }
        let was_shown = self.state == HintState::Shown;
        self.state = HintState::Suppressed;
        if was_shown {
            tweens.animate(
                Property::HintOpacity,
                overlay.hint,
                0.0,
                HINT_FADE_MS,
                Easing::EaseInOutQuad,
                now_ms,
            );
        }
        tracing::debug!(was_shown, "hint suppressed");
        was_shown
    }
}
