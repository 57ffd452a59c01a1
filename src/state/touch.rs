pub const PULL_THRESHOLD: f64 = 64.0;
/// Finger travel is damped so the indicator lags behind the touch point.
pub const PULL_RESISTANCE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PullPhase {
    Idle,
    Pulling { distance: f64 },
    Armed { distance: f64 },
}

/// Pull-to-refresh gesture tracker for a scrollable list.
#[derive(Debug, Clone, PartialEq)]
pub struct PullToRefresh {
    start_y: Option<f64>,
    phase: PullPhase,
    threshold: f64,
}

impl Default for PullToRefresh {
    fn default() -> Self {
        Self::new(PULL_THRESHOLD)
    }
}

impl PullToRefresh {
    pub fn new(threshold: f64) -> Self {
        Self {
            start_y: None,
            phase: PullPhase::Idle,
            threshold,
        }
    }

    pub fn phase(&self) -> PullPhase {
        self.phase
    }

    pub fn distance(&self) -> f64 {
        match self.phase {
            PullPhase::Idle => 0.0,
            PullPhase::Pulling { distance } | PullPhase::Armed { distance } => distance,
        }
    }

    /// Only starts tracking when the list is scrolled to the top.
    pub fn start(&mut self, y: f64, scroll_top: f64) {
        if scroll_top <= 0.0 {
            self.start_y = Some(y);
            self.phase = PullPhase::Idle;
        }
    }

    pub fn move_to(&mut self, y: f64) {
        let Some(start) = self.start_y else {
            return;
        };

        let distance = ((y - start) * PULL_RESISTANCE).max(0.0);
        self.phase = if distance == 0.0 {
            PullPhase::Idle
        } else if distance >= self.threshold {
            PullPhase::Armed { distance }
        } else {
            PullPhase::Pulling { distance }
        };
    }

    /// Ends the gesture; returns true when a refresh should run.
    pub fn end(&mut self) -> bool {
        let triggered = matches!(self.phase, PullPhase::Armed { .. });
        self.start_y = None;
        self.phase = PullPhase::Idle;
        triggered
    }
}

/// Slide-in drawer used for conversation history on narrow screens.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Drawer {
    open: bool,
}

impl Drawer {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }
}
