//! Time and motion: the world clock and orbital paths.

use std::time::{Duration, Instant};

use glam::Vec3;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ORBIT_RADIUS: f32 = 404.0;
pub const DEFAULT_ORBIT_PERIOD: f32 = 20.0;

/// Circular orbit in the XZ plane around the parent origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orbit {
    pub radius: f32,
    /// Seconds per revolution
    pub period: f32,
    /// Seconds added to the clock before computing progress
    pub offset: f32,
}

impl Default for Orbit {
    fn default() -> Self {
        Self {
            radius: DEFAULT_ORBIT_RADIUS,
            period: DEFAULT_ORBIT_PERIOD,
            offset: 0.0,
        }
    }
}

impl Orbit {
    /// Angle in radians at `elapsed` seconds, in `[0, 2π)`.
    pub fn angle_at(&self, elapsed: f32) -> f32 {
        if self.period <= 0.0 || !self.period.is_finite() {
            return 0.0;
        }
        let progression = (elapsed + self.offset).rem_euclid(self.period);
        progression / self.period * std::f32::consts::TAU
    }

    /// Position on the orbit at `elapsed` seconds.
    pub fn position_at(&self, elapsed: f32) -> Vec3 {
        let angle = self.angle_at(elapsed);
        Vec3::new(angle.cos() * self.radius, 0.0, angle.sin() * self.radius)
    }
}

/// How an element moves over time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Motion {
    #[default]
    Static,
    Orbit(Orbit),
}

impl Motion {
    /// Position at `elapsed` seconds, or `None` when the element does not move.
    pub fn position_at(&self, elapsed: f32) -> Option<Vec3> {
        match self {
            Motion::Static => None,
            Motion::Orbit(orbit) => Some(orbit.position_at(elapsed)),
        }
    }
}

/// World clock shared by all elements.
#[derive(Debug, Clone)]
pub struct Clock {
    start: Instant,
    /// Manual offset added by [`Clock::advance`]
    skew: Duration,
    paused_at: Option<Duration>,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            skew: Duration::ZERO,
            paused_at: None,
        }
    }

    /// A clock frozen at zero that only moves through [`Clock::advance`].
    pub fn manual() -> Self {
        Self {
            paused_at: Some(Duration::ZERO),
            ..Self::new()
        }
    }

    /// Seconds since the clock started.
    pub fn elapsed(&self) -> f32 {
        let base = self.paused_at.unwrap_or_else(|| self.start.elapsed());
        (base + self.skew).as_secs_f32()
    }

    pub fn advance(&mut self, by: Duration) {
        self.skew += by;
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub fn pause(&mut self) {
        if self.paused_at.is_none() {
            self.paused_at = Some(self.start.elapsed());
        }
    }

    pub fn resume(&mut self) {
        if let Some(paused) = self.paused_at.take() {
            // Shift the start so elapsed time continues from where it stopped
            let now = Instant::now();
            self.start = now.checked_sub(paused).unwrap_or(now);
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
