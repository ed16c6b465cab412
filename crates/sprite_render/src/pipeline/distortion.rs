use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Wave and wobble parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    /// Peak vertical offset in pixels.
    pub amplitude: f64,
    /// Angular frequency of the vertical wave in rad/s.
    pub wave_frequency: f64,
    /// Peak rotation in radians.
    pub max_angle: f64,
    /// Angular frequency of the rotation wobble in rad/s.
    pub rotation_frequency: f64,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self { amplitude: 10.0, wave_frequency: 4.0, max_angle: 0.1, rotation_frequency: 2.0 }
    }
}

/// Where the host should draw the current frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Placement {
    /// Top-left corner before rotation.
    pub x: f64,
    pub y: f64,
    /// Rotation about the sprite centre, in radians.
    pub angle: f64,
}

#[derive(Clone, Copy, Debug, Default)]
struct Effect {
    enabled: bool,
    elapsed: Duration,
}

impl Effect {
    fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.elapsed = Duration::ZERO;
        self.enabled
    }

    fn tick(&mut self, dt: Duration) {
        if self.enabled {
            self.elapsed = self.elapsed.saturating_add(dt);
        }
    }

    fn phase(&self, frequency: f64) -> f64 {
        if self.enabled {
            (self.elapsed.as_secs_f64() * frequency).sin()
        } else {
            0.0
        }
    }
}

/// Time driven vertical wave plus optional rotation wobble.
///
/// Each effect keeps its own clock, which restarts at zero on every toggle.
#[derive(Clone, Debug, Default)]
pub struct Distortion {
    config: WaveConfig,
    wave: Effect,
    rotation: Effect,
}

impl Distortion {
    pub fn new(config: WaveConfig) -> Self {
        Self { config, ..Default::default() }
    }

    pub fn config(&self) -> &WaveConfig {
        &self.config
    }

    pub fn wave_enabled(&self) -> bool {
        self.wave.enabled
    }

    pub fn rotation_enabled(&self) -> bool {
        self.rotation.enabled
    }

    pub fn wave_elapsed(&self) -> Duration {
        self.wave.elapsed
    }

    pub fn rotation_elapsed(&self) -> Duration {
        self.rotation.elapsed
    }

    pub fn toggle_wave(&mut self) -> bool {
        self.wave.toggle()
    }

    pub fn toggle_rotation(&mut self) -> bool {
        self.rotation.toggle()
    }

    pub fn update(&mut self, dt: Duration) {
        self.wave.tick(dt);
        self.rotation.tick(dt);
    }

    /// Vertical offset in pixels; zero while the wave is off.
    pub fn offset(&self) -> f64 {
        self.config.amplitude * self.wave.phase(self.config.wave_frequency)
    }

    /// Rotation in radians; zero while the wobble is off.
    pub fn angle(&self) -> f64 {
        self.config.max_angle * self.rotation.phase(self.config.rotation_frequency)
    }

    pub fn place(&self, x: f64, y: f64) -> Placement {
        Placement { x, y: y + self.offset(), angle: self.angle() }
    }
}
