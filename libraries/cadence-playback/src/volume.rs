//! Volume control
//!
//! The session deals in a linear 0.0-1.0 level; mapping that onto a gain
//! curve is up to the media resource.

use serde::{Deserialize, Serialize};

/// Volume level plus mute flag
///
/// Muting preserves the level so unmuting restores it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    /// Volume level (0.0-1.0)
    level: f32,

    /// Mute state
    muted: bool,
}

impl Volume {
    /// Create new volume controller, clamping `level` into 0.0-1.0
    pub fn new(level: f32) -> Self {
        Self {
            level: clamp_level(level),
            muted: false,
        }
    }

    /// Set volume level (clamped to 0.0-1.0)
    pub fn set_level(&mut self, level: f32) {
        self.level = clamp_level(level);
    }

    /// Current volume level, regardless of mute
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Toggle mute state
    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    /// Check if muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Level the media resource should actually play at
    ///
    /// Returns 0.0 if muted.
    pub fn effective(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.level
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(0.7)
    }
}

fn clamp_level(level: f32) -> f32 {
    if level.is_nan() {
        0.0
    } else {
        level.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_creation() {
        let vol = Volume::new(0.5);
        assert_eq!(vol.level(), 0.5);
        assert!(!vol.is_muted());
        assert_eq!(vol.effective(), 0.5);
    }

    #[test]
    fn test_volume_clamping() {
        assert_eq!(Volume::new(1.5).level(), 1.0);
        assert_eq!(Volume::new(-0.2).level(), 0.0);
        assert_eq!(Volume::new(f32::NAN).level(), 0.0);

        let mut vol = Volume::default();
        vol.set_level(7.0);
        assert_eq!(vol.level(), 1.0);
    }

    #[test]
    fn test_mute_preserves_level() {
        let mut vol = Volume::new(0.4);

        vol.toggle_mute();
        assert!(vol.is_muted());
        assert_eq!(vol.effective(), 0.0);
        assert_eq!(vol.level(), 0.4);

        vol.toggle_mute();
        assert!(!vol.is_muted());
        assert_eq!(vol.effective(), 0.4);
    }

    #[test]
    fn test_set_level_while_muted() {
        let mut vol = Volume::new(0.4);
        vol.toggle_mute();
        vol.set_level(0.9);

        assert_eq!(vol.effective(), 0.0);
        vol.toggle_mute();
        assert_eq!(vol.effective(), 0.9);
    }
}
