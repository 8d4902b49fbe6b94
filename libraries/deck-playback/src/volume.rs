//! Volume control with mute
//!
//! Level is a linear slider value in `[0.0, 1.0]`. Mute is tracked
//! separately so unmuting restores the previous level.

/// Default slider level for a fresh session
pub const DEFAULT_LEVEL: f32 = 0.6;

/// Volume level plus mute flag
///
/// Dragging the slider to zero mutes; dragging it back up unmutes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeState {
    /// Volume level (0.0-1.0)
    level: f32,

    /// Mute state (preserves volume level)
    muted: bool,
}

impl VolumeState {
    /// Create new volume state, clamping `level` into range
    ///
    /// A zero level starts muted, same as `set_level(0.0)`.
    pub fn new(level: f32) -> Self {
        let mut state = Self {
            level: 0.0,
            muted: false,
        };
        state.set_level(level);
        state
    }

    /// Set volume level (0.0-1.0)
    ///
    /// Out-of-range values are clamped and NaN is treated as 0.
    pub fn set_level(&mut self, value: f32) {
        let value = if value.is_nan() {
            0.0
        } else {
            value.clamp(0.0, 1.0)
        };

        self.level = value;
        if value == 0.0 {
            self.muted = true;
        } else if self.muted {
            self.muted = false;
        }
    }

    /// Get current volume level (0.0-1.0)
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Toggle mute state without touching the level
    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    /// Mute audio (preserves volume level)
    pub fn mute(&mut self) {
        self.muted = true;
    }

    /// Unmute audio (restores previous volume)
    pub fn unmute(&mut self) {
        self.muted = false;
    }

    /// Check if muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Volume actually applied to output
    ///
    /// Returns 0.0 if muted, otherwise the level
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.level
        }
    }

    /// Position the slider should be drawn at
    pub fn slider_value(&self) -> f32 {
        self.effective_volume()
    }
}

impl Default for VolumeState {
    fn default() -> Self {
        Self::new(DEFAULT_LEVEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_volume() {
        let vol = VolumeState::default();
        assert_eq!(vol.level(), 0.6);
        assert!(!vol.is_muted());
        assert_eq!(vol.effective_volume(), 0.6);
    }

    #[test]
    fn set_volume_level_clamps() {
        let mut vol = VolumeState::new(0.5);
        assert_eq!(vol.level(), 0.5);

        vol.set_level(1.7);
        assert_eq!(vol.level(), 1.0);

        vol.set_level(-0.2);
        assert_eq!(vol.level(), 0.0);
        assert!(vol.is_muted());
    }

    #[test]
    fn nan_level_mutes() {
        let mut vol = VolumeState::new(0.8);
        vol.set_level(f32::NAN);
        assert_eq!(vol.level(), 0.0);
        assert!(vol.is_muted());
    }

    #[test]
    fn zero_level_mutes_and_raising_unmutes() {
        let mut vol = VolumeState::new(0.6);
        assert_eq!(vol.effective_volume(), 0.6);

        vol.set_level(0.0);
        assert!(vol.is_muted());
        assert_eq!(vol.effective_volume(), 0.0);

        vol.set_level(0.3);
        assert!(!vol.is_muted());
        assert_eq!(vol.effective_volume(), 0.3);
    }

    #[test]
    fn raising_level_clears_manual_mute() {
        let mut vol = VolumeState::new(0.8);
        vol.toggle_mute();
        assert!(vol.is_muted());

        vol.set_level(0.5);
        assert!(!vol.is_muted());
        assert_eq!(vol.effective_volume(), 0.5);
    }

    #[test]
    fn toggle_mute_preserves_level() {
        let mut vol = VolumeState::new(0.8);

        vol.toggle_mute();
        assert!(vol.is_muted());
        assert_eq!(vol.level(), 0.8);
        assert_eq!(vol.effective_volume(), 0.0);
        assert_eq!(vol.slider_value(), 0.0);

        vol.toggle_mute();
        assert!(!vol.is_muted());
        assert_eq!(vol.effective_volume(), 0.8);
    }

    #[test]
    fn mute_unmute() {
        let mut vol = VolumeState::new(0.4);
        vol.mute();
        assert!(vol.is_muted());
        vol.unmute();
        assert!(!vol.is_muted());
        assert_eq!(vol.level(), 0.4);
    }

    #[test]
    fn new_with_zero_starts_muted() {
        let vol = VolumeState::new(0.0);
        assert!(vol.is_muted());
        assert_eq!(vol.effective_volume(), 0.0);
    }
}
