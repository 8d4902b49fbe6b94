//! Owned resource slot with generation tracking
//!
//! The slot holds at most one [`MediaResource`]. Every install or release
//! bumps the generation, so anything still holding an older generation
//! (an armed poll timer, a queued tick) can detect that its handle is gone.

use crate::media::MediaResource;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one installed resource within a session
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Generation(u64);

impl Generation {
    /// Raw counter value
    pub fn get(self) -> u64 {
        self.0
    }

    fn bump(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Exclusive owner of the session's single media resource
pub struct ResourceSlot {
    generation: Generation,
    resource: Option<Box<dyn MediaResource>>,
}

impl ResourceSlot {
    /// Create an empty slot at generation 0
    pub fn new() -> Self {
        Self {
            generation: Generation::default(),
            resource: None,
        }
    }

    /// Generation of the live resource (or of the last release)
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Check if a resource is installed
    pub fn is_loaded(&self) -> bool {
        self.resource.is_some()
    }

    /// Whether `generation` still refers to the installed resource
    pub fn is_current(&self, generation: Generation) -> bool {
        self.resource.is_some() && self.generation == generation
    }

    /// Release whatever is installed, then install `resource`
    ///
    /// Returns the new resource's generation.
    pub fn install(&mut self, resource: Box<dyn MediaResource>) -> Generation {
        self.release();
        self.generation = self.generation.bump();
        self.resource = Some(resource);
        self.generation
    }

    /// Pause and release the installed resource
    ///
    /// Always invalidates the current generation. Returns whether a
    /// resource was actually released.
    pub fn release(&mut self) -> bool {
        self.generation = self.generation.bump();
        match self.resource.take() {
            Some(mut resource) => {
                resource.pause();
                resource.release();
                true
            }
            None => false,
        }
    }

    pub fn get(&self) -> Option<&dyn MediaResource> {
        self.resource.as_deref()
    }

    pub fn get_mut(&mut self) -> Option<&mut (dyn MediaResource + 'static)> {
        self.resource.as_deref_mut()
    }
}

impl Default for ResourceSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ResourceSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceSlot")
            .field("generation", &self.generation)
            .field("loaded", &self.resource.is_some())
            .finish()
    }
}

impl Drop for ResourceSlot {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct CountingResource {
        releases: Arc<AtomicUsize>,
    }

    impl MediaResource for CountingResource {
        fn play(&mut self) -> Result<()> {
            Ok(())
        }
        fn pause(&mut self) {}
        fn set_volume(&mut self, _volume: f32) {}
        fn position(&self) -> Duration {
            Duration::ZERO
        }
        fn duration(&self) -> Option<Duration> {
            None
        }
        fn is_ended(&self) -> bool {
            false
        }
        fn seek(&mut self, _position: Duration) -> Result<()> {
            Ok(())
        }
        fn release(&mut self) {
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn counting(releases: &Arc<AtomicUsize>) -> Box<dyn MediaResource> {
        Box::new(CountingResource {
            releases: Arc::clone(releases),
        })
    }

    #[test]
    fn install_releases_previous() {
        let releases = Arc::new(AtomicUsize::new(0));
        let mut slot = ResourceSlot::new();

        let first = slot.install(counting(&releases));
        assert!(slot.is_current(first));
        assert_eq!(releases.load(Ordering::SeqCst), 0);

        let second = slot.install(counting(&releases));
        assert!(second > first);
        assert!(!slot.is_current(first));
        assert!(slot.is_current(second));
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn release_invalidates_generation() {
        let releases = Arc::new(AtomicUsize::new(0));
        let mut slot = ResourceSlot::new();
        let generation = slot.install(counting(&releases));

        assert!(slot.release());
        assert!(!slot.is_current(generation));
        assert!(!slot.is_loaded());

        // Second release has nothing to free
        assert!(!slot.release());
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_releases_resource() {
        let releases = Arc::new(AtomicUsize::new(0));
        {
            let mut slot = ResourceSlot::new();
            slot.install(counting(&releases));
        }
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn empty_slot_has_no_current_generation() {
        let slot = ResourceSlot::new();
        assert!(!slot.is_current(slot.generation()));
        assert_eq!(slot.generation().to_string(), "#0");
    }
}
