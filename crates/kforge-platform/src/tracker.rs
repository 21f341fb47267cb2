//! Platform switch detection.
//!
//! Building for one platform after another without cleaning would leak the
//! previous platform's linker script and objects into the new build. The
//! tracker keeps at most one platform's build in the working tree: entering
//! pre-build for a platform without a marker cleans whichever platform does
//! have one, then marks the new platform.

use crate::error::{PlatformError, Result};
use crate::marker::{MarkerRecord, MarkerStore};
use crate::mode::BuildMode;

/// What `ensure_clean_switch` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// The platform already had a marker; nothing was cleaned.
    AlreadyCurrent,
    /// No marker existed anywhere; the platform was marked.
    Fresh,
    /// Another platform's build was cleaned before marking this one.
    Switched { from: String },
}

/// Marker bookkeeping over a [`MarkerStore`].
#[derive(Debug)]
pub struct StateTracker<S> {
    store: S,
}

impl<S: MarkerStore> StateTracker<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn has_marker(&self, platform: &str) -> Result<bool> {
        self.store.contains(platform)
    }

    /// A marker belonging to any platform other than `excluding`.
    ///
    /// With several stray markers the lexicographically smallest name wins.
    pub fn find_other_marker(&self, excluding: &str) -> Result<Option<String>> {
        Ok(self
            .store
            .names()?
            .into_iter()
            .find(|name| name != excluding))
    }

    /// Clean the previously built platform if it differs from `current`,
    /// then mark `current`.
    ///
    /// `clean` is called at most once, with the stray platform's name. Only
    /// one stray marker is handled per call.
    pub fn ensure_clean_switch<F, E>(
        &self,
        current: &str,
        mode: BuildMode,
        mut clean: F,
    ) -> std::result::Result<SwitchOutcome, E>
    where
        F: FnMut(&str) -> std::result::Result<(), E>,
        E: From<PlatformError>,
    {
        if let Some(record) = self.store.get(current)? {
            log::debug!("marker for {current} present, no switch");
            if record.mode != Some(mode) {
                self.store.insert(&MarkerRecord::new(current, mode))?;
            }
            return Ok(SwitchOutcome::AlreadyCurrent);
        }

        let outcome = match self.find_other_marker(current)? {
            Some(previous) => {
                log::info!("platform switched from {previous} to {current}, cleaning {previous}");
                clean(&previous)?;
                self.clear(&previous)?;
                SwitchOutcome::Switched { from: previous }
            }
            None => SwitchOutcome::Fresh,
        };

        self.store.insert(&MarkerRecord::new(current, mode))?;
        Ok(outcome)
    }

    /// Remove `platform`'s marker. Idempotent.
    pub fn clear(&self, platform: &str) -> Result<()> {
        self.store.remove(platform)
    }

    /// All markers currently present.
    pub fn markers(&self) -> Result<Vec<MarkerRecord>> {
        let mut records = Vec::new();
        for name in self.store.names()? {
            if let Some(record) = self.store.get(&name)? {
                records.push(record);
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::{FsMarkerStore, MemoryMarkerStore};

    fn never_clean(name: &str) -> std::result::Result<(), PlatformError> {
        panic!("unexpected clean of {name}");
    }

    #[test]
    fn fresh_directory_marks_platform() {
        let tracker = StateTracker::new(MemoryMarkerStore::new());
        let outcome = tracker
            .ensure_clean_switch("qemu", BuildMode::Debug, never_clean)
            .unwrap();
        assert_eq!(outcome, SwitchOutcome::Fresh);
        assert!(tracker.has_marker("qemu").unwrap());
    }

    #[test]
    fn existing_marker_is_stable() {
        let tracker = StateTracker::new(MemoryMarkerStore::with_markers(["qemu"]));
        let outcome = tracker
            .ensure_clean_switch("qemu", BuildMode::Debug, never_clean)
            .unwrap();
        assert_eq!(outcome, SwitchOutcome::AlreadyCurrent);
    }

    #[test]
    fn existing_marker_follows_build_mode() {
        let tracker = StateTracker::new(MemoryMarkerStore::with_markers(["qemu"]));
        tracker
            .ensure_clean_switch("qemu", BuildMode::Release, never_clean)
            .unwrap();
        assert_eq!(
            tracker.markers().unwrap(),
            [MarkerRecord::new("qemu", BuildMode::Release)]
        );
    }

    #[test]
    fn switch_cleans_previous_exactly_once() {
        let tracker = StateTracker::new(MemoryMarkerStore::with_markers(["qemu"]));
        let mut cleaned = Vec::new();
        let outcome = tracker
            .ensure_clean_switch("k210", BuildMode::Debug, |name| {
                cleaned.push(name.to_string());
                Ok::<(), PlatformError>(())
            })
            .unwrap();

        assert_eq!(cleaned, ["qemu"]);
        assert_eq!(outcome, SwitchOutcome::Switched { from: "qemu".into() });
        assert!(!tracker.has_marker("qemu").unwrap());
        assert!(tracker.has_marker("k210").unwrap());
    }

    #[test]
    fn stray_markers_resolve_smallest_first() {
        let tracker = StateTracker::new(MemoryMarkerStore::with_markers(["zynq", "k210"]));
        assert_eq!(tracker.find_other_marker("qemu").unwrap().as_deref(), Some("k210"));
        assert_eq!(tracker.find_other_marker("k210").unwrap().as_deref(), Some("zynq"));

        let mut cleaned = Vec::new();
        tracker
            .ensure_clean_switch("qemu", BuildMode::Debug, |name| {
                cleaned.push(name.to_string());
                Ok::<(), PlatformError>(())
            })
            .unwrap();
        // one stray per switch
        assert_eq!(cleaned, ["k210"]);
        assert!(tracker.has_marker("zynq").unwrap());
    }

    #[test]
    fn failed_clean_leaves_markers_untouched() {
        let tracker = StateTracker::new(MemoryMarkerStore::with_markers(["qemu"]));
        let result = tracker.ensure_clean_switch("k210", BuildMode::Debug, |_| {
            Err(PlatformError::EmptyName)
        });
        assert!(result.is_err());
        assert!(tracker.has_marker("qemu").unwrap());
        assert!(!tracker.has_marker("k210").unwrap());
    }

    #[test]
    fn markers_lists_records_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = StateTracker::new(FsMarkerStore::new(dir.path()));
        tracker
            .ensure_clean_switch("qemu", BuildMode::Release, never_clean)
            .unwrap();
        assert_eq!(
            tracker.markers().unwrap(),
            [MarkerRecord::new("qemu", BuildMode::Release)]
        );
        tracker.clear("qemu").unwrap();
        tracker.clear("qemu").unwrap();
        assert!(tracker.markers().unwrap().is_empty());
    }
}
