//! The lifecycle engine.

use std::cell::Cell;

use kforge_platform::{
    KernelLayout, MarkerRecord, MarkerStore, Platform, PlatformError, PlatformRegistry,
    PostBuildReport, StageContext, StateTracker, SwitchOutcome,
};
use kforge_toolchain::{ProcessRunner, Toolset};

use crate::error::{LifecycleError, Result};
use crate::state::LifecycleState;

/// Runs lifecycle stages for the platforms of one registry.
///
/// Everything the engine touches is handed to it at construction: the
/// registry, the marker tracker, the process runner and the artifact layout.
#[derive(Debug)]
pub struct Engine<R, S> {
    registry: PlatformRegistry,
    tracker: StateTracker<S>,
    runner: R,
    layout: KernelLayout,
    tools: Toolset,
    state: Cell<LifecycleState>,
}

impl<R: ProcessRunner, S: MarkerStore> Engine<R, S> {
    pub fn new(
        registry: PlatformRegistry,
        tracker: StateTracker<S>,
        runner: R,
        layout: KernelLayout,
        tools: Toolset,
    ) -> Self {
        Self {
            registry,
            tracker,
            runner,
            layout,
            tools,
            state: Cell::new(LifecycleState::Idle),
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state.get()
    }

    pub fn registry(&self) -> &PlatformRegistry {
        &self.registry
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn layout(&self) -> &KernelLayout {
        &self.layout
    }

    /// Resolve a platform name, failing with [`LifecycleError::UnknownPlatform`].
    pub fn platform(&self, name: &str) -> Result<&dyn Platform> {
        self.registry.lookup(name).map_err(|e| match e {
            PlatformError::UnknownPlatform { name, available } => {
                LifecycleError::UnknownPlatform { name, available }
            }
            other => LifecycleError::State(other),
        })
    }

    /// Markers currently present in the working directory.
    pub fn markers(&self) -> Result<Vec<MarkerRecord>> {
        Ok(self.tracker.markers()?)
    }

    fn context(&self) -> StageContext<'_> {
        StageContext::new(&self.runner, &self.layout, &self.tools)
    }

    fn enter(&self, next: LifecycleState) {
        let previous = self.state.replace(next);
        if previous != next {
            log::debug!("lifecycle: {previous} -> {next}");
        }
    }

    fn abort(&self, err: LifecycleError) -> LifecycleError {
        self.enter(LifecycleState::Aborted);
        err
    }

    /// Switch detection, then the platform's own staging.
    pub fn pre_build(&self, name: &str) -> Result<SwitchOutcome> {
        let platform = self.platform(name)?;
        self.enter(LifecycleState::PreBuilding);

        let outcome = self
            .tracker
            .ensure_clean_switch(name, self.layout.mode(), |previous| {
                self.clean_previous(previous)
            })
            .map_err(|e| self.abort(e))?;

        platform.pre_build(&self.context()).map_err(|source| {
            self.abort(LifecycleError::PreBuildFailure {
                platform: name.to_string(),
                source,
            })
        })?;
        Ok(outcome)
    }

    /// Pre-build, then compile.
    pub fn build(&self, name: &str) -> Result<SwitchOutcome> {
        let platform = self.platform(name)?;
        let outcome = self.pre_build(name)?;

        self.enter(LifecycleState::Building);
        platform.build(&self.context()).map_err(|source| {
            self.abort(LifecycleError::BuildFailure {
                platform: name.to_string(),
                source,
            })
        })?;
        Ok(outcome)
    }

    /// Build, then extract the kernel image and write the diagnostic dumps.
    ///
    /// Failed dumps are logged as warnings and returned in the report.
    pub fn after_build(&self, name: &str) -> Result<PostBuildReport> {
        let platform = self.platform(name)?;
        self.build(name)?;

        self.enter(LifecycleState::PostProcessing);
        let report = platform.after_build(&self.context()).map_err(|source| {
            self.abort(LifecycleError::PostProcessing {
                platform: name.to_string(),
                source,
            })
        })?;
        for failure in &report.diagnostics {
            log::warn!("{failure}");
        }

        self.enter(LifecycleState::Done);
        Ok(report)
    }

    /// Build everything, then boot or flash the kernel image.
    ///
    /// The emulator or flasher is never started unless post-processing
    /// succeeded and the image is on disk.
    pub fn run(&self, name: &str, debug: bool) -> Result<()> {
        let platform = self.platform(name)?;
        let expected = platform.kernel_image(&self.layout);

        let report = self.after_build(name).map_err(|cause| LifecycleError::ArtifactMissing {
            platform: name.to_string(),
            path: expected.clone(),
            cause: Some(Box::new(cause)),
        })?;
        if !report.image.is_file() {
            return Err(self.abort(LifecycleError::ArtifactMissing {
                platform: name.to_string(),
                path: report.image,
                cause: None,
            }));
        }

        log::info!("build all OK, starting {name}");
        self.enter(LifecycleState::Running);
        platform.run(&self.context(), &report.image, debug).map_err(|source| {
            self.abort(LifecycleError::RunFailure {
                platform: name.to_string(),
                source,
            })
        })?;

        self.enter(LifecycleState::Done);
        Ok(())
    }

    /// Remove the platform's build outputs and its marker. Idempotent.
    pub fn clean(&self, name: &str) -> Result<()> {
        let platform = self.platform(name)?;
        self.enter(LifecycleState::Cleaning);
        let result = self.clean_platform(platform);
        self.enter(LifecycleState::Idle);
        result
    }

    fn clean_platform(&self, platform: &dyn Platform) -> Result<()> {
        log::info!("Clean platform: {}", platform.name());
        let cleaned = platform.clean(&self.context());
        self.tracker.clear(platform.name())?;
        cleaned.map_err(|source| LifecycleError::CleanFailure {
            platform: platform.name().to_string(),
            source,
        })
    }

    /// Clean callback for switch detection.
    fn clean_previous(&self, previous: &str) -> Result<()> {
        match self.registry.lookup(previous) {
            Ok(platform) => self.clean_platform(platform),
            Err(_) => {
                log::warn!("marker for unregistered platform '{previous}', removing it");
                Ok(self.tracker.clear(previous)?)
            }
        }
    }
}
