//! Host lifecycle and frame-execution pipeline around an opaque emulation
//! engine.
//!
//! The engine (instruction decode/execute, picture generation, the actual
//! hardware model) is an external collaborator reached through the
//! capability traits in [`engine`]. This crate owns everything around it:
//! the loading state machine, the ownership discipline over the native
//! instance, the frame scheduler, and the RGB to RGBA conversion that turns
//! raw engine output into presentable images.
pub mod engine;
pub mod error;
pub mod frame;
pub mod logging;
pub mod scheduler;

use std::rc::Rc;

use log::info;

use crate::engine::EmulatorHandle;
use crate::engine::EngineModule;
use crate::engine::ModuleLoader;
use crate::error::HostError;
use crate::frame::DisplayFrame;
use crate::frame::RawFrame;

/// Lifecycle phase of an [`EmulatorHost`].
///
/// The non-error states are totally ranked, so every gating check is a
/// single "has progress reached at least X?" inequality. `Error` is kept
/// outside the ranking: it can never satisfy such a check, which makes every
/// downstream operation fail once the host has failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum LoadingState {
    Uninitialized,
    LoadingEngine,
    EngineLoaded,
    Ready,
    Error,
}

impl LoadingState {
    fn rank(self) -> Option<u8> {
        match self {
            LoadingState::Uninitialized => Some(0),
            LoadingState::LoadingEngine => Some(1),
            LoadingState::EngineLoaded => Some(2),
            LoadingState::Ready => Some(3),
            LoadingState::Error => None,
        }
    }

    /// True if progress has reached at least `target`. Always false in the
    /// `Error` state.
    pub fn has_reached(self, target: LoadingState) -> bool {
        match (self.rank(), target.rank()) {
            (Some(actual), Some(target)) => actual >= target,
            _ => false,
        }
    }
}

/// The state machine governing when the engine may be loaded, instantiated
/// and stepped.
///
/// Owns at most one live [`EmulatorHandle`] at a time. All operations take
/// `&mut self`; under the single-threaded cooperative model this is the
/// entire mutual-exclusion story, and state transitions plus handle access
/// need no further locking.
pub struct EmulatorHost {
    state: LoadingState,
    module: Option<Rc<dyn EngineModule>>,
    handle: Option<EmulatorHandle>,
}

impl EmulatorHost {
    pub fn new() -> EmulatorHost {
        EmulatorHost {
            state: LoadingState::Uninitialized,
            module: None,
            handle: None,
        }
    }

    pub fn state(&self) -> LoadingState {
        self.state
    }

    /// Loads the engine module and installs its debug hooks. Must complete
    /// before any ROM can be loaded.
    ///
    /// Only valid on an uninitialized host. Either failure mode (module load
    /// or hook installation) is terminal: the host moves to
    /// [`LoadingState::Error`] and a new host must be created.
    pub fn initialize(&mut self, loader: &dyn ModuleLoader) -> Result<(), HostError> {
        if self.state != LoadingState::Uninitialized {
            return Err(HostError::Precondition {
                operation: "initialize",
                required: LoadingState::Uninitialized,
                actual: self.state,
            });
        }
        self.state = LoadingState::LoadingEngine;
        info!("Loading engine module");
        let module = match loader.load() {
            Ok(module) => module,
            Err(err) => return Err(self.fail_initialization(err)),
        };
        if let Err(err) = module.init_debug_hooks() {
            return Err(self.fail_initialization(err));
        }
        self.module = Some(module);
        self.state = LoadingState::EngineLoaded;
        info!("Engine module loaded");
        Ok(())
    }

    fn fail_initialization(&mut self, err: anyhow::Error) -> HostError {
        self.state = LoadingState::Error;
        HostError::Initialization(err)
    }

    /// Constructs a fresh engine instance from `rom`, replacing any existing
    /// one.
    ///
    /// The previous instance is released first; a release failure is logged
    /// and the old instance discarded regardless. A construction failure is
    /// terminal for the host ([`LoadingState::Error`]).
    pub fn load_rom(&mut self, rom: Vec<u8>) -> Result<(), HostError> {
        self.require(LoadingState::EngineLoaded, "load_rom")?;
        if let Some(mut old) = self.handle.take() {
            old.release();
        }
        let module = self
            .module
            .as_ref()
            .expect("EngineLoaded rank implies a loaded module");
        match module.construct(rom) {
            Ok(instance) => {
                self.handle = Some(EmulatorHandle::new(instance));
                self.state = LoadingState::Ready;
                info!("Engine instance constructed");
                Ok(())
            }
            Err(err) => {
                self.state = LoadingState::Error;
                Err(HostError::Instantiation(err))
            }
        }
    }

    /// Runs the engine for exactly one frame and returns the presentable
    /// image. Does not change state.
    pub fn step_frame(&mut self) -> Result<DisplayFrame, HostError> {
        self.require(LoadingState::Ready, "step_frame")?;
        let handle = self
            .handle
            .as_mut()
            .expect("Ready state implies a live handle");
        let bytes = handle.step_frame().map_err(HostError::Engine)?;
        let raw = RawFrame::from_engine(bytes).map_err(HostError::Engine)?;
        Ok(raw.to_display())
    }

    /// Returns the running instance to its power-on state, keeping the ROM
    /// bound.
    pub fn reset(&mut self) -> Result<(), HostError> {
        self.require(LoadingState::Ready, "reset")?;
        let handle = self
            .handle
            .as_mut()
            .expect("Ready state implies a live handle");
        handle.reset().map_err(HostError::Engine)
    }

    /// Releases the current instance, if any. The module stays loaded, so a
    /// ready host regresses to [`LoadingState::EngineLoaded`]. Safe to call
    /// from any state, idempotent, and never leaves the `Error` state.
    pub fn teardown(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.release();
            info!("Engine instance released");
        }
        if self.state == LoadingState::Ready {
            self.state = LoadingState::EngineLoaded;
        }
    }

    pub(crate) fn require(
        &self,
        required: LoadingState,
        operation: &'static str,
    ) -> Result<(), HostError> {
        if self.state.has_reached(required) {
            Ok(())
        } else {
            Err(HostError::Precondition {
                operation,
                required,
                actual: self.state,
            })
        }
    }
}

impl Default for EmulatorHost {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn ranked_states_compare_by_progress() {
        use LoadingState::*;
        assert!(Ready.has_reached(EngineLoaded));
        assert!(EngineLoaded.has_reached(EngineLoaded));
        assert!(!LoadingEngine.has_reached(EngineLoaded));
        assert!(!Uninitialized.has_reached(LoadingEngine));
    }

    #[test]
    fn error_state_fails_every_rank_check() {
        use LoadingState::*;
        for target in [Uninitialized, LoadingEngine, EngineLoaded, Ready, Error] {
            assert!(!Error.has_reached(target));
        }
    }

    #[test]
    fn error_is_not_a_valid_rank_target() {
        assert!(!LoadingState::Ready.has_reached(LoadingState::Error));
    }

    #[test]
    fn new_host_is_uninitialized() {
        let host = EmulatorHost::new();
        assert_eq!(host.state(), LoadingState::Uninitialized);
    }

    #[test]
    fn teardown_on_a_fresh_host_is_a_no_op() {
        let mut host = EmulatorHost::new();
        host.teardown();
        host.teardown();
        assert_eq!(host.state(), LoadingState::Uninitialized);
    }

    #[test]
    fn load_rom_before_initialize_is_rejected() {
        let mut host = EmulatorHost::new();
        let err = host.load_rom(vec![0x4E, 0x45, 0x53]).unwrap_err();
        assert!(matches!(
            err,
            HostError::Precondition {
                operation: "load_rom",
                ..
            }
        ));
        assert_eq!(host.state(), LoadingState::Uninitialized);
    }
}
