//! Capability boundary towards the compiled emulation engine.
//!
//! The engine itself (instruction decode/execute, picture generation) is an
//! external collaborator. The host consumes it exclusively through the
//! traits below and never looks inside.
use std::rc::Rc;

use anyhow::Result;
use log::warn;

/// Loads the compiled engine module.
///
/// Invoked exactly once per host lifetime, inside
/// [`EmulatorHost::initialize`](crate::EmulatorHost::initialize). A stalled
/// load blocks the host indefinitely; callers wanting timeouts wrap the
/// loader themselves.
pub trait ModuleLoader {
    fn load(&self) -> Result<Rc<dyn EngineModule>>;
}

/// The loaded engine module: a debug-hook initializer and a constructor
/// capability. Shared read-only by the host once loaded, and never reloaded
/// while an instance is alive.
pub trait EngineModule {
    /// Installs the engine's debug hooks. Idempotent; called once during
    /// host initialization.
    fn init_debug_hooks(&self) -> Result<()>;

    /// Instantiates the engine for one ROM image. Ownership of the bytes
    /// transfers to the engine; the host keeps no copy. Fails on a malformed
    /// image.
    fn construct(&self, rom: Vec<u8>) -> Result<Box<dyn EngineInstance>>;
}

/// One constructed, ROM-bound engine instance.
pub trait EngineInstance {
    /// Runs the engine for one frame and returns the raw pixel output
    /// (`FRAME_WIDTH * FRAME_HEIGHT * 3` bytes).
    fn step_frame(&mut self) -> Result<Vec<u8>>;

    /// Returns the instance to its power-on state, keeping the ROM bound.
    fn reset(&mut self) -> Result<()>;

    /// Frees the native resources behind the instance. Called exactly once.
    fn release(&mut self) -> Result<()>;
}

/// Ownership wrapper around one engine instance.
///
/// The instance must be released exactly once before being discarded or
/// replaced. The host's teardown and replace-on-load paths call
/// [`EmulatorHandle::release`] explicitly; the `Drop` impl is the backstop
/// for every other path out of scope.
pub struct EmulatorHandle {
    instance: Box<dyn EngineInstance>,
    released: bool,
}

impl EmulatorHandle {
    pub(crate) fn new(instance: Box<dyn EngineInstance>) -> EmulatorHandle {
        EmulatorHandle {
            instance,
            released: false,
        }
    }

    pub(crate) fn step_frame(&mut self) -> Result<Vec<u8>> {
        assert!(!self.released, "step_frame called on a released handle");
        self.instance.step_frame()
    }

    pub(crate) fn reset(&mut self) -> Result<()> {
        assert!(!self.released, "reset called on a released handle");
        self.instance.reset()
    }

    /// Releases the instance. A release failure is logged and swallowed: the
    /// handle counts as released either way and the engine-side resources
    /// may leak.
    pub(crate) fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(err) = self.instance.release() {
            warn!("Failed to release engine instance: {err:#}");
        }
    }
}

impl Drop for EmulatorHandle {
    fn drop(&mut self) {
        if !self.released {
            warn!("Engine instance dropped without an explicit release");
            self.release();
        }
    }
}
