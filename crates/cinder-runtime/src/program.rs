//! Kernel source loading, program compilation, and entry point lookup

use crate::backend::{KernelHandle, ParamSpec, ProgramHandle, SharedBackend};
use crate::context::ExecutionContext;
use crate::error::{Error, Result};
use std::path::Path;

/// Read kernel source text from disk
pub fn load_source(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|e| Error::SourceNotFound {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// A program built from kernel source on a context's device
pub struct Program {
    handle: ProgramHandle,
    backend: SharedBackend,
}

impl std::fmt::Debug for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Program")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

impl Program {
    /// Build `source` for the context's device
    ///
    /// Any build problem surfaces as `BuildFailure` carrying the build log.
    #[tracing::instrument(skip(ctx, source), fields(source_len = source.len()))]
    pub fn compile(ctx: &ExecutionContext, source: &str) -> Result<Self> {
        let backend = ctx.backend();
        let handle = backend.write().build_program(source)?;
        Ok(Self { handle, backend })
    }

    /// Look up a named entry point
    ///
    /// The returned `Kernel` carries the entry's parameter signature; every
    /// entry point launches through the same interface regardless of shape.
    pub fn entry_point(&self, name: &str) -> Result<Kernel> {
        let handle = self.backend.write().entry_point(self.handle, name)?;
        let params = self.backend.read().entry_params(handle)?;
        Ok(Kernel {
            handle,
            name: name.to_string(),
            params,
        })
    }

    pub fn handle(&self) -> ProgramHandle {
        self.handle
    }
}

/// A launchable entry point and its signature
#[derive(Debug, Clone)]
pub struct Kernel {
    handle: KernelHandle,
    name: String,
    params: Vec<ParamSpec>,
}

impl Kernel {
    pub fn handle(&self) -> KernelHandle {
        self.handle
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }
}
