//! Package-manager guidance layer.
//!
//! Maps a detected distribution family to its native package-manager
//! commands and runs them through a confirmable execution pipeline. The
//! five operations here are the only entry points; each builds one
//! [`NativeCommand`] and delegates to the [`Executor`]. Nothing is retried.

pub mod backend;
pub mod executor;

use std::io::{BufRead, StdinLock};

use thiserror::Error;

pub use backend::{Backend, NativeCommand};
pub use executor::{Executor, Outcome, RunFailure, ShellSpawner, Spawner};

use crate::distro::Distro;

/// Behavioral flags for one operation. The three flags are independent;
/// all eight combinations are valid. Callers decide defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutionOptions {
    /// Show the command and ask before running it.
    pub dry_run: bool,
    /// Pass the package manager's own skip-confirmation flag.
    pub assume_yes: bool,
    /// Print an explanation and the native command up front.
    pub explain: bool,
}

#[derive(Debug, Error)]
pub enum PkgError {
    #[error("no package manager support for distro {distro_id:?}")]
    UnsupportedFamily { distro_id: String },

    #[error("{0}")]
    InvalidArgument(&'static str),
}

/// The five package operations for one detected distribution.
///
/// Holds the selected backend (none for unsupported families, in which
/// case every operation fails before any command is built) and the
/// executor that owns the interactive input and process spawning.
pub struct PackageGuide<S = ShellSpawner, R = StdinLock<'static>> {
    backend: Option<Backend>,
    distro_id: String,
    executor: Executor<S, R>,
}

impl PackageGuide {
    pub fn new(distro: &Distro) -> Self {
        Self::with_executor(distro, Executor::interactive())
    }
}

impl<S: Spawner, R: BufRead> PackageGuide<S, R> {
    pub fn with_executor(distro: &Distro, executor: Executor<S, R>) -> Self {
        PackageGuide {
            backend: Backend::for_family(distro.family),
            distro_id: distro.id.clone(),
            executor,
        }
    }

    /// The backend in use, for display. `None` means unsupported.
    pub fn backend(&self) -> Option<Backend> {
        self.backend
    }

    pub fn update_all(&mut self, opts: ExecutionOptions) -> Result<Outcome, PkgError> {
        let backend = self.require_backend()?;
        Ok(self.executor.run(&backend.update_all(opts), opts))
    }

    pub fn install(&mut self, pkgs: &[String], opts: ExecutionOptions) -> Result<Outcome, PkgError> {
        if pkgs.is_empty() {
            return Err(PkgError::InvalidArgument("package list is empty"));
        }
        let backend = self.require_backend()?;
        Ok(self.executor.run(&backend.install(pkgs, opts), opts))
    }

    pub fn remove(&mut self, pkgs: &[String], opts: ExecutionOptions) -> Result<Outcome, PkgError> {
        if pkgs.is_empty() {
            return Err(PkgError::InvalidArgument("package list is empty"));
        }
        let backend = self.require_backend()?;
        Ok(self.executor.run(&backend.remove(pkgs, opts), opts))
    }

    pub fn search(&mut self, query: &str, opts: ExecutionOptions) -> Result<Outcome, PkgError> {
        if query.trim().is_empty() {
            return Err(PkgError::InvalidArgument("search query is empty"));
        }
        let backend = self.require_backend()?;
        Ok(self.executor.run(&backend.search(query), opts))
    }

    pub fn info(&mut self, name: &str, opts: ExecutionOptions) -> Result<Outcome, PkgError> {
        if name.trim().is_empty() {
            return Err(PkgError::InvalidArgument("package name is empty"));
        }
        let backend = self.require_backend()?;
        Ok(self.executor.run(&backend.info(name), opts))
    }

    fn require_backend(&self) -> Result<Backend, PkgError> {
        self.backend.ok_or_else(|| PkgError::UnsupportedFamily {
            distro_id: self.distro_id.clone(),
        })
    }
}
