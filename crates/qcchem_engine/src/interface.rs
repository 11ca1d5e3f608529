//! Backend resolution
//!
//! Turns a name or a ready backend into the pipeline matching its output:
//! statevector backends get a `StatevectorBackend`, everything else a
//! `CountsBackend`. Detection is by name only.

use crate::account::Session;
use crate::counts::CountsBackend;
use crate::statevector::StatevectorBackend;
use crate::wrapper::BackendWrapper;
use qcchem_backend::Backend;
use qcchem_core::error::QcchemResult;
use qcchem_core::names;
use std::fmt;
use std::sync::Arc;

/// What to resolve: a name, or an already constructed backend
#[derive(Clone)]
pub enum BackendSpec {
    /// Name understood by `Session::get_backend`
    Name(String),
    /// Backend handle
    Handle(Arc<dyn Backend>),
}

impl BackendSpec {
    fn is_statevector(&self) -> bool {
        match self {
            BackendSpec::Name(name) => names::is_statevector(name),
            BackendSpec::Handle(backend) => names::is_statevector(backend.name()),
        }
    }
}

impl From<&str> for BackendSpec {
    fn from(name: &str) -> Self {
        BackendSpec::Name(name.to_string())
    }
}

impl From<String> for BackendSpec {
    fn from(name: String) -> Self {
        BackendSpec::Name(name)
    }
}

impl From<Arc<dyn Backend>> for BackendSpec {
    fn from(backend: Arc<dyn Backend>) -> Self {
        BackendSpec::Handle(backend)
    }
}

impl fmt::Debug for BackendSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendSpec::Name(name) => f.debug_tuple("Name").field(name).finish(),
            BackendSpec::Handle(backend) => f.debug_tuple("Handle").field(&backend.name()).finish(),
        }
    }
}

/// Pipeline chosen for a backend
#[derive(Debug, Clone)]
pub enum ResolvedBackend {
    /// Histogram-returning backend
    Counts(CountsBackend),
    /// Amplitude-returning backend
    Statevector(StatevectorBackend),
}

impl ResolvedBackend {
    /// Shared wrapper of either pipeline
    pub fn wrapper(&self) -> &BackendWrapper {
        match self {
            ResolvedBackend::Counts(backend) => backend.wrapper(),
            ResolvedBackend::Statevector(backend) => backend.wrapper(),
        }
    }

    /// Counts pipeline, if this is one
    pub fn as_counts(&self) -> Option<&CountsBackend> {
        match self {
            ResolvedBackend::Counts(backend) => Some(backend),
            ResolvedBackend::Statevector(_) => None,
        }
    }

    /// Mutable counts pipeline, for calibration
    pub fn as_counts_mut(&mut self) -> Option<&mut CountsBackend> {
        match self {
            ResolvedBackend::Counts(backend) => Some(backend),
            ResolvedBackend::Statevector(_) => None,
        }
    }

    /// Statevector pipeline, if this is one
    pub fn as_statevector(&self) -> Option<&StatevectorBackend> {
        match self {
            ResolvedBackend::Statevector(backend) => Some(backend),
            ResolvedBackend::Counts(_) => None,
        }
    }

    /// Take the counts pipeline
    pub fn into_counts(self) -> Option<CountsBackend> {
        match self {
            ResolvedBackend::Counts(backend) => Some(backend),
            ResolvedBackend::Statevector(_) => None,
        }
    }

    /// Take the statevector pipeline
    pub fn into_statevector(self) -> Option<StatevectorBackend> {
        match self {
            ResolvedBackend::Statevector(backend) => Some(backend),
            ResolvedBackend::Counts(_) => None,
        }
    }
}

/// Resolve a name or handle into a ready pipeline
pub fn resolve_backend(
    session: &Session,
    spec: impl Into<BackendSpec>,
) -> QcchemResult<ResolvedBackend> {
    let spec = spec.into();
    let statevector = spec.is_statevector();

    let backend = match spec {
        BackendSpec::Name(name) => session.get_backend(&name)?,
        BackendSpec::Handle(backend) => backend,
    };
    let wrapper = session.wrap(backend);

    Ok(if statevector {
        ResolvedBackend::Statevector(StatevectorBackend::new(wrapper))
    } else {
        ResolvedBackend::Counts(CountsBackend::new(wrapper))
    })
}

// ============================================================================
// Tests
// ============================================================================
