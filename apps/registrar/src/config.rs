//! Server configuration.
//!
//! Built from `registrar serve` arguments; every argument can also be
//! supplied through a `REGISTRAR_*` environment variable.

use clap::{Args, ValueEnum};
use registrar_core::{MemoryBackend, RedbBackend, StudentStore};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default listen address.
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Default database file.
pub const DEFAULT_DATABASE: &str = "registrar.redb";

/// Default request body limit (10 MB, photos included).
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Which key-value backend the store runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// redb database file (persistent).
    Redb,
    /// In-process map, lost on exit.
    Memory,
}

/// Configuration for the HTTP server.
#[derive(Debug, Clone, Args)]
pub struct ServerConfig {
    /// Listen address (host:port)
    #[arg(short, long, env = "REGISTRAR_BIND", default_value = DEFAULT_BIND)]
    pub bind: SocketAddr,

    /// Database file (redb backend only)
    #[arg(short, long, env = "REGISTRAR_DATABASE", default_value = DEFAULT_DATABASE)]
    pub database: PathBuf,

    /// Storage backend
    #[arg(long, env = "REGISTRAR_BACKEND", value_enum, default_value_t = BackendKind::Redb)]
    pub backend: BackendKind,

    /// Disable the permissive CORS layer
    #[arg(long, env = "REGISTRAR_NO_CORS")]
    pub no_cors: bool,

    /// Maximum request body size in bytes
    #[arg(long, env = "REGISTRAR_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8000)),
            database: PathBuf::from(DEFAULT_DATABASE),
            backend: BackendKind::Redb,
            no_cors: false,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    /// Whether the CORS layer is installed.
    #[must_use]
    pub fn cors_enabled(&self) -> bool {
        !self.no_cors
    }

    /// Open the store this configuration points at.
    pub fn open_store(&self) -> registrar_core::Result<StudentStore> {
        match self.backend {
            BackendKind::Redb => Ok(StudentStore::new(RedbBackend::open(&self.database)?)),
            BackendKind::Memory => Ok(StudentStore::new(MemoryBackend::new())),
        }
    }
}
