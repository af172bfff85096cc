//! # Runtime
//!
//! Tokio runtime profiles shared by the TrAi binaries.
//!
//! * **server**: multi-thread scheduler for the HTTP service.
//! * **probe**: current-thread scheduler for the container health probe,
//!   which issues a single request and exits.
//!
//! ```rust,ignore
//! #[trai_runtime::main(server)]
//! async fn main() -> anyhow::Result<()> {
//!     Ok(())
//! }
//! ```

pub use anyhow::Result;
pub use trai_derive::main;

use anyhow::anyhow;
use std::{sync::OnceLock, thread::available_parallelism, time::Duration};
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

const DEFAULT_WORKER_THREADS: usize = 4;
/// 2 `MiB`, tokio's own default.
const DEFAULT_STACK_SIZE: usize = 2 * 1024 * 1024;
const MIN_STACK_SIZE: usize = 1024 * 1024;
const MAX_STACK_SIZE: usize = 16 * 1024 * 1024;
const MAX_WORKER_THREADS: usize = 1024;
const THREAD_KEEP_ALIVE: Duration = Duration::from_secs(60);
const FALLBACK_THREAD_NAME: &str = "trai-worker";

static WORKER_THREADS: OnceLock<usize> = OnceLock::new();

/// `TOKIO_WORKER_THREADS` wins over detected parallelism.
fn detected_worker_threads() -> usize {
    *WORKER_THREADS.get_or_init(|| {
        std::env::var("TOKIO_WORKER_THREADS")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|&n| n > 0 && n <= MAX_WORKER_THREADS)
            .unwrap_or_else(|| {
                available_parallelism()
                    .map(std::num::NonZero::get)
                    .unwrap_or(DEFAULT_WORKER_THREADS)
            })
    })
}

/// Scheduler kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    MultiThread,
    CurrentThread,
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub flavor: Flavor,
    pub worker_threads: usize,
    pub stack_size: usize,
    pub thread_name: String,
    pub thread_keep_alive: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            flavor: Flavor::MultiThread,
            worker_threads: detected_worker_threads(),
            stack_size: DEFAULT_STACK_SIZE,
            thread_name: FALLBACK_THREAD_NAME.to_owned(),
            thread_keep_alive: THREAD_KEEP_ALIVE,
        }
    }
}

impl RuntimeConfig {
    /// Preset for `trai-server`.
    #[must_use]
    pub fn server() -> Self {
        Self {
            flavor: Flavor::MultiThread,
            worker_threads: detected_worker_threads(),
            stack_size: 4 * 1024 * 1024,
            thread_name: "trai-http".to_owned(),
            thread_keep_alive: Duration::from_secs(300),
        }
    }

    /// Preset for `trai-probe`: one thread, nothing kept around.
    #[must_use]
    pub fn probe() -> Self {
        Self {
            flavor: Flavor::CurrentThread,
            worker_threads: 1,
            stack_size: MIN_STACK_SIZE,
            thread_name: "trai-probe".to_owned(),
            thread_keep_alive: Duration::from_secs(1),
        }
    }

    #[must_use]
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads.clamp(1, MAX_WORKER_THREADS);
        self
    }

    #[must_use]
    pub fn with_stack_size(mut self, size: usize) -> Self {
        self.stack_size = size.clamp(MIN_STACK_SIZE, MAX_STACK_SIZE);
        self
    }

    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.thread_name =
            if name.trim().is_empty() { FALLBACK_THREAD_NAME.to_owned() } else { name };
        self
    }

    fn normalized(&self) -> Self {
        self.clone()
            .with_worker_threads(self.worker_threads)
            .with_stack_size(self.stack_size)
            .with_thread_name(self.thread_name.clone())
    }
}

/// Builds a runtime from `config` with I/O and timers enabled.
///
/// Out-of-range values are clamped rather than rejected.
///
/// # Errors
/// Fails when the OS refuses to spawn the worker threads.
pub fn build_runtime_with_config(config: &RuntimeConfig) -> Result<Runtime> {
    let config = config.normalized();
    debug!(config = ?config, "Building tokio runtime");

    let mut builder = match config.flavor {
        Flavor::MultiThread => {
            let mut b = Builder::new_multi_thread();
            b.worker_threads(config.worker_threads);
            b
        }
        Flavor::CurrentThread => Builder::new_current_thread(),
    };

    builder
        .thread_name(&config.thread_name)
        .thread_stack_size(config.stack_size)
        .thread_keep_alive(config.thread_keep_alive)
        .enable_all();

    builder.build().map_err(|e| anyhow!("Failed to initialize runtime: {e}"))
}
