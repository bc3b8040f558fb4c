//! Host-derived numeric limits substituted into the schema template.

use crate::error::{CompileError, CompileResult};
use serde::{Deserialize, Serialize};

/// Upper limits for the event-stream buffer settings.
///
/// The three caps are independent. A bound is not required to be consistent
/// with the others (e.g. `min_buffers_cap <= max_buffers_cap` is not checked),
/// but each must be positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    /// Largest acceptable `kstream.min-buffers`
    pub min_buffers_cap: u64,
    /// Largest acceptable `kstream.max-buffers`
    pub max_buffers_cap: u64,
    /// Largest acceptable `kstream.buffer-size`, in kilobytes
    pub max_buffer_size_cap: u64,
}

impl Bounds {
    /// Template placeholder names, in the order they are documented.
    pub const PLACEHOLDERS: [&'static str; 3] = ["MinBuffers", "MaxBuffers", "MaxBufferSize"];

    pub const fn new(min_buffers_cap: u64, max_buffers_cap: u64, max_buffer_size_cap: u64) -> Self {
        Self {
            min_buffers_cap,
            max_buffers_cap,
            max_buffer_size_cap,
        }
    }

    /// Value substituted for a placeholder name, if the name is known.
    pub fn placeholder(&self, name: &str) -> Option<u64> {
        match name {
            "MinBuffers" => Some(self.min_buffers_cap),
            "MaxBuffers" => Some(self.max_buffers_cap),
            "MaxBufferSize" => Some(self.max_buffer_size_cap),
            _ => None,
        }
    }

    /// Reject zero caps.
    pub fn check(&self) -> CompileResult<()> {
        for (name, value) in [
            ("min_buffers_cap", self.min_buffers_cap),
            ("max_buffers_cap", self.max_buffers_cap),
            ("max_buffer_size_cap", self.max_buffer_size_cap),
        ] {
            if value == 0 {
                return Err(CompileError::NonPositiveBound { name });
            }
        }
        Ok(())
    }
}

/// Source of [`Bounds`] for the validator facade.
///
/// Hosts implement this to derive the caps from the machine they run on;
/// [`Bounds`] itself is the trivial provider.
pub trait BoundProvider {
    fn bounds(&self) -> Bounds;
}

impl BoundProvider for Bounds {
    fn bounds(&self) -> Bounds {
        *self
    }
}

/// Caps derived from the number of logical CPUs.
///
/// `min-buffers` may go up to two buffers per CPU, `max-buffers` up to twenty
/// more than that, and a single buffer up to 1024 KB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostBounds {
    cpus: u64,
}

impl HostBounds {
    /// Largest single buffer, in kilobytes
    pub const MAX_BUFFER_SIZE_KB: u64 = 1024;

    /// Extra buffers allowed on top of the per-CPU minimum
    pub const EXTRA_BUFFERS: u64 = 20;

    /// Probe the current machine. Falls back to one CPU when the count is
    /// unavailable.
    pub fn probe() -> Self {
        let cpus = std::thread::available_parallelism()
            .map(|n| n.get() as u64)
            .unwrap_or(1);
        tracing::debug!(cpus, "probed host parallelism");
        Self { cpus }
    }

    /// Bounds for a machine with the given CPU count (at least one).
    pub fn with_cpus(cpus: u64) -> Self {
        Self { cpus: cpus.max(1) }
    }

    pub fn cpus(&self) -> u64 {
        self.cpus
    }
}

impl BoundProvider for HostBounds {
    fn bounds(&self) -> Bounds {
        let min_buffers_cap = self.cpus.saturating_mul(2);
        Bounds::new(
            min_buffers_cap,
            min_buffers_cap.saturating_add(Self::EXTRA_BUFFERS),
            Self::MAX_BUFFER_SIZE_KB,
        )
    }
}
