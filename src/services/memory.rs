use crate::models::MemoryBounds;
use sysinfo::System;

/// Smallest heap the launcher will ever hand to the JVM, in MB.
pub const MIN_HEAP_MB: u64 = 512;
/// Floor of the usable pool before step rounding, in MB.
const MIN_USABLE_MB: u64 = 1024;

/// Total physical memory of this machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemMemory {
    pub total_mb: u64,
}

impl SystemMemory {
    pub fn detect() -> Self {
        let mut system = System::new();
        system.refresh_memory();
        let total_mb = system.total_memory() / 1024 / 1024;
        tracing::debug!("Detected {} MB of system memory", total_mb);
        Self { total_mb }
    }
}

/// Heap sizing rules for one machine.
///
/// The ceiling leaves `reserved_mb` to the OS, keeps at least 1024 MB in the
/// pool, rounds down to `step_mb`, and never drops under [`MIN_HEAP_MB`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryPlan {
    pub total_mb: u64,
    pub reserved_mb: u64,
    pub step_mb: u64,
}

impl MemoryPlan {
    pub fn new(total_mb: u64, reserved_mb: u64, step_mb: u64) -> Self {
        Self {
            total_mb,
            reserved_mb,
            step_mb: step_mb.max(1),
        }
    }

    pub fn detect(reserved_mb: u64, step_mb: u64) -> Self {
        Self::new(SystemMemory::detect().total_mb, reserved_mb, step_mb)
    }

    pub fn ceiling_mb(&self) -> u64 {
        let usable = self.total_mb.saturating_sub(self.reserved_mb).max(MIN_USABLE_MB);
        ((usable / self.step_mb) * self.step_mb).max(MIN_HEAP_MB)
    }

    pub fn clamp(&self, requested_mb: u64) -> u64 {
        let clamped = requested_mb.clamp(MIN_HEAP_MB, self.ceiling_mb());
        if clamped != requested_mb {
            tracing::info!(
                "Requested heap {} MB clamped to {} MB (allowed {}-{} MB)",
                requested_mb,
                clamped,
                MIN_HEAP_MB,
                self.ceiling_mb()
            );
        }
        clamped
    }

    pub fn bounds(&self, requested_mb: u64) -> MemoryBounds {
        MemoryBounds::from_mb(MIN_HEAP_MB, self.clamp(requested_mb))
    }
}
