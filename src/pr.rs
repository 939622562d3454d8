//! Memory fences and the CPU stall hint.
//!
//! This module wraps `core::sync::atomic`'s fence functions for the small
//! number of places in this crate that need an explicit fence (rather than
//! a load/store's own `Ordering`) plus the busy-wait hint backoff loops use.
//!
//! # Progress Guarantees
//!
//! - **Wait-free**: fence operations
//! - **Lock-free**: none — fences carry no atomicity of their own

use core::sync::atomic::{compiler_fence, fence, Ordering};

/// Compiler barrier - prevents compiler reordering, no hardware fence.
#[inline(always)]
pub fn barrier() {
    compiler_fence(Ordering::SeqCst);
}

/// Acquire fence - prevents reordering of reads before this fence.
#[inline(always)]
pub fn fence_acquire() {
    fence(Ordering::Acquire);
}

/// Release fence - prevents reordering of writes after this fence.
#[inline(always)]
pub fn fence_release() {
    fence(Ordering::Release);
}

/// Acquire-release fence - combines acquire and release semantics.
#[inline(always)]
pub fn fence_acqrel() {
    fence(Ordering::AcqRel);
}

/// Full memory fence - sequentially consistent ordering.
#[inline(always)]
pub fn fence_memory() {
    fence(Ordering::SeqCst);
}

/// CPU stall/pause hint for spin loops.
#[inline(always)]
pub fn stall() {
    core::hint::spin_loop();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stall() {
        stall();
    }

    #[test]
    fn test_fences() {
        barrier();
        fence_acquire();
        fence_release();
        fence_acqrel();
        fence_memory();
    }
}
