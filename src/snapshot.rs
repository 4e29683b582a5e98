//! Capture and restore of live x87 state.

use thiserror::Error;

use crate::env::RawEnvironment;
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
use crate::env::FSAVE_IMAGE_SIZE;

pub type Result<T> = std::result::Result<T, SnapshotError>;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("x87 snapshots are not supported on {arch}")]
    Unsupported { arch: &'static str },
}

/// Produces and restores x87 environment snapshots.
///
/// The decoder never touches this trait; callers sequence
/// {capture, decode, render, restore}. Between `capture` and the matching
/// `restore`, no floating-point instruction may execute on the observed
/// unit, and both calls must run on the thread whose state is inspected.
pub trait SnapshotSource {
    fn capture(&mut self) -> Result<RawEnvironment>;
    fn restore(&mut self, env: &RawEnvironment) -> Result<()>;
}

/// Snapshots the calling thread's own FPU via `FNSAVE`/`FRSTOR`.
#[derive(Debug, Default)]
pub struct LiveFpu;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
impl SnapshotSource for LiveFpu {
    fn capture(&mut self) -> Result<RawEnvironment> {
        let mut image = [0u8; FSAVE_IMAGE_SIZE];
        // FNSAVE reinitialises the FPU after storing; the paired `restore`
        // puts the captured state back.
        unsafe {
            core::arch::asm!(
                "fnsave [{image}]",
                image = in(reg) image.as_mut_ptr(),
                options(nostack),
            );
        }
        Ok(RawEnvironment::from_fsave_image(&image))
    }

    fn restore(&mut self, env: &RawEnvironment) -> Result<()> {
        let image = env.to_fsave_image();
        unsafe {
            core::arch::asm!(
                "frstor [{image}]",
                image = in(reg) image.as_ptr(),
                options(nostack, readonly),
            );
        }
        Ok(())
    }
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
impl SnapshotSource for LiveFpu {
    fn capture(&mut self) -> Result<RawEnvironment> {
        Err(SnapshotError::Unsupported {
            arch: std::env::consts::ARCH,
        })
    }

    fn restore(&mut self, _env: &RawEnvironment) -> Result<()> {
        Err(SnapshotError::Unsupported {
            arch: std::env::consts::ARCH,
        })
    }
}
