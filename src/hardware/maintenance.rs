//! Memory reclaim hook for the overlay's boost and clean actions

use crate::hardware::MaintenanceHook;

/// Hands freed heap pages back to the operating system
#[derive(Debug, Default)]
pub struct AllocatorTrim;

impl AllocatorTrim {
    pub fn new() -> Self {
        Self
    }
}

impl MaintenanceHook for AllocatorTrim {
    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    fn reclaim_memory(&self) {
        // SAFETY: malloc_trim only walks glibc's own arenas
        let released = unsafe { libc::malloc_trim(0) };
        log::debug!("malloc_trim released memory: {}", released != 0);
    }

    #[cfg(not(all(target_os = "linux", target_env = "gnu")))]
    fn reclaim_memory(&self) {
        log::debug!("Memory reclaim not supported on this platform");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reclaim_is_repeatable() {
        let hook = AllocatorTrim::new();
        let scratch: Vec<Vec<u8>> = (0..64).map(|_| vec![0u8; 64 * 1024]).collect();
        drop(scratch);

        hook.reclaim_memory();
        hook.reclaim_memory();
    }
}
