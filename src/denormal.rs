//! Scoped flush-denormals guard.
//!
//! DSP feedback paths can decay into subnormal floats, which are catastrophically
//! slow on most FPUs. Every thread that runs `Track::run` installs this guard before
//! touching any sample data and lets it restore the previous mode on drop.
//!
//! Grounded in the same MXCSR bit-twiddling other DSP crates in this ecosystem use
//! for denormal protection, but scoped (save previous value, restore on drop) rather
//! than a fire-and-forget global set.

pub struct DenormalGuard {
    #[cfg_attr(not(target_arch = "x86_64"), allow(dead_code))]
    previous_mxcsr: u32,
}

const FLUSH_TO_ZERO: u32 = 0x8000;
const DENORMALS_ARE_ZERO: u32 = 0x0040;

impl DenormalGuard {
    /// Installs flush-to-zero / denormals-are-zero mode on the current thread,
    /// returning a guard that restores the previous mode when dropped.
    pub fn install() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            // Safety: these intrinsics only affect floating-point rounding/denormal
            // behavior for the current thread and are safe to call at any time.
            let previous_mxcsr = unsafe {
                use std::arch::x86_64::{_mm_getcsr, _mm_setcsr};
                let previous = _mm_getcsr();
                _mm_setcsr(previous | FLUSH_TO_ZERO | DENORMALS_ARE_ZERO);
                previous
            };
            Self { previous_mxcsr }
        }
        #[cfg(not(target_arch = "x86_64"))]
        {
            // aarch64 flushes subnormals to zero by default under the common ABI;
            // other architectures are left as a correctness TODO if ever targeted.
            Self { previous_mxcsr: 0 }
        }
    }
}

impl Drop for DenormalGuard {
    fn drop(&mut self) {
        #[cfg(target_arch = "x86_64")]
        unsafe {
            std::arch::x86_64::_mm_setcsr(self.previous_mxcsr);
        }
    }
}

#[cfg(all(test, target_arch = "x86_64"))]
mod tests {
    use super::*;

    #[test]
    fn restores_previous_mxcsr_on_drop() {
        let before = unsafe { std::arch::x86_64::_mm_getcsr() };
        {
            let _guard = DenormalGuard::install();
            let during = unsafe { std::arch::x86_64::_mm_getcsr() };
            assert_eq!(during & (FLUSH_TO_ZERO | DENORMALS_ARE_ZERO), FLUSH_TO_ZERO | DENORMALS_ARE_ZERO);
        }
        let after = unsafe { std::arch::x86_64::_mm_getcsr() };
        assert_eq!(before, after);
    }
}
