//! CPU capability probing and deterministic backend selection.
//!
//! Detection and selection are kept apart: [`CpuCapabilities::detect`] reads
//! the hardware, [`select_backend`] is a pure function of the record, so a
//! fixed capability value can be injected in tests.

use serde::{Deserialize, Serialize};

use crate::backend::BackendKind;

/// Instruction-set extensions relevant to backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct CpuCapabilities {
    /// SSE2 (baseline on `x86_64`).
    pub sse2: bool,
    /// AVX2.
    pub avx2: bool,
    /// ARM Advanced SIMD.
    pub neon: bool,
    /// WebAssembly 128-bit SIMD (compile-time target feature).
    pub simd128: bool,
}

impl CpuCapabilities {
    /// Detects available features on the current CPU.
    #[must_use]
    pub fn detect() -> Self {
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        {
            Self {
                sse2: is_x86_feature_detected!("sse2"),
                avx2: is_x86_feature_detected!("avx2"),
                neon: false,
                simd128: false,
            }
        }

        #[cfg(target_arch = "aarch64")]
        {
            Self {
                sse2: false,
                avx2: false,
                neon: std::arch::is_aarch64_feature_detected!("neon"),
                simd128: false,
            }
        }

        #[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
        {
            Self {
                sse2: false,
                avx2: false,
                neon: false,
                simd128: cfg!(target_feature = "simd128"),
            }
        }
    }

    /// A record with no extensions; always selects the scalar strategy.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            sse2: false,
            avx2: false,
            neon: false,
            simd128: false,
        }
    }

    /// Names of the detected extensions, in selection order.
    #[must_use]
    pub fn feature_names(&self) -> Vec<&'static str> {
        [
            (self.avx2, "avx2"),
            (self.neon, "neon"),
            (self.sse2, "sse2"),
            (self.simd128, "simd128"),
        ]
        .into_iter()
        .filter_map(|(present, name)| present.then_some(name))
        .collect()
    }
}

/// Picks the finest strategy the capability record allows.
///
/// avx2 → `Avx2`; neon → `Neon`; sse2 or simd128 → `Wide`; otherwise `Scalar`.
#[must_use]
pub const fn select_backend(caps: &CpuCapabilities) -> BackendKind {
    if caps.avx2 {
        BackendKind::Avx2
    } else if caps.neon {
        BackendKind::Neon
    } else if caps.sse2 || caps.simd128 {
        BackendKind::Wide
    } else {
        BackendKind::Scalar
    }
}

/// Strategies the current CPU can execute, coarsest first.
#[must_use]
pub fn available_backends() -> Vec<BackendKind> {
    BackendKind::ALL
        .into_iter()
        .filter(|kind| kind.is_supported_on_host())
        .collect()
}
