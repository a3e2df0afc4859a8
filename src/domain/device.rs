// ============================================================
// Layer 3 — Device Selection
// ============================================================
// Where the forward pass runs is not the model's concern.
// The CLI picks one of these and the ML layer maps it onto a
// concrete Burn backend.

use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceKind {
    /// NdArray backend on the CPU
    #[default]
    Cpu,
    /// Wgpu backend on the default GPU adapter
    Wgpu,
}

impl FromStr for DeviceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cpu" | "ndarray"      => Ok(Self::Cpu),
            "wgpu" | "gpu" | "cuda" => Ok(Self::Wgpu),
            other => Err(format!("unknown device '{other}' (expected cpu or wgpu)")),
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu  => write!(f, "cpu"),
            Self::Wgpu => write!(f, "wgpu"),
        }
    }
}
