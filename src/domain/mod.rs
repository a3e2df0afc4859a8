// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types describing the TransUNet architecture
// without touching any tensor:
//
//   dims.rs       — the eight hyperparameters and their
//                   validation rules
//   shape_plan.rs — per-stage tensor shapes implied by a
//                   set of hyperparameters
//   error.rs      — configuration errors
//   device.rs     — which Burn backend to run on
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums and arithmetic

/// Model hyperparameters and validation
pub mod dims;

/// Stage-by-stage shape arithmetic
pub mod shape_plan;

/// Configuration error type
pub mod error;

/// Backend / device selection
pub mod device;
