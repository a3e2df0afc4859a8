// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
//   checkpoint.rs — Saving and loading model weights with
//                   Burn's CompactRecorder, plus the model
//                   config as JSON so a model can be rebuilt
//                   before its weights are loaded into it.
//
// Reference: Burn Book §5 (Records and Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;
