// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers for each CLI command:
//
//   smoke_use_case.rs   — build (or restore) a model and run one
//                         forward pass on random images
//   init_use_case.rs    — build a model and save it as a
//                         checkpoint
//   summary_use_case.rs — report stage shapes and parameter
//                         counts for a configuration
//   model_source.rs     — decide which hyperparameters to use
//                         (flags, a JSON file, or a checkpoint)
//                         and validate them
//
// Rules for this layer:
//   - No model code here
//   - No printing here (that's Layer 1)
//   - Only workflow coordination

pub mod model_source;

pub mod smoke_use_case;

pub mod init_use_case;

pub mod summary_use_case;
