// Pipeline module: the consume -> decode -> transform -> encode -> produce loop
//
// - channel.rs   - RecordSource / RecordSink contracts
// - transform.rs - Transform stage (identity in this relay)
// - state.rs     - lifecycle state, counters, status snapshots
// - engine.rs    - the single-lane engine
// - lifecycle.rs - signal handling and bounded drain

pub mod channel;
pub mod engine;
pub mod lifecycle;
pub mod state;
pub mod transform;

pub use channel::{RecordSink, RecordSource};
pub use engine::PipelineEngine;
pub use lifecycle::{ShutdownOutcome, run_until_signal, termination_signal};
pub use state::{PipelineReport, PipelineState, PipelineStats, PipelineStatus};
pub use transform::{IdentityTransform, Transform, TransformedRecord};
