//! Library side of the `kpi` binary: logging setup and the generation batch.

pub mod logging;
pub mod pipeline;
pub mod types;
