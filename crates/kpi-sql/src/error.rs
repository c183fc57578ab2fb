use kpi_model::{Field, Topic};

#[derive(Debug, thiserror::Error)]
pub enum SqlError {
    #[error("{topic}.{field} has no benchmark source to rank by")]
    MissingBenchmark { topic: Topic, field: Field },

    #[error("top-n limit must be at least 1")]
    EmptyTopN,

    #[error(transparent)]
    Config(#[from] kpi_model::ConfigError),
}

pub type Result<T> = std::result::Result<T, SqlError>;
