use thiserror::Error;

/// Domain errors raised while loading measurements or fitting the model.
#[derive(Debug, Error)]
pub enum ScreenError {
    #[error("file has no header row after the title row")]
    MissingHeader,

    #[error("missing required column '{0}'")]
    MissingColumn(String),

    #[error("row {row}, column '{column}': '{value}' is not a number")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("cannot fit a model on an empty training set")]
    EmptyTrainingSet,

    #[error("training target is constant ({0}); nothing to learn")]
    ConstantTarget(f64),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
