//! Domain error types.

/// Top-level error type for sweeptrader.
#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("malformed input: {reason}")]
    MalformedInput { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("unknown strategy: {name}")]
    UnknownStrategy { name: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SweepError {
    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        SweepError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        SweepError::MalformedInput {
            reason: reason.into(),
        }
    }

    /// Process exit status: 1 I/O, 2 config, 3 input data, 4 parameter or strategy.
    pub fn exit_status(&self) -> u8 {
        match self {
            SweepError::Io(_) => 1,
            SweepError::ConfigParse { .. }
            | SweepError::ConfigMissing { .. }
            | SweepError::ConfigInvalid { .. } => 2,
            SweepError::MalformedInput { .. } | SweepError::Json(_) => 3,
            SweepError::InvalidParameter { .. } | SweepError::UnknownStrategy { .. } => 4,
        }
    }
}

impl From<&SweepError> for std::process::ExitCode {
    fn from(err: &SweepError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_parameter_names_the_axis() {
        let err = SweepError::invalid_parameter("bb_period", "must be positive");
        assert_eq!(err.to_string(), "invalid parameter bb_period: must be positive");
    }

    #[test]
    fn config_missing_display() {
        let err = SweepError::ConfigMissing {
            section: "sweep".into(),
            key: "axes".into(),
        };
        assert_eq!(err.to_string(), "missing config key [sweep] axes");
    }

    #[test]
    fn io_converts_transparently() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: SweepError = io.into();
        assert!(matches!(err, SweepError::Io(_)));
        assert_eq!(err.to_string(), "gone");
    }

    #[test]
    fn exit_status_by_kind() {
        let io: SweepError = std::io::Error::other("disk").into();
        assert_eq!(io.exit_status(), 1);
        let config = SweepError::ConfigInvalid {
            section: "sweep".into(),
            key: "top_k".into(),
            reason: "must be at least 1".into(),
        };
        assert_eq!(config.exit_status(), 2);
        assert_eq!(SweepError::malformed("record 0").exit_status(), 3);
        assert_eq!(SweepError::invalid_parameter("p", "zero").exit_status(), 4);
        let unknown = SweepError::UnknownStrategy { name: "x".into() };
        assert_eq!(unknown.exit_status(), 4);
    }
}
