use thiserror::Error;
use valstate_core_types::CycleId;

/// Result type alias using CoordinatorError
pub type Result<T> = std::result::Result<T, CoordinatorError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Validation failures are never represented here: they are data carried in
/// `ValidationErrors`. These kinds classify failures of the coordinator's own
/// machinery (configuration, rule registration, engine transport, sessions).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Input
    InvalidConfig,
    AlreadyExists,

    // Engine
    ExternalService,

    // Session
    Closed,

    // Data
    Serialization,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::ExternalService => "ERR_EXTERNAL_SERVICE",
            ExErrorKind::Closed => "ERR_CLOSED",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
        }
    }
}

/// Canonical structured error type
///
/// Carries classification fields for programmatic handling and the
/// reconciliation context (attribute key, cycle) for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    key: Option<String>,
    cycle: Option<CycleId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            key: None,
            cycle: None,
            message: String::new(),
            source: None,
        }
    }

    /// Set the operation name
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Set the attribute or error-map key involved
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set the reconciliation cycle involved
    pub fn with_cycle(mut self, cycle: CycleId) -> Self {
        self.cycle = Some(cycle);
        self
    }

    /// Set the human-readable message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Set the source error (for error chaining)
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn cycle(&self) -> Option<CycleId> {
        self.cycle
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " {}:", op)?;
        }
        if !self.message.is_empty() {
            write!(f, " {}", self.message)?;
        }
        if let Some(key) = &self.key {
            write!(f, " (key: {})", key)?;
        }
        if let Some(cycle) = &self.cycle {
            write!(f, " ({})", cycle)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

// ========== Coordinator Errors ==========

/// Typed failures raised by the coordinator and its collaborators
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoordinatorError {
    #[error("Validation engine rejected the request: {message}")]
    EngineRejected { message: String },

    #[error("Validation rule already registered: {attribute}.{rule} (schema: {schema:?})")]
    DuplicateRule {
        attribute: String,
        rule: String,
        schema: Option<String>,
    },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Validation session is closed")]
    SessionClosed,
}

impl From<CoordinatorError> for ExError {
    fn from(err: CoordinatorError) -> Self {
        match err {
            CoordinatorError::EngineRejected { message } => {
                ExError::new(ExErrorKind::ExternalService)
                    .with_op("validate")
                    .with_message(format!("Engine rejected: {}", message))
            }

            CoordinatorError::DuplicateRule {
                attribute,
                rule,
                schema,
            } => {
                let scope = schema.unwrap_or_else(|| "default".to_string());
                ExError::new(ExErrorKind::AlreadyExists)
                    .with_op("register_rule")
                    .with_key(attribute)
                    .with_message(format!("Rule {} already registered for schema {}", rule, scope))
            }

            CoordinatorError::InvalidConfig { reason } => ExError::new(ExErrorKind::InvalidConfig)
                .with_message(format!("Invalid configuration: {}", reason)),

            CoordinatorError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            CoordinatorError::SessionClosed => {
                ExError::new(ExErrorKind::Closed).with_message("Validation session is closed")
            }
        }
    }
}

/// Conversion from serde_json::Error to CoordinatorError
impl From<serde_json::Error> for CoordinatorError {
    fn from(err: serde_json::Error) -> Self {
        CoordinatorError::Serialization {
            message: err.to_string(),
        }
    }
}

/// Conversion from toml::de::Error to CoordinatorError
impl From<toml::de::Error> for CoordinatorError {
    fn from(err: toml::de::Error) -> Self {
        CoordinatorError::InvalidConfig {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_codes() {
        let cases = [
            (ExErrorKind::InvalidConfig, "ERR_INVALID_CONFIG"),
            (ExErrorKind::AlreadyExists, "ERR_ALREADY_EXISTS"),
            (ExErrorKind::ExternalService, "ERR_EXTERNAL_SERVICE"),
            (ExErrorKind::Closed, "ERR_CLOSED"),
            (ExErrorKind::Serialization, "ERR_SERIALIZATION"),
        ];
        for (kind, expected_code) in cases {
            assert_eq!(kind.code(), expected_code, "Wrong code for {:?}", kind);
        }
    }

    #[test]
    fn test_display_includes_context() {
        let err = ExError::new(ExErrorKind::ExternalService)
            .with_op("validate")
            .with_key("name")
            .with_cycle(CycleId::new(4))
            .with_message("timeout upstream");

        let rendered = err.to_string();
        assert!(rendered.starts_with("[ERR_EXTERNAL_SERVICE] validate:"));
        assert!(rendered.contains("timeout upstream"));
        assert!(rendered.contains("(key: name)"));
        assert!(rendered.contains("(cycle:4)"));
    }

    #[test]
    fn test_source_chain() {
        let inner = ExError::new(ExErrorKind::Serialization).with_message("bad json");
        let outer = ExError::new(ExErrorKind::ExternalService).with_source(inner);

        let source = outer.source_error().expect("source should be set");
        assert_eq!(source.kind(), ExErrorKind::Serialization);
        assert!(std::error::Error::source(&outer).is_some());
    }
}
