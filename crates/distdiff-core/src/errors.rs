use thiserror::Error;

/// Result type alias using DistDiffError
pub type Result<T> = std::result::Result<T, DistDiffError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers can match on without
/// parsing messages. Configuration kinds are structural: they abort a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffErrorKind {
    // Configuration/Structural
    InvalidRoot,
    InvalidConfig,
    ModulesDirMissing,
    LayersConfInvalid,
    LayerMissing,
    UnknownPhase,
    NoPhases,

    // Content inspection
    Io,
    Hashing,
    ModuleDescriptor,
    Archive,
    Serialization,

    // Internal
    Internal,
}

impl DiffErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            DiffErrorKind::InvalidRoot => "ERR_INVALID_ROOT",
            DiffErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            DiffErrorKind::ModulesDirMissing => "ERR_MODULES_DIR_MISSING",
            DiffErrorKind::LayersConfInvalid => "ERR_LAYERS_CONF_INVALID",
            DiffErrorKind::LayerMissing => "ERR_LAYER_MISSING",
            DiffErrorKind::UnknownPhase => "ERR_UNKNOWN_PHASE",
            DiffErrorKind::NoPhases => "ERR_NO_PHASES",
            DiffErrorKind::Io => "ERR_IO",
            DiffErrorKind::Hashing => "ERR_HASHING",
            DiffErrorKind::ModuleDescriptor => "ERR_MODULE_DESCRIPTOR",
            DiffErrorKind::Archive => "ERR_ARCHIVE",
            DiffErrorKind::Serialization => "ERR_SERIALIZATION",
            DiffErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether this kind denotes a structural/configuration failure
    ///
    /// Such failures abort the pipeline instead of being tolerated per phase.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DiffErrorKind::InvalidRoot
                | DiffErrorKind::InvalidConfig
                | DiffErrorKind::ModulesDirMissing
                | DiffErrorKind::LayersConfInvalid
                | DiffErrorKind::LayerMissing
                | DiffErrorKind::UnknownPhase
                | DiffErrorKind::NoPhases
        )
    }
}

/// Canonical structured error type
///
/// Carries classification fields for programmatic handling plus the
/// filesystem context (path, layer, relative path) needed to debug a run.
#[derive(Debug, Clone)]
pub struct DiffError {
    kind: DiffErrorKind,
    op: Option<String>,
    path: Option<String>,
    layer: Option<String>,
    relative_path: Option<String>,
    message: String,
}

impl DiffError {
    /// Create a new error with the specified kind
    pub fn new(kind: DiffErrorKind) -> Self {
        Self {
            kind,
            op: None,
            path: None,
            layer: None,
            relative_path: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add filesystem path context
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add layer context
    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = Some(layer.into());
        self
    }

    /// Add artifact relative path context
    pub fn with_relative_path(mut self, relative_path: impl Into<String>) -> Self {
        self.relative_path = Some(relative_path.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> DiffErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Whether this error aborts a run
    pub fn is_configuration(&self) -> bool {
        self.kind.is_configuration()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the path context, if any
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Get the layer context, if any
    pub fn layer(&self) -> Option<&str> {
        self.layer.as_deref()
    }

    /// Get the relative path context, if any
    pub fn relative_path(&self) -> Option<&str> {
        self.relative_path.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for DiffError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(layer) = &self.layer {
            write!(f, " (layer: {})", layer)?;
        }
        if let Some(relative_path) = &self.relative_path {
            write!(f, " (relative_path: {})", relative_path)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        Ok(())
    }
}

impl std::error::Error for DiffError {}

// ========== End Error Facility ==========

/// Error taxonomy for distribution comparison operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DistDiffError {
    // ===== Configuration Errors =====
    /// A distribution root is missing or not a directory
    #[error("Invalid distribution root {path}: {reason}")]
    InvalidRoot { path: String, reason: String },

    /// Run configuration could not be parsed or is inconsistent
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// The `modules` directory of a distribution is missing
    #[error("Modules directory missing: {path}")]
    ModulesDirMissing { path: String },

    /// `modules/layers.conf` exists but does not name any layer
    #[error("Invalid layers configuration {path}: {reason}")]
    LayersConfInvalid { path: String, reason: String },

    /// A configured layer has no directory in one of the distributions
    #[error("Layer '{layer}' missing in distribution {side}: {path}")]
    LayerMissing {
        layer: String,
        side: String,
        path: String,
    },

    /// No factory registered under the requested phase name
    #[error("Unknown phase: {name}")]
    UnknownPhase { name: String },

    /// The phase list of a run is empty
    #[error("No phases configured")]
    NoPhases,

    // ===== Content Errors =====
    /// Filesystem access failed
    #[error("I/O error at {path}: {message}")]
    Io { path: String, message: String },

    /// A directory digest could not be computed
    #[error("Cannot hash {path}: {reason}")]
    Hashing { path: String, reason: String },

    /// A `module.xml` descriptor is malformed
    #[error("Invalid module descriptor {path}: {reason}")]
    ModuleDescriptor { path: String, reason: String },

    /// A jar/zip archive could not be read
    #[error("Cannot read archive {path}: {reason}")]
    Archive { path: String, reason: String },

    /// Result or configuration (de)serialization failed
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },

    /// An invariant of the comparison was broken
    #[error("Internal error: {reason}")]
    Internal { reason: String },
}

impl DistDiffError {
    /// Build an `Io` error for a path
    pub fn io(path: impl AsRef<std::path::Path>, err: std::io::Error) -> Self {
        DistDiffError::Io {
            path: path.as_ref().display().to_string(),
            message: err.to_string(),
        }
    }

    /// Build an `Archive` error for a path
    pub fn archive(path: impl AsRef<std::path::Path>, reason: impl ToString) -> Self {
        DistDiffError::Archive {
            path: path.as_ref().display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Build a `ModuleDescriptor` error for a path
    pub fn module_descriptor(path: impl AsRef<std::path::Path>, reason: impl ToString) -> Self {
        DistDiffError::ModuleDescriptor {
            path: path.as_ref().display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Get the canonical kind for this error
    pub fn kind(&self) -> DiffErrorKind {
        match self {
            DistDiffError::InvalidRoot { .. } => DiffErrorKind::InvalidRoot,
            DistDiffError::InvalidConfig { .. } => DiffErrorKind::InvalidConfig,
            DistDiffError::ModulesDirMissing { .. } => DiffErrorKind::ModulesDirMissing,
            DistDiffError::LayersConfInvalid { .. } => DiffErrorKind::LayersConfInvalid,
            DistDiffError::LayerMissing { .. } => DiffErrorKind::LayerMissing,
            DistDiffError::UnknownPhase { .. } => DiffErrorKind::UnknownPhase,
            DistDiffError::NoPhases => DiffErrorKind::NoPhases,
            DistDiffError::Io { .. } => DiffErrorKind::Io,
            DistDiffError::Hashing { .. } => DiffErrorKind::Hashing,
            DistDiffError::ModuleDescriptor { .. } => DiffErrorKind::ModuleDescriptor,
            DistDiffError::Archive { .. } => DiffErrorKind::Archive,
            DistDiffError::Serialization { .. } => DiffErrorKind::Serialization,
            DistDiffError::Internal { .. } => DiffErrorKind::Internal,
        }
    }

    /// Whether this error aborts a run
    pub fn is_configuration(&self) -> bool {
        self.kind().is_configuration()
    }
}

impl From<walkdir::Error> for DistDiffError {
    fn from(err: walkdir::Error) -> Self {
        let path = err
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        DistDiffError::Io {
            path,
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for DistDiffError {
    fn from(err: toml::de::Error) -> Self {
        DistDiffError::InvalidConfig {
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for DistDiffError {
    fn from(err: serde_json::Error) -> Self {
        DistDiffError::Serialization {
            reason: err.to_string(),
        }
    }
}

/// Convert DistDiffError to DiffError
impl From<DistDiffError> for DiffError {
    fn from(err: DistDiffError) -> Self {
        let kind = err.kind();
        let message = err.to_string();
        let base = DiffError::new(kind).with_message(message);
        match err {
            DistDiffError::InvalidRoot { path, .. }
            | DistDiffError::ModulesDirMissing { path }
            | DistDiffError::LayersConfInvalid { path, .. }
            | DistDiffError::Io { path, .. }
            | DistDiffError::Hashing { path, .. }
            | DistDiffError::ModuleDescriptor { path, .. }
            | DistDiffError::Archive { path, .. } => base.with_path(path),

            DistDiffError::LayerMissing { layer, path, .. } => {
                base.with_layer(layer).with_path(path).with_op("discover_layers")
            }

            DistDiffError::UnknownPhase { .. } | DistDiffError::NoPhases => {
                base.with_op("instantiate_phases")
            }

            DistDiffError::InvalidConfig { .. }
            | DistDiffError::Serialization { .. }
            | DistDiffError::Internal { .. } => base,
        }
    }
}
