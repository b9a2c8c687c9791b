use thiserror::Error;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, testing, and CLI exit status decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Codec
    Decode,

    // History state (non-fatal: nothing was modified)
    NotTracked,
    InvalidCommit,
    UndoPastRoot,
    RedoPastTip,
    InvalidStepCount,

    // Structural/Validation
    InvalidInput,
    NotFound,
    CorruptTracker,
    IdCollision,

    // Integration/IO
    Io,
    Serialization,
    Concurrency,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::Decode => "ERR_DECODE",
            ExErrorKind::NotTracked => "ERR_NOT_TRACKED",
            ExErrorKind::InvalidCommit => "ERR_INVALID_COMMIT",
            ExErrorKind::UndoPastRoot => "ERR_UNDO_PAST_ROOT",
            ExErrorKind::RedoPastTip => "ERR_REDO_PAST_TIP",
            ExErrorKind::InvalidStepCount => "ERR_INVALID_STEP_COUNT",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::CorruptTracker => "ERR_CORRUPT_TRACKER",
            ExErrorKind::IdCollision => "ERR_ID_COLLISION",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Concurrency => "ERR_CONCURRENCY",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// History-state conditions leave the working file and the graph untouched
    pub fn is_non_fatal(&self) -> bool {
        matches!(
            self,
            ExErrorKind::NotTracked
                | ExErrorKind::InvalidCommit
                | ExErrorKind::UndoPastRoot
                | ExErrorKind::RedoPastTip
                | ExErrorKind::InvalidStepCount
        )
    }
}

/// Canonical structured error type
///
/// Carries a classification (`kind`) for programmatic handling and optional
/// context (operation, document, commit, source position) for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    document: Option<String>,
    commit_id: Option<String>,
    position: Option<(usize, usize)>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            document: None,
            commit_id: None,
            position: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add document context (file name or path)
    pub fn with_document(mut self, document: impl Into<String>) -> Self {
        self.document = Some(document.into());
        self
    }

    /// Add commit context
    pub fn with_commit_id(mut self, commit_id: impl Into<String>) -> Self {
        self.commit_id = Some(commit_id.into());
        self
    }

    /// Add a 1-based (line, column) source position
    pub fn with_position(mut self, line: usize, column: usize) -> Self {
        self.position = Some((line, column));
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Whether this error reports a refused history move rather than a failure
    pub fn is_non_fatal(&self) -> bool {
        self.kind.is_non_fatal()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }

    pub fn commit_id(&self) -> Option<&str> {
        self.commit_id.as_deref()
    }

    pub fn position(&self) -> Option<(usize, usize)> {
        self.position
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(document) = &self.document {
            write!(f, " (document: {})", document)?;
        }
        if let Some(commit_id) = &self.commit_id {
            write!(f, " (commit: {})", commit_id)?;
        }
        if let Some((line, column)) = self.position {
            write!(f, " (line {}, column {})", line, column)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Why a piece of bibliographic text could not be decoded
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeErrorReason {
    #[error("unmatched closing brace")]
    UnmatchedClosingBrace,

    #[error("string macro `{abbreviation}` must be enclosed entirely in braces or entirely in quotes")]
    InconsistentStringEnclosure { abbreviation: String },

    #[error("string macro body has no `=`")]
    MissingStringAssignment,

    #[error("field `{field}` of entry `{cite_key}` is repeated with a different value")]
    DuplicateField { cite_key: String, field: String },

    #[error("entry `{cite_key}` has an empty field name")]
    EmptyFieldName { cite_key: String },

    #[error("field `{field}` of entry `{cite_key}` has no value")]
    FieldWithoutValue { cite_key: String, field: String },

    #[error("quoted value is not terminated before end of input")]
    UnterminatedQuote,

    #[error("item body is not closed before end of input")]
    UnterminatedBrace,
}

/// Decoder failure with the approximate position where it was detected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason} (line {line}, column {column})")]
pub struct DecodeError {
    pub reason: DecodeErrorReason,
    /// 1-based line
    pub line: usize,
    /// 1-based column, counted in characters
    pub column: usize,
}

/// Refused history navigation; the store leaves every file untouched
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryStateError {
    #[error("no history is tracked for {document}")]
    NotTracked { document: String },

    #[error("commit {commit_id} does not exist in the history of {document}")]
    InvalidCommit { document: String, commit_id: String },

    #[error("cannot undo {requested} step(s): the current commit has only {available} ancestor(s)")]
    UndoPastRoot { requested: usize, available: usize },

    #[error("cannot redo {requested} step(s): only {available} newer commit(s) follow the current one")]
    RedoPastTip { requested: usize, available: usize },

    #[error("step count must be at least 1")]
    ZeroSteps,
}

impl From<DecodeError> for ExError {
    fn from(err: DecodeError) -> Self {
        ExError::new(ExErrorKind::Decode)
            .with_position(err.line, err.column)
            .with_message(err.reason.to_string())
    }
}

impl From<HistoryStateError> for ExError {
    fn from(err: HistoryStateError) -> Self {
        let message = err.to_string();
        match err {
            HistoryStateError::NotTracked { document } => ExError::new(ExErrorKind::NotTracked)
                .with_document(document)
                .with_message(message),

            HistoryStateError::InvalidCommit {
                document,
                commit_id,
            } => ExError::new(ExErrorKind::InvalidCommit)
                .with_document(document)
                .with_commit_id(commit_id)
                .with_message(message),

            HistoryStateError::UndoPastRoot { .. } => {
                ExError::new(ExErrorKind::UndoPastRoot).with_message(message)
            }

            HistoryStateError::RedoPastTip { .. } => {
                ExError::new(ExErrorKind::RedoPastTip).with_message(message)
            }

            HistoryStateError::ZeroSteps => {
                ExError::new(ExErrorKind::InvalidStepCount).with_message(message)
            }
        }
    }
}
