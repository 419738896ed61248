pub type MoleResult<T> = Result<T, MoleError>;
pub type ParserResult<T> = MoleResult<T>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoleErrorCategory {
    InputValidation,
    ShapeMismatch,
    IoSystem,
    SolverInvocation,
    SolverTimeout,
    Parse,
    Internal,
}

impl MoleErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::InputValidation => 2,
            Self::ShapeMismatch => 3,
            Self::IoSystem => 4,
            Self::SolverInvocation => 5,
            Self::SolverTimeout => 6,
            Self::Parse => 7,
            Self::Internal => 8,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InputValidation => "InputValidationError",
            Self::ShapeMismatch => "ShapeMismatchError",
            Self::IoSystem => "IOError",
            Self::SolverInvocation => "SolverInvocationError",
            Self::SolverTimeout => "SolverTimeoutError",
            Self::Parse => "ParseError",
            Self::Internal => "InternalError",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} [{}] {}", .category.as_str(), .code, .message)]
pub struct MoleError {
    category: MoleErrorCategory,
    code: &'static str,
    message: String,
    captured_output: Option<String>,
}

impl MoleError {
    pub fn new(category: MoleErrorCategory, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            category,
            code,
            message: message.into(),
            captured_output: None,
        }
    }

    pub fn input_validation(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(MoleErrorCategory::InputValidation, code, message)
    }

    pub fn shape_mismatch(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(MoleErrorCategory::ShapeMismatch, code, message)
    }

    pub fn io_system(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(MoleErrorCategory::IoSystem, code, message)
    }

    pub fn solver_invocation(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(MoleErrorCategory::SolverInvocation, code, message)
    }

    pub fn solver_timeout(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(MoleErrorCategory::SolverTimeout, code, message)
    }

    pub fn parse(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(MoleErrorCategory::Parse, code, message)
    }

    pub fn internal(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(MoleErrorCategory::Internal, code, message)
    }

    /// Attaches the raw solver console text so callers can report it next to the failure.
    pub fn with_captured_output(mut self, output: impl Into<String>) -> Self {
        self.captured_output = Some(output.into());
        self
    }

    pub const fn category(&self) -> MoleErrorCategory {
        self.category
    }

    pub const fn code(&self) -> &'static str {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn captured_output(&self) -> Option<&str> {
        self.captured_output.as_deref()
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.code, self.message)
    }

    pub fn fatal_exit_line(&self) -> String {
        format!("FATAL EXIT CODE: {}", self.exit_code())
    }
}
