use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ValidationMissingArgument,
    ValidationInvalidArgument,

    TypeReferenceInvalid,
    ModuleResolutionFailed,
    NameCollision,

    RenderFailed,
    FormatFailed,

    InternalIoError,
    InternalJsonError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationMissingArgument => "validation.missing_argument",
            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",

            ErrorCode::TypeReferenceInvalid => "type.invalid_reference",
            ErrorCode::ModuleResolutionFailed => "module.resolution_failed",
            ErrorCode::NameCollision => "generate.name_collision",

            ErrorCode::RenderFailed => "generate.render_failed",
            ErrorCode::FormatFailed => "generate.format_failed",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
        }
    }

    /// True for errors caused by how the CLI was invoked rather than by the pipeline.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            ErrorCode::ValidationMissingArgument | ErrorCode::ValidationInvalidArgument
        )
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingArgumentDetails {
    pub args: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeReferenceDetails {
    pub type_ref: String,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleResolutionDetails {
    pub dir: String,
    pub problem: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NameCollisionDetails {
    pub alias: String,
    pub import_path: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatFailedDetails {
    pub path: String,
    pub formatter: String,
    pub diagnostic: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalIoErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalJsonErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

fn to_details<T: Serialize>(details: T) -> Value {
    serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
        }
    }

    pub fn validation_missing_argument(args: Vec<String>) -> Self {
        Self::new(
            ErrorCode::ValidationMissingArgument,
            format!("Missing required argument: {}", args.join(", ")),
            to_details(MissingArgumentDetails { args }),
        )
    }

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
        value: Option<String>,
    ) -> Self {
        let field = field.into();
        let problem = problem.into();
        Self::new(
            ErrorCode::ValidationInvalidArgument,
            format!("Invalid argument '{}': {}", field, problem),
            to_details(InvalidArgumentDetails {
                field,
                problem,
                value,
            }),
        )
    }

    pub fn type_reference_invalid(type_ref: impl Into<String>, problem: impl Into<String>) -> Self {
        let problem = problem.into();
        Self::new(
            ErrorCode::TypeReferenceInvalid,
            problem.clone(),
            to_details(TypeReferenceDetails {
                type_ref: type_ref.into(),
                problem,
            }),
        )
        .with_hint("Pass the type as package.Name, e.g. github.com/acme/app/models.User")
    }

    pub fn module_resolution_failed(dir: impl Into<String>, problem: impl Into<String>) -> Self {
        Self::module_resolution_ambiguous(dir, problem, Vec::new())
    }

    pub fn module_resolution_ambiguous(
        dir: impl Into<String>,
        problem: impl Into<String>,
        candidates: Vec<String>,
    ) -> Self {
        let dir = dir.into();
        let problem = problem.into();
        Self::new(
            ErrorCode::ModuleResolutionFailed,
            format!("{} ({})", problem, dir),
            to_details(ModuleResolutionDetails {
                dir,
                problem,
                candidates,
            }),
        )
    }

    pub fn name_collision(alias: impl Into<String>, import_path: impl Into<String>) -> Self {
        let alias = alias.into();
        let import_path = import_path.into();
        Self::new(
            ErrorCode::NameCollision,
            format!(
                "Import alias '{}' for \"{}\" collides with an identifier in the generated loader",
                alias, import_path
            ),
            to_details(NameCollisionDetails {
                alias,
                import_path,
            }),
        )
        .with_hint("Move the type into a package whose last path segment is not reserved")
    }

    pub fn render_failed(problem: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::RenderFailed,
            "Generating code failed",
            serde_json::json!({ "error": problem.into() }),
        )
    }

    pub fn format_failed(
        path: impl Into<String>,
        formatter: impl Into<String>,
        diagnostic: impl Into<String>,
    ) -> Self {
        let diagnostic = diagnostic.into();
        Self::new(
            ErrorCode::FormatFailed,
            format!("Unable to format generated code: {}", diagnostic),
            to_details(FormatFailedDetails {
                path: path.into(),
                formatter: formatter.into(),
                diagnostic,
            }),
        )
        .with_hint("Check that --keys and the type reference are valid Go type expressions")
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        let error = error.into();
        let message = match &context {
            Some(ctx) => format!("{}: {}", ctx, error),
            None => error.clone(),
        };
        Self::new(
            ErrorCode::InternalIoError,
            message,
            to_details(InternalIoErrorDetails { error, context }),
        )
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        Self::new(
            ErrorCode::InternalJsonError,
            "JSON error",
            to_details(InternalJsonErrorDetails {
                error: error.into(),
                context,
            }),
        )
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }
}
