use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use snafu::Snafu;
use std::num::ParseIntError;

pub type SatchelResult<T> = Result<T, SatchelError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SatchelError {
    #[snafu(display("Error opening database after {} attempt(s)", attempts))]
    OpenDatabase { source: sqlx::Error, attempts: u32 },
    #[snafu(display("Error getting db connection"))]
    GetDatabaseConnection { source: sqlx::Error },
    #[snafu(display("Error making SQL query"))]
    MakeQuery { source: sqlx::Error },
    #[snafu(display("Error migrating DB schema"))]
    Migrate { source: sqlx::migrate::MigrateError },
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Unable to parse env var `{}` as a number", name))]
    ParseEnvVar {
        source: ParseIntError,
        name: &'static str,
    },
    #[snafu(display("Env var `{}` must be at least 1", name))]
    ZeroEnvVar { name: &'static str },
    #[snafu(display("Unable to listen on {}", addr))]
    BindListener {
        source: std::io::Error,
        addr: String,
    },
    #[snafu(display("Error serving app"))]
    Serve { source: std::io::Error },
    #[snafu(display("Student not found"))]
    MissingStudent { id: i32 },
    #[snafu(display("Item not found"))]
    MissingItem { id: i32 },
    #[snafu(display("Name is required"))]
    NameRequired,
    #[snafu(display("At least one of name or description is required"))]
    EmptyItemUpdate,
    #[snafu(display("`{}` must be at most {} characters", field, max))]
    TooLong { field: &'static str, max: usize },
    #[snafu(display("{}", source.body_text()))]
    BadJson { source: JsonRejection },
    #[snafu(display("{}", source.body_text()))]
    BadPath { source: PathRejection },
}

impl From<JsonRejection> for SatchelError {
    fn from(source: JsonRejection) -> Self {
        Self::BadJson { source }
    }
}

impl From<PathRejection> for SatchelError {
    fn from(source: PathRejection) -> Self {
        Self::BadPath { source }
    }
}

impl SatchelError {
    pub fn status_code(&self) -> StatusCode {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR; //internal server error
        const NF: StatusCode = StatusCode::NOT_FOUND; //not found
        const BI: StatusCode = StatusCode::BAD_REQUEST; //bad input

        match self {
            Self::OpenDatabase { .. } | Self::GetDatabaseConnection { .. } => ISE,
            Self::MakeQuery { .. } | Self::Migrate { .. } => ISE,
            Self::BadEnvVar { .. } | Self::ParseEnvVar { .. } | Self::ZeroEnvVar { .. } => ISE,
            Self::BindListener { .. } | Self::Serve { .. } => ISE,
            Self::MissingStudent { .. } | Self::MissingItem { .. } => NF,
            Self::NameRequired | Self::EmptyItemUpdate | Self::TooLong { .. } => BI,
            Self::BadJson { source } => source.status(),
            Self::BadPath { source } => source.status(),
        }
    }
}

impl IntoResponse for SatchelError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let message = if status_code.is_server_error() {
            error!(?self, "Error!");
            "Internal server error".to_string()
        } else {
            debug!(?self, %status_code, "Client error");
            self.to_string()
        };

        (status_code, Json(json!({ "error": message }))).into_response()
    }
}
