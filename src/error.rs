use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AppError {
    #[error("not found")]
    NotFound,
    #[error("database error")]
    Database { source: sqlx::Error },
    #[error("template error")]
    Render { source: minijinja::Error },
    #[error("error reading multipart data")]
    Multipart { source: MultipartError },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code = match &self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Multipart { .. } => StatusCode::BAD_REQUEST,
            AppError::Database { source } => {
                error!(error = %source, "database error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Render { source } => {
                error!(error = %source, "template error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status_code, format!("{self}")).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(source: sqlx::Error) -> Self {
        match source {
            sqlx::Error::RowNotFound => AppError::NotFound,
            _ => AppError::Database { source },
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(source: MultipartError) -> Self {
        AppError::Multipart { source }
    }
}

impl From<minijinja::Error> for AppError {
    fn from(source: minijinja::Error) -> Self {
        AppError::Render { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_is_not_found() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::NotFound));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn other_sqlx_errors_are_database_errors() {
        let err = AppError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, AppError::Database { .. }));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn render_errors_are_server_errors() {
        let source = minijinja::Error::new(minijinja::ErrorKind::TemplateNotFound, "missing.html");
        let err = AppError::from(source);
        assert_eq!(err.to_string(), "template error");
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn messages_do_not_leak_causes() {
        let err = AppError::from(sqlx::Error::Protocol("secret detail".into()));
        assert_eq!(err.to_string(), "database error");
    }
}
