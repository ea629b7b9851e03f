//! Conversions from external infrastructure errors into domain errors.

use autojoin_domain::AutoJoinError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub AutoJoinError);

impl From<InfraError> for AutoJoinError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<AutoJoinError> for InfraError {
    fn from(value: AutoJoinError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoAutoJoinError {
    fn into_autojoin(self) -> AutoJoinError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → AutoJoinError */
/* -------------------------------------------------------------------------- */

impl IntoAutoJoinError for SqlError {
    fn into_autojoin(self) -> AutoJoinError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match err.code {
                    ErrorCode::DatabaseBusy => AutoJoinError::Database("database is busy".into()),
                    ErrorCode::DatabaseLocked => {
                        AutoJoinError::Database("database is locked".into())
                    }
                    ErrorCode::ReadOnly => {
                        AutoJoinError::Database("database is read-only".into())
                    }
                    ErrorCode::NotADatabase => {
                        AutoJoinError::Database("file is not a database".into())
                    }
                    _ => AutoJoinError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => AutoJoinError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                AutoJoinError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                AutoJoinError::Database(format!("invalid column type: {ty}"))
            }
            RE::Utf8Error(_) => {
                AutoJoinError::Database("invalid UTF-8 returned from sqlite".into())
            }
            RE::InvalidPath(path) => AutoJoinError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => AutoJoinError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_autojoin())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → AutoJoinError */
/* -------------------------------------------------------------------------- */

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(AutoJoinError::Database(format!("connection pool error: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → AutoJoinError */
/* -------------------------------------------------------------------------- */

impl IntoAutoJoinError for HttpError {
    fn into_autojoin(self) -> AutoJoinError {
        if self.is_timeout() {
            return AutoJoinError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return AutoJoinError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => AutoJoinError::Auth(message),
                404 => AutoJoinError::NotFound(message),
                429 => AutoJoinError::Network(message),
                400..=499 => AutoJoinError::InvalidInput(message),
                _ => AutoJoinError::Network(message),
            };
        }

        if self.is_decode() {
            return AutoJoinError::InvalidInput(format!("malformed response body: {self}"));
        }

        AutoJoinError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_autojoin())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use reqwest::{Client, StatusCode};
    use rusqlite::ffi::{Error as FfiError, ErrorCode};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn sqlite_busy_maps_to_database_error() {
        let err = SqlError::SqliteFailure(
            FfiError { code: ErrorCode::DatabaseBusy, extended_code: 5 },
            Some("database is locked".into()),
        );

        let mapped: AutoJoinError = InfraError::from(err).into();
        match mapped {
            AutoJoinError::Database(msg) => assert!(msg.contains("busy")),
            other => panic!("expected database error, got {other:?}"),
        }
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        let mapped: AutoJoinError = InfraError::from(SqlError::QueryReturnedNoRows).into();
        assert!(matches!(mapped, AutoJoinError::NotFound(_)));
    }

    async fn status_error(status: StatusCode) -> HttpError {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;

        let client = Client::builder().no_proxy().build().unwrap();
        client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err()
    }

    #[tokio::test]
    async fn http_status_401_maps_to_auth_error() {
        let mapped: AutoJoinError =
            InfraError::from(status_error(StatusCode::UNAUTHORIZED).await).into();
        match mapped {
            AutoJoinError::Auth(msg) => assert!(msg.contains("401")),
            other => panic!("expected auth error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn http_status_503_maps_to_network_error() {
        let mapped: AutoJoinError =
            InfraError::from(status_error(StatusCode::SERVICE_UNAVAILABLE).await).into();
        assert!(matches!(mapped, AutoJoinError::Network(_)));
    }
}
