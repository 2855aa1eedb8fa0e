use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    /// The allocate capability ran but left its output slot empty.
    pub fn acquisition_failed(resource: impl Into<String>) -> Error {
        Error(
            ErrorKind::AcquisitionFailed {
                resource: resource.into(),
            }
            .into(),
        )
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_operation(name: impl Into<String>) -> Error {
        Error(ErrorKind::InvalidOperation { name: name.into() }.into())
    }

    /// Returns `true` if this error reports a failed resource acquisition.
    pub fn is_acquisition_failure(&self) -> bool {
        matches!(self.kind(), ErrorKind::AcquisitionFailed { .. })
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("failed to acquire '{resource}': allocator produced no resource")]
    AcquisitionFailed { resource: String },

    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid operation {name}")]
    InvalidOperation { name: String },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquisition_failed_display() {
        let err = Error::acquisition_failed("Sample");
        assert!(err.is_acquisition_failure());
        assert_eq!(
            err.to_string(),
            "failed to acquire 'Sample': allocator produced no resource"
        );
    }

    #[test]
    fn test_into_kind() {
        let err = Error::invalid_arg("scenario", "unknown name");
        assert!(!err.is_acquisition_failure());
        match err.into_kind() {
            ErrorKind::InvalidArgument { name, message } => {
                assert_eq!(name, "scenario");
                assert_eq!(message, "unknown name");
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn test_from_kind() {
        let err: Error = ErrorKind::InvalidOperation {
            name: "deref".into(),
        }
        .into();
        assert_eq!(err.to_string(), "invalid operation deref");
    }
}
