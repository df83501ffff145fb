use thiserror::Error;

/// An operating system call that did not succeed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message} ({code:#010x})")]
pub struct PlatformError {
    pub code: i32,
    pub message: String,
}

impl PlatformError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[cfg(windows)]
impl From<windows::core::Error> for PlatformError {
    fn from(e: windows::core::Error) -> Self {
        Self::new(e.code().0, e.message().to_string())
    }
}

/// The two steps that can stop the program before its event loop starts.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("RegisterClass failed")]
    RegisterClass(#[source] PlatformError),

    #[error("CreateWindowEx failed")]
    CreateWindow(#[source] PlatformError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_error_names_the_failed_step() {
        let source = PlatformError::new(0x57, "The parameter is incorrect.");

        assert_eq!(
            StartupError::RegisterClass(source.clone()).to_string(),
            "RegisterClass failed"
        );
        assert_eq!(
            StartupError::CreateWindow(source).to_string(),
            "CreateWindowEx failed"
        );
    }

    #[test]
    fn platform_error_shows_code_in_hex() {
        let e = PlatformError::new(0x57, "The parameter is incorrect.");
        assert_eq!(e.to_string(), "The parameter is incorrect. (0x00000057)");
    }
}
