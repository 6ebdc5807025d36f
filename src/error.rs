pub type VoxfaceResult<T> = Result<T, VoxfaceError>;

#[derive(thiserror::Error, Debug)]
pub enum VoxfaceError {
    /// Missing, unsupported, or empty input (file not found, bad extension,
    /// zero-duration audio). Aborts the run.
    #[error("input error: {0}")]
    Input(String),

    /// A stage produced output violating its shape contract. Aborts the
    /// current pipeline invocation.
    #[error("shape error: {0}")]
    Shape(String),

    /// A codec/writer resource could not be opened. Recoverable by falling
    /// back to the next codec in the preference list.
    #[error("resource error: {0}")]
    Resource(String),

    /// The external mux tool is missing or exited non-zero. Always recovered
    /// locally (degraded success); never causes a non-zero process exit.
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// The final default codec also failed; there is no further fallback.
    #[error("fatal error: {0}")]
    Fatal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VoxfaceError {
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    pub fn shape(msg: impl Into<String>) -> Self {
        Self::Shape(msg.into())
    }

    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    pub fn external_tool(msg: impl Into<String>) -> Self {
        Self::ExternalTool(msg.into())
    }

    pub fn fatal(msg: impl Into<String>) -> Self {
        Self::Fatal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(VoxfaceError::input("x").to_string().contains("input error:"));
        assert!(VoxfaceError::shape("x").to_string().contains("shape error:"));
        assert!(
            VoxfaceError::resource("x")
                .to_string()
                .contains("resource error:")
        );
        assert!(
            VoxfaceError::external_tool("x")
                .to_string()
                .contains("external tool error:")
        );
        assert!(VoxfaceError::fatal("x").to_string().contains("fatal error:"));
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = VoxfaceError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
