use arena_common::types::Language;

/// Errors that stop the judging of a whole submission.
///
/// Per-test failures (compile errors, crashes, timeouts, malformed output)
/// are not errors at this level: the harness records them as case verdicts
/// and keeps going. What remains here is either a validation failure, which
/// is the caller's fault, or an environment problem.
#[derive(Debug, thiserror::Error)]
pub enum JudgeError {
    #[error("Challenge not supported yet: {0}")]
    UnsupportedChallenge(String),

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Challenge {challenge_id} is not available in {language}")]
    LanguageNotOffered {
        challenge_id: String,
        language: Language,
    },

    #[error("Source code exceeds maximum size of {limit} bytes")]
    SourceTooLarge { limit: usize },

    #[error("Toolchain '{program}' is not available: {source}")]
    ToolchainMissing {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Workspace error: {0}")]
    Workspace(#[source] std::io::Error),

    #[error("Judging cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl JudgeError {
    /// Validation failures the caller can fix; everything else is ours.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            JudgeError::UnsupportedChallenge(_)
                | JudgeError::UnsupportedLanguage(_)
                | JudgeError::LanguageNotOffered { .. }
                | JudgeError::SourceTooLarge { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_split() {
        assert!(JudgeError::UnsupportedChallenge("x".into()).is_client_error());
        assert!(JudgeError::UnsupportedLanguage("go".into()).is_client_error());
        assert!(JudgeError::SourceTooLarge { limit: 10 }.is_client_error());
        assert!(JudgeError::LanguageNotOffered {
            challenge_id: "easy-1".into(),
            language: Language::C,
        }
        .is_client_error());
        assert!(!JudgeError::Cancelled.is_client_error());
        assert!(!JudgeError::Internal("boom".into()).is_client_error());
        assert!(!JudgeError::Workspace(std::io::Error::other("disk")).is_client_error());
    }
}
