//! Authentication outcome classification.

use std::fmt;

use tracing::warn;

use super::client::ClientError;
use crate::core::{Code, Response};

/// What a verified response means for the user being authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthOutcome {
    /// Access-Accept.
    Accepted,
    /// Access-Reject.
    Rejected,
    /// Password-Reject.
    PasswordRejected,
    /// Password-Expired.
    PasswordExpired,
    /// Any other code. Treated as a protocol extension this client does not
    /// understand.
    Unrecognized(Code),
}

impl AuthOutcome {
    /// Classify a status code. Pure.
    pub fn classify(code: Code) -> Self {
        match code {
            Code::ACCESS_ACCEPT => AuthOutcome::Accepted,
            Code::ACCESS_REJECT => AuthOutcome::Rejected,
            Code::PASSWORD_REJECT => AuthOutcome::PasswordRejected,
            Code::PASSWORD_EXPIRED => AuthOutcome::PasswordExpired,
            other => AuthOutcome::Unrecognized(other),
        }
    }

    /// Whether access was granted.
    pub fn is_accepted(&self) -> bool {
        matches!(self, AuthOutcome::Accepted)
    }
}

impl fmt::Display for AuthOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthOutcome::Accepted => f.write_str("accepted"),
            AuthOutcome::Rejected => f.write_str("rejected"),
            AuthOutcome::PasswordRejected => f.write_str("password rejected"),
            AuthOutcome::PasswordExpired => f.write_str("password expired"),
            AuthOutcome::Unrecognized(code) => write!(f, "unrecognized ({code})"),
        }
    }
}

impl Response {
    /// Classify this response, raising on codes outside the known set.
    pub fn outcome(&self) -> Result<AuthOutcome, ClientError> {
        match AuthOutcome::classify(self.code) {
            AuthOutcome::Unrecognized(code) => {
                warn!(%code, identifier = self.identifier, "unrecognized response code");
                Err(ClientError::UnrecognizedCode(code))
            }
            outcome => Ok(outcome),
        }
    }
}
