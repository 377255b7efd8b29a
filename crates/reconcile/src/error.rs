//! Typed failures from the workspace directory.
//!
//! Every per-item failure is handled the same way today (logged, recorded,
//! skipped). The [`ErrorKind`] classification exists so a retry policy can be
//! layered on later without touching the reconcilers.

use std::fmt;

/// Broad classification of a directory failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Connection, TLS, timeout or non-success HTTP status
    Transport,
    /// HTTP 429 or a `ratelimited` API error
    RateLimited,
    /// The referenced channel, user, group or bookmark does not exist
    NotFound,
    /// The request was rejected as malformed or conflicting
    Validation,
    /// Token is missing a scope or is not allowed to act
    Permission,
    /// Response could not be decoded or lacked an expected field
    Protocol,
    /// Any other API error code
    Api,
}

impl ErrorKind {
    /// Whether repeating the same call later could succeed.
    pub fn is_transient(self) -> bool {
        matches!(self, Self::Transport | Self::RateLimited)
    }

    /// Maps a Slack Web API `error` code to a kind.
    pub fn from_api_code(code: &str) -> Self {
        match code {
            "ratelimited" | "rate_limited" => Self::RateLimited,
            "channel_not_found"
            | "users_not_found"
            | "user_not_found"
            | "no_such_subteam"
            | "subteam_not_found"
            | "bookmark_not_found"
            | "not_found" => Self::NotFound,
            "not_authed" | "invalid_auth" | "account_inactive" | "token_revoked"
            | "token_expired" | "missing_scope" | "not_allowed_token_type" | "no_permission"
            | "permission_denied" | "restricted_action" | "paid_teams_only"
            | "plan_upgrade_required" | "ekm_access_denied" => Self::Permission,
            "name_taken" | "handle_already_exists" | "name_already_exists"
            | "missing_argument" | "too_long" | "no_channel" | "is_archived"
            | "already_archived" | "cant_archive_general" => Self::Validation,
            c if c.starts_with("invalid_") || c.starts_with("bad_") => Self::Validation,
            "internal_error" | "fatal_error" | "service_unavailable" | "request_timeout" => {
                Self::Transport
            }
            _ => Self::Api,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Transport => "transport",
            Self::RateLimited => "rate limited",
            Self::NotFound => "not found",
            Self::Validation => "validation",
            Self::Permission => "permission",
            Self::Protocol => "protocol",
            Self::Api => "api",
        };
        f.write_str(label)
    }
}

/// A failed directory call.
#[derive(thiserror::Error, Debug)]
pub enum DirectoryError {
    #[error("{method}: request failed: {source}")]
    Transport {
        method: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method}: HTTP {status}")]
    Status { method: &'static str, status: u16 },
    #[error("{method}: rate limited{}", retry_hint(.retry_after))]
    RateLimited {
        method: &'static str,
        retry_after: Option<u64>,
    },
    #[error("{method}: {code}")]
    Api { method: &'static str, code: String },
    #[error("{method}: unexpected response: {detail}")]
    Protocol { method: &'static str, detail: String },
}

impl DirectoryError {
    /// Builds the error for an `ok: false` envelope.
    pub fn api(method: &'static str, code: impl Into<String>) -> Self {
        Self::Api {
            method,
            code: code.into(),
        }
    }

    pub fn protocol(method: &'static str, detail: impl Into<String>) -> Self {
        Self::Protocol {
            method,
            detail: detail.into(),
        }
    }

    /// Classification used for reporting and future retry decisions.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { .. } | Self::Status { .. } => ErrorKind::Transport,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::Api { code, .. } => ErrorKind::from_api_code(code),
            Self::Protocol { .. } => ErrorKind::Protocol,
        }
    }

    /// The API method that failed, e.g. `conversations.create`.
    pub fn method(&self) -> &'static str {
        match self {
            Self::Transport { method, .. }
            | Self::Status { method, .. }
            | Self::RateLimited { method, .. }
            | Self::Api { method, .. }
            | Self::Protocol { method, .. } => *method,
        }
    }
}

fn retry_hint(retry_after: &Option<u64>) -> String {
    retry_after
        .map(|secs| format!(" (retry after {secs}s)"))
        .unwrap_or_default()
}

pub type DirectoryResult<T> = std::result::Result<T, DirectoryError>;
