//! The error taxonomy every verb's failure envelope is built from
//! (spec §7). Lower layers (`lattice-storage`, `lattice-engine`) define
//! their own `thiserror` enums and convert into this one at the
//! `TaskService` boundary, the way the teacher's daemon converts
//! `WalError`/`SnapshotError` into its own top-level error.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotInitialized,
    NotFound,
    InvalidInput,
    InvalidTransition,
    CompletionBlocked,
    ReviewCycleExceeded,
    ForceRequiresReason,
    Conflict,
    SelfLink,
    DuplicateLink,
    LinkNotFound,
    ProtectedField,
    ReservedType,
    LockTimeout,
    PayloadTooLarge,
    AlreadyArchived,
    NotArchived,
    NothingToClaim,
    IntegrityError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotInitialized => "NOT_INITIALIZED",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::InvalidTransition => "INVALID_TRANSITION",
            ErrorCode::CompletionBlocked => "COMPLETION_BLOCKED",
            ErrorCode::ReviewCycleExceeded => "REVIEW_CYCLE_EXCEEDED",
            ErrorCode::ForceRequiresReason => "FORCE_REQUIRES_REASON",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::SelfLink => "SELF_LINK",
            ErrorCode::DuplicateLink => "DUPLICATE_LINK",
            ErrorCode::LinkNotFound => "LINK_NOT_FOUND",
            ErrorCode::ProtectedField => "PROTECTED_FIELD",
            ErrorCode::ReservedType => "RESERVED_TYPE",
            ErrorCode::LockTimeout => "LOCK_TIMEOUT",
            ErrorCode::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ErrorCode::AlreadyArchived => "ALREADY_ARCHIVED",
            ErrorCode::NotArchived => "NOT_ARCHIVED",
            ErrorCode::NothingToClaim => "NOTHING_TO_CLAIM",
            ErrorCode::IntegrityError => "INTEGRITY_ERROR",
        }
    }
}

#[derive(Debug, Error, Clone, Serialize)]
#[error("{code:?}: {message}")]
pub struct LatticeError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl LatticeError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

macro_rules! ctor {
    ($fn_name:ident, $code:ident) => {
        impl LatticeError {
            pub fn $fn_name(message: impl Into<String>) -> Self {
                Self::new(ErrorCode::$code, message)
            }
        }
    };
}

ctor!(not_initialized, NotInitialized);
ctor!(not_found, NotFound);
ctor!(invalid_input, InvalidInput);
ctor!(invalid_transition, InvalidTransition);
ctor!(completion_blocked, CompletionBlocked);
ctor!(review_cycle_exceeded, ReviewCycleExceeded);
ctor!(force_requires_reason, ForceRequiresReason);
ctor!(conflict, Conflict);
ctor!(self_link, SelfLink);
ctor!(duplicate_link, DuplicateLink);
ctor!(link_not_found, LinkNotFound);
ctor!(protected_field, ProtectedField);
ctor!(reserved_type, ReservedType);
ctor!(lock_timeout, LockTimeout);
ctor!(payload_too_large, PayloadTooLarge);
ctor!(already_archived, AlreadyArchived);
ctor!(not_archived, NotArchived);
ctor!(nothing_to_claim, NothingToClaim);
ctor!(integrity_error, IntegrityError);

pub type LatticeResult<T> = Result<T, LatticeError>;
