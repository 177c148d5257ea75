//! Classification of driver queue messages.
//!
//! The driver delivers (type, id, data) tuples; only two shapes end a wait:
//! homed = (2, 0) and move-complete = (2, 1). Anything else is discarded by
//! the wait loop.

use rack_traits::RawMessage;

/// A completion the workflow blocks on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Homed,
    MoveComplete,
}

impl Completion {
    /// The (type, id) pair that signals this completion.
    pub fn tags(self) -> (u16, u16) {
        match self {
            Completion::Homed => (RawMessage::TYPE_MOTOR, RawMessage::ID_HOMED),
            Completion::MoveComplete => (RawMessage::TYPE_MOTOR, RawMessage::ID_MOVE_COMPLETE),
        }
    }
}

/// Classify a raw message; `None` means "unrelated, keep waiting".
pub fn classify(msg: &RawMessage) -> Option<Completion> {
    match (msg.msg_type, msg.msg_id) {
        (RawMessage::TYPE_MOTOR, RawMessage::ID_HOMED) => Some(Completion::Homed),
        (RawMessage::TYPE_MOTOR, RawMessage::ID_MOVE_COMPLETE) => Some(Completion::MoveComplete),
        _ => None,
    }
}
