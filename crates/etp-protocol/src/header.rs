//! Message header and the correlation/multi-part contract.
//!
//! Every inbound message carries enough header information to decide:
//!
//! - whether it answers an outstanding request (`correlation_id != 0`), and
//! - whether it closes the logical response group for that request.
//!
//! A group is complete when the message carries [`MessageFlags::FINAL_PART`],
//! or when it is not part of a multi-part response at all.

use serde::{Deserialize, Serialize};

use crate::protocol::ProtocolId;

/// Header flag bit set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageFlags(u32);

impl MessageFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);
    /// Message is one part of a multi-message response.
    pub const MULTI_PART: Self = Self(0x01);
    /// Message is the last part of its response group.
    pub const FINAL_PART: Self = Self(0x02);
    /// Response intentionally carries no data.
    pub const NO_DATA: Self = Self(0x04);
    /// Body is compressed.
    pub const COMPRESSED: Self = Self(0x08);
    /// Sender requests an acknowledge (ETP 1.2).
    pub const ACKNOWLEDGE: Self = Self(0x10);
    /// Header extension follows (ETP 1.2).
    pub const HAS_HEADER_EXTENSION: Self = Self(0x20);

    /// Create flags from a raw header value.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw header value.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether every bit of `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Check if MULTI_PART is set.
    #[must_use]
    pub const fn is_multi_part(self) -> bool {
        self.contains(Self::MULTI_PART)
    }

    /// Check if FINAL_PART is set.
    #[must_use]
    pub const fn is_final_part(self) -> bool {
        self.contains(Self::FINAL_PART)
    }

    /// Check if NO_DATA is set.
    #[must_use]
    pub const fn is_no_data(self) -> bool {
        self.contains(Self::NO_DATA)
    }

    /// Set MULTI_PART.
    #[must_use]
    pub const fn with_multi_part(self) -> Self {
        Self(self.0 | Self::MULTI_PART.0)
    }

    /// Set FINAL_PART.
    #[must_use]
    pub const fn with_final_part(self) -> Self {
        Self(self.0 | Self::FINAL_PART.0)
    }

    /// Set NO_DATA.
    #[must_use]
    pub const fn with_no_data(self) -> Self {
        Self(self.0 | Self::NO_DATA.0)
    }

    /// Whether a message with these flags completes its response group.
    #[must_use]
    pub const fn completes_group(self) -> bool {
        self.is_final_part() || !self.is_multi_part()
    }
}

impl std::ops::BitOr for MessageFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Header fields needed for dispatch and correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageHeader {
    /// Raw protocol number
    pub protocol: i32,
    /// Message type within the protocol
    pub message_type: i32,
    /// Sender-assigned message id
    pub message_id: i64,
    /// Id of the request this message answers, 0 if unsolicited
    pub correlation_id: i64,
    /// Flag bits
    pub message_flags: MessageFlags,
}

impl MessageHeader {
    /// Header for a new request. The session assigns `message_id` on send.
    #[must_use]
    pub const fn request(protocol: ProtocolId, message_type: i32) -> Self {
        Self {
            protocol: protocol.id(),
            message_type,
            message_id: 0,
            correlation_id: 0,
            message_flags: MessageFlags::NONE,
        }
    }

    /// Header for a response to `correlation_id`.
    #[must_use]
    pub const fn response(
        protocol: i32,
        message_type: i32,
        correlation_id: i64,
        message_flags: MessageFlags,
    ) -> Self {
        Self {
            protocol,
            message_type,
            message_id: 0,
            correlation_id,
            message_flags,
        }
    }

    /// Originating request id, or `None` for push messages.
    #[must_use]
    pub const fn correlation(&self) -> Option<i64> {
        if self.correlation_id == 0 {
            None
        } else {
            Some(self.correlation_id)
        }
    }

    /// Whether the message was not solicited by a request.
    #[must_use]
    pub const fn is_unsolicited(&self) -> bool {
        self.correlation_id == 0
    }

    /// Whether this is one part of a multi-message response.
    #[must_use]
    pub const fn is_multi_part(&self) -> bool {
        self.message_flags.is_multi_part()
    }

    /// Whether this message completes its response group.
    #[must_use]
    pub const fn completes_group(&self) -> bool {
        self.message_flags.completes_group()
    }
}
