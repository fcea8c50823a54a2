//! Protocol messages exchanged between neighbouring nodes.
//!
//! Every protocol step has its own [`Message`] variant carrying exactly the
//! fields that step needs. An [`Envelope`] adds routing metadata: the edge it
//! travelled on, the sender, and a per-link sequence number used to discard
//! re-delivered copies.

use std::fmt;

use crate::{
    edge::{EdgeId, Weight, WeightBound},
    graph::NodeId,
};

/// Merge generation of a fragment.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Level(u32);

impl Level {
    /// Level of every freshly woken singleton fragment.
    pub const ZERO: Self = Self(0);

    /// Wraps a raw level.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw level.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns the level produced by an equal-level merge.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fragment identity: the weight of the edge the fragment was founded or last
/// merged across.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct FragmentName(Weight);

impl FragmentName {
    /// Wraps an edge weight as a fragment name.
    #[must_use]
    pub const fn new(weight: Weight) -> Self {
        Self(weight)
    }

    /// Returns the founding edge weight.
    #[must_use]
    pub const fn weight(self) -> Weight {
        self.0
    }
}

impl fmt::Display for FragmentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{}", self.0)
    }
}

/// Protocol state of a node.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum NodeState {
    /// Not yet woken.
    #[default]
    Sleeping,
    /// Searching for the fragment's minimum outgoing edge.
    Find,
    /// The node's part of the search has finished at the current level.
    Found,
}

impl NodeState {
    /// Returns the symbolic name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sleeping => "SLEEPING",
            Self::Find => "FIND",
            Self::Found => "FOUND",
        }
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A protocol message.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Message {
    /// Synthetic start signal injected by the runtime.
    Wakeup,
    /// Request to join fragments across the carrying edge.
    Connect {
        /// Level of the sender's fragment.
        level: Level,
    },
    /// Broadcast of a fragment's new identity down the tree.
    Initiate {
        /// Fragment level to adopt.
        level: Level,
        /// Fragment name to adopt.
        fragment: FragmentName,
        /// State to adopt; `Find` starts a new search.
        state: NodeState,
    },
    /// Probe asking whether the carrying edge leaves the sender's fragment.
    Test {
        /// Level of the sender's fragment.
        level: Level,
        /// Name of the sender's fragment.
        fragment: FragmentName,
    },
    /// The tested edge leads to another fragment.
    Accept,
    /// The tested edge is internal to the fragment.
    Reject,
    /// Minimum outgoing weight found by the sender's subtree.
    Report {
        /// Best candidate weight, or `+∞` when none exists.
        weight: WeightBound,
    },
    /// Instruction to route the fragment's connect toward the chosen edge.
    ChangeRoot,
}

impl Message {
    /// Returns the variant tag.
    #[must_use]
    pub const fn kind(&self) -> MessageKind {
        match self {
            Self::Wakeup => MessageKind::Wakeup,
            Self::Connect { .. } => MessageKind::Connect,
            Self::Initiate { .. } => MessageKind::Initiate,
            Self::Test { .. } => MessageKind::Test,
            Self::Accept => MessageKind::Accept,
            Self::Reject => MessageKind::Reject,
            Self::Report { .. } => MessageKind::Report,
            Self::ChangeRoot => MessageKind::ChangeRoot,
        }
    }
}

/// Field-less tag for each [`Message`] variant.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum MessageKind {
    /// [`Message::Wakeup`].
    Wakeup,
    /// [`Message::Connect`].
    Connect,
    /// [`Message::Initiate`].
    Initiate,
    /// [`Message::Test`].
    Test,
    /// [`Message::Accept`].
    Accept,
    /// [`Message::Reject`].
    Reject,
    /// [`Message::Report`].
    Report,
    /// [`Message::ChangeRoot`].
    ChangeRoot,
}

impl MessageKind {
    /// Returns the symbolic name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wakeup => "WAKEUP",
            Self::Connect => "CONNECT",
            Self::Initiate => "INITIATE",
            Self::Test => "TEST",
            Self::Accept => "ACCEPT",
            Self::Reject => "REJECT",
            Self::Report => "REPORT",
            Self::ChangeRoot => "CHANGE_ROOT",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an enveloped message came from.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Origin {
    /// Edge the message travelled on.
    pub edge: EdgeId,
    /// Sending node.
    pub sender: NodeId,
    /// Position of the message in the sender's stream on this edge.
    pub sequence: u64,
}

/// A message in flight together with its routing metadata.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Envelope {
    origin: Option<Origin>,
    message: Message,
    deferred_at: Option<u64>,
}

impl Envelope {
    /// Builds the synthetic wake-up envelope.
    #[must_use]
    pub const fn wakeup() -> Self {
        Self {
            origin: None,
            message: Message::Wakeup,
            deferred_at: None,
        }
    }

    /// Builds an envelope for a message sent over `origin.edge`.
    #[must_use]
    pub const fn sent(origin: Origin, message: Message) -> Self {
        Self {
            origin: Some(origin),
            message,
            deferred_at: None,
        }
    }

    /// Returns the origin, or `None` for the synthetic wake-up.
    #[must_use]
    pub const fn origin(&self) -> Option<Origin> {
        self.origin
    }

    /// Returns the carried message.
    #[must_use]
    pub const fn message(&self) -> Message {
        self.message
    }

    /// Returns the progress epoch at which the message was last deferred.
    #[must_use]
    pub const fn deferred_at(&self) -> Option<u64> {
        self.deferred_at
    }

    pub(crate) const fn defer(mut self, epoch: u64) -> Self {
        self.deferred_at = Some(epoch);
        self
    }
}
