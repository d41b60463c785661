//! Message types carried between the emitter and the correlator
//!
//! Every value on the bus is wrapped in an [`Envelope`] holding a tagged
//! [`Payload`]. Typed code never touches payloads directly; it goes through
//! the [`Message`] trait, which checks the payload kind on the way out.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::MessageError;

/// Latest target value the two candidates must sum to.
///
/// Arithmetic on targets is 8-bit with wraparound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetValue(i8);

impl TargetValue {
    pub fn new(value: i8) -> Self {
        Self(value)
    }

    pub fn get(self) -> i8 {
        self.0
    }
}

impl From<i8> for TargetValue {
    fn from(value: i8) -> Self {
        Self(value)
    }
}

impl fmt::Display for TargetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered candidate values. Result indices refer to positions in this
/// exact sequence, so arrival order must never be changed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateArray(Vec<i8>);

impl CandidateArray {
    pub fn new(values: Vec<i8>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[i8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<i8>> for CandidateArray {
    fn from(values: Vec<i8>) -> Self {
        Self(values)
    }
}

/// Indices of a matching pair: either empty (no match) or exactly two
/// entries, current scan index first and the earlier index second.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultPair(Vec<usize>);

impl ResultPair {
    /// A result carrying no match.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// A matched pair, `current` being the index at which the scan stopped.
    pub fn matched(current: usize, previous: usize) -> Self {
        Self(vec![current, previous])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }
}

impl fmt::Display for ResultPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// Payload kind label, used to bind a topic to one message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PayloadKind {
    Target,
    Candidates,
    Result,
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PayloadKind::Target => "TARGET",
            PayloadKind::Candidates => "CANDIDATES",
            PayloadKind::Result => "RESULT",
        };
        f.write_str(label)
    }
}

/// Tagged union of everything that can travel on the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "UPPERCASE")]
pub enum Payload {
    Target(TargetValue),
    Candidates(CandidateArray),
    Result(ResultPair),
}

impl Payload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            Payload::Target(_) => PayloadKind::Target,
            Payload::Candidates(_) => PayloadKind::Candidates,
            Payload::Result(_) => PayloadKind::Result,
        }
    }
}

/// A typed message that can be published on a topic.
pub trait Message: Clone + Send + Sync + 'static {
    /// Kind every payload of this message type carries.
    const KIND: PayloadKind;

    fn into_payload(self) -> Payload;

    fn try_from_payload(payload: Payload) -> Result<Self, MessageError>;
}

impl Message for TargetValue {
    const KIND: PayloadKind = PayloadKind::Target;

    fn into_payload(self) -> Payload {
        Payload::Target(self)
    }

    fn try_from_payload(payload: Payload) -> Result<Self, MessageError> {
        match payload {
            Payload::Target(value) => Ok(value),
            other => Err(MessageError::KindMismatch {
                expected: Self::KIND,
                actual: other.kind(),
            }),
        }
    }
}

impl Message for CandidateArray {
    const KIND: PayloadKind = PayloadKind::Candidates;

    fn into_payload(self) -> Payload {
        Payload::Candidates(self)
    }

    fn try_from_payload(payload: Payload) -> Result<Self, MessageError> {
        match payload {
            Payload::Candidates(values) => Ok(values),
            other => Err(MessageError::KindMismatch {
                expected: Self::KIND,
                actual: other.kind(),
            }),
        }
    }
}

impl Message for ResultPair {
    const KIND: PayloadKind = PayloadKind::Result;

    fn into_payload(self) -> Payload {
        Payload::Result(self)
    }

    fn try_from_payload(payload: Payload) -> Result<Self, MessageError> {
        match payload {
            Payload::Result(pair) => Ok(pair),
            other => Err(MessageError::KindMismatch {
                expected: Self::KIND,
                actual: other.kind(),
            }),
        }
    }
}

/// A payload as it travels on the bus.
///
/// Sequence numbers are assigned per topic by the bus, start at 1 and
/// increase by one for every publish on that topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Per-topic monotonic sequence number
    pub sequence: u64,
    /// Unix nanoseconds at publish time
    pub published_at: i64,
    /// Name of the publishing node
    pub publisher: String,
    /// Topic the envelope was published on
    pub topic: String,
    /// Message payload
    pub payload: Payload,
}

impl Envelope {
    pub fn kind(&self) -> PayloadKind {
        self.payload.kind()
    }

    /// Decode the payload as `M`.
    pub fn message<M: Message>(&self) -> Result<M, MessageError> {
        M::try_from_payload(self.payload.clone())
    }
}

/// Current wall-clock time as Unix nanoseconds.
pub fn now_nanos() -> i64 {
    chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(payload: Payload) -> Envelope {
        Envelope {
            sequence: 1,
            published_at: 1708123456789000000,
            publisher: "minimal_publisher".to_string(),
            topic: "/target".to_string(),
            payload,
        }
    }

    #[test]
    fn test_result_pair_shapes() {
        let empty = ResultPair::empty();
        assert!(empty.is_empty());
        assert!(empty.indices().is_empty());

        let pair = ResultPair::matched(2, 0);
        assert_eq!(pair.indices(), &[2, 0]);
        assert_eq!(pair.to_string(), "[2, 0]");
    }

    #[test]
    fn test_candidate_array_preserves_order() {
        let arr = CandidateArray::from(vec![4, -1, 4, 0]);
        assert_eq!(arr.as_slice(), &[4, -1, 4, 0]);
        assert_eq!(arr.len(), 4);
        assert!(!arr.is_empty());
        assert!(CandidateArray::default().is_empty());
    }

    #[test]
    fn test_message_decodes_matching_kind() {
        let env = envelope(TargetValue::new(6).into_payload());
        assert_eq!(env.kind(), PayloadKind::Target);
        assert_eq!(env.message::<TargetValue>().unwrap(), TargetValue::new(6));
    }

    #[test]
    fn test_message_rejects_other_kind() {
        let env = envelope(CandidateArray::new(vec![2, 3, 4]).into_payload());
        let err = env.message::<TargetValue>().unwrap_err();
        assert_eq!(
            err,
            MessageError::KindMismatch {
                expected: PayloadKind::Target,
                actual: PayloadKind::Candidates,
            }
        );
    }

    #[test]
    fn test_envelope_json_layout() {
        let env = envelope(ResultPair::matched(2, 0).into_payload());
        let json = serde_json::to_string(&env).unwrap();
        assert!(json.contains("\"kind\":\"RESULT\""));
        assert!(json.contains("\"data\":[2,0]"));

        let decoded: Envelope = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, env);
    }

    #[test]
    fn test_now_nanos_is_positive() {
        assert!(now_nanos() > 0);
    }
}
