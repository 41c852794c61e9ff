//! Execution payloads carried in spending witnesses.
//!
//! A payload decoded from a witness has no sender yet. The sender is recovered from the
//! output being spent, which turns a [`Payload`] into an [`Invocation`].

use alloy_primitives::{Address, Bytes};
use serde::{Deserialize, Serialize};

use crate::{
    constants::{CALL_TAG, DEPLOY_TAG, IDENTITY_SIZE, TAG_SIZE},
    errors::PayloadError,
    script::ScriptKind,
};

/// Payload framing tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadTag {
    Call,
    Deploy,
}

impl PayloadTag {
    pub fn as_bytes(&self) -> &'static [u8; TAG_SIZE] {
        match self {
            PayloadTag::Call => &CALL_TAG,
            PayloadTag::Deploy => &DEPLOY_TAG,
        }
    }

    /// Locking script kind with enough capacity for this tag's usual payloads.
    pub fn script_kind(&self) -> ScriptKind {
        match self {
            PayloadTag::Call => ScriptKind::Call,
            PayloadTag::Deploy => ScriptKind::Deploy,
        }
    }
}

/// Execution intent without a resolved sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    Call { to: Address, data: Bytes },
    Deploy { data: Bytes },
}

impl Payload {
    pub fn call(to: Address, data: Vec<u8>) -> Self {
        Payload::Call {
            to,
            data: Bytes::from(data),
        }
    }

    pub fn deploy(data: Vec<u8>) -> Self {
        Payload::Deploy {
            data: Bytes::from(data),
        }
    }

    pub fn tag(&self) -> PayloadTag {
        match self {
            Payload::Call { .. } => PayloadTag::Call,
            Payload::Deploy { .. } => PayloadTag::Deploy,
        }
    }

    pub fn data(&self) -> &Bytes {
        match self {
            Payload::Call { data, .. } | Payload::Deploy { data } => data,
        }
    }

    /// Destination of a call, `None` for a deployment.
    pub fn to(&self) -> Option<Address> {
        match self {
            Payload::Call { to, .. } => Some(*to),
            Payload::Deploy { .. } => None,
        }
    }

    /// Tag-specific body, the bytes that follow the tag in the framed payload.
    pub fn body(&self) -> Vec<u8> {
        match self {
            Payload::Call { to, data } => {
                let mut body = Vec::with_capacity(IDENTITY_SIZE + data.len());
                body.extend_from_slice(to.as_slice());
                body.extend_from_slice(data);
                body
            }
            Payload::Deploy { data } => data.to_vec(),
        }
    }

    /// Parses a framed payload.
    ///
    /// A deployment's data runs to the end of the buffer, so trailing bytes are never
    /// treated as padding.
    pub fn decode(buf: &[u8]) -> Result<Self, PayloadError> {
        if let Some(rest) = buf.strip_prefix(&CALL_TAG) {
            if rest.len() < IDENTITY_SIZE {
                return Err(PayloadError::Truncated {
                    expected: TAG_SIZE + IDENTITY_SIZE,
                    actual: buf.len(),
                });
            }
            let (to, data) = rest.split_at(IDENTITY_SIZE);
            Ok(Payload::call(Address::from_slice(to), data.to_vec()))
        } else if let Some(rest) = buf.strip_prefix(&DEPLOY_TAG) {
            Ok(Payload::deploy(rest.to_vec()))
        } else {
            Err(PayloadError::UnknownTag)
        }
    }

    /// Attaches the sender recovered from the spent output.
    pub fn resolve(self, from: Address) -> Invocation {
        Invocation {
            from,
            payload: self,
        }
    }
}

/// Execution intent with its sender resolved from chain data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    from: Address,
    #[serde(flatten)]
    payload: Payload,
}

impl Invocation {
    pub fn from(&self) -> Address {
        self.from
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn into_parts(self) -> (Address, Payload) {
        (self.from, self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_call() {
        let to = Address::repeat_byte(0x42);
        let mut buf = b"evmc".to_vec();
        buf.extend_from_slice(to.as_slice());
        buf.extend_from_slice(&[1, 2, 3]);

        let payload = Payload::decode(&buf).unwrap();
        assert_eq!(payload, Payload::call(to, vec![1, 2, 3]));
    }

    #[test]
    fn test_decode_call_without_data() {
        let mut buf = b"evmc".to_vec();
        buf.extend_from_slice(&[0u8; 20]);

        let payload = Payload::decode(&buf).unwrap();
        assert_eq!(payload.to(), Some(Address::ZERO));
        assert!(payload.data().is_empty());
    }

    #[test]
    fn test_decode_truncated_call() {
        let mut buf = b"evmc".to_vec();
        buf.extend_from_slice(&[0u8; 19]);

        assert_eq!(
            Payload::decode(&buf),
            Err(PayloadError::Truncated {
                expected: 24,
                actual: 23
            })
        );
    }

    #[test]
    fn test_decode_deploy() {
        assert_eq!(Payload::decode(b"evmd"), Ok(Payload::deploy(Vec::<u8>::new())));
        assert_eq!(
            Payload::decode(b"evmd\x60\x80"),
            Ok(Payload::deploy(vec![0x60, 0x80]))
        );
    }

    #[test]
    fn test_decode_bad_tag() {
        assert_eq!(Payload::decode(b"evmx1234"), Err(PayloadError::UnknownTag));
        assert_eq!(Payload::decode(b"evm"), Err(PayloadError::UnknownTag));
        assert_eq!(Payload::decode(&[]), Err(PayloadError::UnknownTag));
    }

    #[test]
    fn test_resolve_keeps_payload() {
        let payload = Payload::deploy(vec![0xfe]);
        let from = Address::repeat_byte(7);
        let inv = payload.clone().resolve(from);
        assert_eq!(inv.from(), from);
        assert_eq!(inv.payload(), &payload);
    }
}
