//! Payload framing inside witness stacks.
//!
//! A framed payload is `tag || body`, cut into chunks of at most
//! [`MAX_STANDARD_P2WSH_STACK_ITEM_SIZE`] bytes. The chunk list is the canonical representation;
//! [`lay_out_witness`] and [`reassemble_payload`] handle the stack layout, which stores the
//! chunks reversed so that a script interpreter popping items would see them in order.

use bitcoin::Witness;

use crate::{
    constants::MAX_STANDARD_P2WSH_STACK_ITEM_SIZE,
    errors::SignError,
    payload::{Payload, PayloadTag},
    script::num_drops,
};

/// Frames `body` under `tag` and splits it into chunks, first chunk first.
pub fn encode_chunks(tag: PayloadTag, body: &[u8]) -> Vec<Vec<u8>> {
    let mut framed = Vec::with_capacity(tag.as_bytes().len() + body.len());
    framed.extend_from_slice(tag.as_bytes());
    framed.extend_from_slice(body);
    framed
        .chunks(MAX_STANDARD_P2WSH_STACK_ITEM_SIZE)
        .map(<[u8]>::to_vec)
        .collect()
}

impl Payload {
    /// Framed payload chunks, first chunk first.
    pub fn to_chunks(&self) -> Vec<Vec<u8>> {
        encode_chunks(self.tag(), &self.body())
    }
}

/// Builds a witness stack: `signature`, empty padding, chunks in reverse, then `script`.
///
/// Fails if the script's drop run cannot absorb every chunk.
pub fn lay_out_witness(
    signature: Vec<u8>,
    chunks: &[Vec<u8>],
    script: &[u8],
) -> Result<Witness, SignError> {
    let drops = num_drops(script);
    if chunks.len() > drops {
        return Err(SignError::Capacity {
            drops,
            chunks: chunks.len(),
        });
    }

    let mut witness = Witness::new();
    witness.push(signature);
    for _ in chunks.len()..drops {
        witness.push(Vec::<u8>::new());
    }
    for chunk in chunks.iter().rev() {
        witness.push(chunk);
    }
    witness.push(script);
    Ok(witness)
}

/// Outcome of reading the payload area of a witness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WitnessPayload {
    /// Last item has no leading drop opcodes, or fewer than two items.
    NotOurs,
    /// Drop run claims more items than the witness holds before the script.
    DropsTooLarge { drops: usize, items: usize },
    /// Drop slots hold only empty items.
    Empty,
    /// Reassembled framed payload.
    Framed(Vec<u8>),
}

/// Reads the framed payload out of a witness stack.
///
/// The last item is taken as the script; the `drops` items right before it are concatenated
/// nearest-to-script first, undoing the reversal done by [`lay_out_witness`].
pub fn reassemble_payload(witness: &Witness) -> WitnessPayload {
    if witness.len() < 2 {
        return WitnessPayload::NotOurs;
    }
    let items: Vec<&[u8]> = witness.iter().collect();
    let (script, rest) = match items.split_last() {
        Some(split) => split,
        None => return WitnessPayload::NotOurs,
    };

    let drops = num_drops(script);
    if drops == 0 {
        return WitnessPayload::NotOurs;
    }
    if drops > rest.len() {
        return WitnessPayload::DropsTooLarge {
            drops,
            items: rest.len(),
        };
    }

    let framed: Vec<u8> = rest
        .iter()
        .rev()
        .take(drops)
        .flat_map(|item| item.iter().copied())
        .collect();
    if framed.is_empty() {
        WitnessPayload::Empty
    } else {
        WitnessPayload::Framed(framed)
    }
}
