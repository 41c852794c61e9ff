use bitcoin::Network;
use thiserror::Error;

/// Errors raised while encoding or decoding family addresses.
#[derive(Debug, Error)]
pub enum AddressError {
    /// Bech32 level failure: checksum, checksum variant, witness version or program length.
    #[error("bech32 decode: {0}")]
    Decode(#[from] bitcoin::bech32::segwit::DecodeError),

    #[error("bech32 encode: {0}")]
    Encode(#[from] bitcoin::bech32::segwit::EncodeError),

    #[error("invalid human-readable prefix: {0}")]
    InvalidHrp(#[from] bitcoin::bech32::primitives::hrp::Error),

    #[error("witness program must be {expected} bytes, got {actual}")]
    InvalidProgramLength { expected: usize, actual: usize },

    #[error("unknown address prefix {0}")]
    UnknownHrp(String),

    #[error("network {0} has no address parameters")]
    UnsupportedNetwork(Network),
}

/// Errors raised while decoding a reassembled payload.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("wrong evm prefix")]
    UnknownTag,

    #[error("truncated payload (expected at least {expected} bytes, got {actual})")]
    Truncated { expected: usize, actual: usize },
}

/// Errors raised while building a spending witness.
#[derive(Debug, Error)]
pub enum SignError {
    #[error("evm witness data too large (drops: {drops}, chunks: {chunks})")]
    Capacity { drops: usize, chunks: usize },

    #[error("input index {index} out of range for {inputs} inputs")]
    InputIndex { index: usize, inputs: usize },

    #[error("sighash: {0}")]
    Sighash(String),

    #[error("invalid secret key: {0}")]
    InvalidKey(#[from] secp256k1::Error),
}

/// Witness standardness violations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("input {input}: missing previous output")]
    MissingPrevOutput { input: usize },

    #[error("input {input}: spent output is not a witness program")]
    NotWitnessProgram { input: usize },

    #[error("input {input}: unsupported spend type ({kind})")]
    Unsupported { input: usize, kind: &'static str },

    #[error("input {input}: witness script too large ({size} bytes)")]
    ScriptTooLarge { input: usize, size: usize },

    #[error("input {input}: too many witness stack items ({count})")]
    TooManyItems { input: usize, count: usize },

    #[error("input {input}: witness stack item {item} too large ({size} bytes)")]
    ItemTooLarge {
        input: usize,
        item: usize,
        size: usize,
    },
}
