//! Policy limits and framing constants shared by the encode and decode paths.

/// Maximum number of witness stack items in a standard P2WSH spend.
pub const MAX_STANDARD_P2WSH_STACK_ITEMS: usize = 100;

/// Maximum size in bytes of each witness stack item in a standard P2WSH spend.
///
/// Payload chunks are cut at this size.
pub const MAX_STANDARD_P2WSH_STACK_ITEM_SIZE: usize = 80;

/// Maximum size in bytes of a standard witness script.
pub const MAX_STANDARD_P2WSH_SCRIPT_SIZE: usize = 3600;

/// Witness program size of a version 0 script hash output.
pub const WITNESS_V0_SCRIPTHASH_SIZE: usize = 32;

/// Size of a derived-chain identity.
pub const IDENTITY_SIZE: usize = 20;

/// Size of a payload tag.
pub const TAG_SIZE: usize = 4;

/// Tag prefixing a contract call payload.
pub const CALL_TAG: [u8; TAG_SIZE] = *b"evmc";

/// Tag prefixing a contract deployment payload.
pub const DEPLOY_TAG: [u8; TAG_SIZE] = *b"evmd";

/// Number of `OP_2DROP`s in a call locking script.
pub const CALL_SCRIPT_DROP_OPS: usize = 10;

/// Number of `OP_2DROP`s in a deploy locking script.
pub const DEPLOY_SCRIPT_DROP_OPS: usize = 49;

/// Suffix appended to a network's segwit prefix to form the address family prefix.
pub const EVM_HRP_MARKER: char = 'e';
