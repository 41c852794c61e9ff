//! Source-chain side of the bridge: address family, witness payloads, signing and extraction.

pub mod address;
pub mod constants;
pub mod errors;
pub mod extract;
pub mod network;
pub mod payload;
pub mod policy;
pub mod script;
pub mod sign;
pub mod witness;

pub use address::{identity_of, DecodedAddress, EvmScriptAddress};
pub use errors::{AddressError, PayloadError, PolicyError, SignError};
pub use extract::{collect_referenced_outpoints, extract_invocations, PrevOutputLookup};
pub use network::{NetworkParams, NetworkTable};
pub use payload::{Invocation, Payload, PayloadTag};
pub use policy::check_witness_standard;
pub use script::{evm_locking_script, num_drops, witness_program, ScriptKind};
pub use sign::{build_spend_witness, parse_secret_key, sign_evm_input};
pub use witness::{encode_chunks, lay_out_witness, reassemble_payload, WitnessPayload};
