//! Address family encoding a derived-chain identity into a segwit address.
//!
//! A family address is a version 0 bech32 segwit address over a 32-byte script hash, under the
//! network's segwit prefix with a marker character appended (`bce1q...`, `tbe1q...`). The
//! derived-chain identity behind it is `RIPEMD-160(program)`.

use std::fmt;

use alloy_primitives::Address;
use bitcoin::{
    bech32::{segwit, Hrp},
    hashes::{ripemd160, Hash},
    Network, ScriptBuf, WScriptHash,
};

use crate::{
    constants::WITNESS_V0_SCRIPTHASH_SIZE,
    errors::AddressError,
    network::{NetworkParams, NetworkTable},
    script::{evm_locking_script, witness_program, ScriptKind},
};

/// Derived-chain identity committed to by a witness program.
pub fn identity_of(program: &[u8]) -> Address {
    Address::from(ripemd160::Hash::hash(program).to_byte_array())
}

/// Encodes a 32-byte program as a family address.
pub fn encode(program: &[u8], params: &NetworkParams) -> Result<String, AddressError> {
    encode_v0(program, params.evm_hrp())
}

fn encode_v0(program: &[u8], hrp: &str) -> Result<String, AddressError> {
    if program.len() != WITNESS_V0_SCRIPTHASH_SIZE {
        return Err(AddressError::InvalidProgramLength {
            expected: WITNESS_V0_SCRIPTHASH_SIZE,
            actual: program.len(),
        });
    }
    let hrp = Hrp::parse(hrp)?;
    Ok(segwit::encode(hrp, segwit::VERSION_0, program)?)
}

/// Fields of a decoded family address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAddress {
    pub witness_version: u8,
    pub program: Vec<u8>,
    pub network: Network,
}

/// Decodes a family address.
///
/// The checksum variant must match the witness version (bech32 for v0, bech32m for v1 and
/// up), the version must be at most 16, and the program must be 2 to 40 bytes, or exactly 20
/// or 32 bytes for v0.
pub fn decode(
    addr: &str,
    table: &NetworkTable,
    default_network: Network,
) -> Result<DecodedAddress, AddressError> {
    let (hrp, version, program) = segwit::decode(addr)?;
    let params = table.resolve_evm_hrp(&hrp.to_lowercase(), default_network)?;
    Ok(DecodedAddress {
        witness_version: version.to_u8(),
        program,
        network: params.network(),
    })
}

/// A version 0 family address over a script hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvmScriptAddress {
    params: NetworkParams,
    program: [u8; 32],
}

impl EvmScriptAddress {
    pub fn new(program: [u8; 32], params: NetworkParams) -> Self {
        Self { params, program }
    }

    /// Predicts the address of the locking script for `pubkey`.
    pub fn from_pubkey(
        pubkey: &secp256k1::PublicKey,
        kind: ScriptKind,
        params: NetworkParams,
    ) -> Self {
        let script = evm_locking_script(pubkey, kind);
        Self::new(witness_program(script.as_bytes()), params)
    }

    /// Parses a family address, requiring a 32-byte version 0 program.
    pub fn parse(
        addr: &str,
        table: &NetworkTable,
        default_network: Network,
    ) -> Result<Self, AddressError> {
        let decoded = decode(addr, table, default_network)?;
        let invalid_len = AddressError::InvalidProgramLength {
            expected: WITNESS_V0_SCRIPTHASH_SIZE,
            actual: decoded.program.len(),
        };
        if decoded.witness_version != 0 {
            return Err(invalid_len);
        }
        let program: [u8; 32] = decoded
            .program
            .as_slice()
            .try_into()
            .map_err(|_| invalid_len)?;
        Ok(Self::new(program, table.get(decoded.network)?.clone()))
    }

    pub fn network(&self) -> Network {
        self.params.network()
    }

    pub fn program(&self) -> &[u8; 32] {
        &self.program
    }

    pub fn identity(&self) -> Address {
        identity_of(&self.program)
    }

    /// Output script paying to this address, `OP_0 <program>`.
    pub fn script_pubkey(&self) -> ScriptBuf {
        ScriptBuf::new_p2wsh(&WScriptHash::from_byte_array(self.program))
    }

    /// The same program under the network's plain segwit prefix.
    pub fn to_compat_string(&self) -> Result<String, AddressError> {
        encode_v0(&self.program, self.params.segwit_hrp())
    }
}

impl fmt::Display for EvmScriptAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = encode(&self.program, &self.params).map_err(|_| fmt::Error)?;
        f.write_str(&s)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    const TESTNET_KEY: &str = "2129ba4799e5d010cf8ae6c79168f1e3746bbd578fb8d2e4725ec2ba969d47a1";
    const TESTNET_EVM_ADDR: &str =
        "tbe1q5qj0gqyhnmkg5uwp0uq6l8lnj8u2ne6cdwv7cfrfasrzz7yp3mhs5fuq67";
    const TESTNET_WSH_ADDR: &str =
        "tb1q5qj0gqyhnmkg5uwp0uq6l8lnj8u2ne6cdwv7cfrfasrzz7yp3mhsyzwvjd";

    fn testnet_key() -> secp256k1::PublicKey {
        let bytes = hex::decode(TESTNET_KEY).unwrap();
        let sk = secp256k1::SecretKey::from_slice(&bytes).unwrap();
        secp256k1::PublicKey::from_secret_key_global(&sk)
    }

    #[test]
    fn test_known_key_vector() {
        let table = NetworkTable::standard();
        let params = table.get(Network::Testnet).unwrap().clone();
        let addr = EvmScriptAddress::from_pubkey(&testnet_key(), ScriptKind::Call, params);

        assert_eq!(addr.to_string(), TESTNET_EVM_ADDR);
        assert_eq!(addr.to_compat_string().unwrap(), TESTNET_WSH_ADDR);
    }

    #[test]
    fn test_parse_known_address() {
        let table = NetworkTable::standard();
        let addr = EvmScriptAddress::parse(TESTNET_EVM_ADDR, &table, Network::Bitcoin).unwrap();
        assert_eq!(addr.network(), Network::Testnet);
        assert_eq!(addr.to_string(), TESTNET_EVM_ADDR);
        assert_eq!(addr.identity(), identity_of(addr.program()));
    }

    #[test]
    fn test_uppercase_address_decodes() {
        let table = NetworkTable::standard();
        let decoded = decode(&TESTNET_EVM_ADDR.to_uppercase(), &table, Network::Testnet).unwrap();
        assert_eq!(decoded.witness_version, 0);
        assert_eq!(decoded.program.len(), 32);
    }

    #[test]
    fn test_encode_rejects_short_program() {
        let table = NetworkTable::standard();
        let params = table.get(Network::Bitcoin).unwrap();
        assert!(matches!(
            encode(&[0u8; 20], params),
            Err(AddressError::InvalidProgramLength {
                expected: 32,
                actual: 20
            })
        ));
    }

    #[test]
    fn test_encode_rejects_bad_prefix() {
        assert!(matches!(
            encode_v0(&[0u8; 32], "not valid"),
            Err(AddressError::InvalidHrp(_))
        ));
    }

    #[test]
    fn test_decode_bad_checksum() {
        let table = NetworkTable::standard();
        let mut tampered = TESTNET_EVM_ADDR.to_owned();
        tampered.pop();
        tampered.push('5');
        assert!(matches!(
            decode(&tampered, &table, Network::Testnet),
            Err(AddressError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_v0_with_bech32m_checksum() {
        let table = NetworkTable::standard();
        // same program as the testnet vector, checksummed as bech32m
        let s = "tbe1q5qj0gqyhnmkg5uwp0uq6l8lnj8u2ne6cdwv7cfrfasrzz7yp3mhsp4vvlu";
        assert!(matches!(
            decode(s, &table, Network::Testnet),
            Err(AddressError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_v0_20_byte_program() {
        let table = NetworkTable::standard();
        let decoded = decode(
            "tbe1qqurswpc8qurswpc8qurswpc8qurswpc8j593st",
            &table,
            Network::Testnet,
        )
        .unwrap();
        assert_eq!(decoded.witness_version, 0);
        assert_eq!(decoded.program, vec![7u8; 20]);

        // not a script hash
        assert!(matches!(
            EvmScriptAddress::parse(
                "tbe1qqurswpc8qurswpc8qurswpc8qurswpc8j593st",
                &table,
                Network::Testnet
            ),
            Err(AddressError::InvalidProgramLength {
                expected: 32,
                actual: 20
            })
        ));
    }

    #[test]
    fn test_decode_version_above_16() {
        let table = NetworkTable::standard();
        let s = "tbe13qurswpc8qurswpc8qurswpc8qurswpc8qurswpc8qurswpc8qurswpc8qurstmsxsv";
        assert!(matches!(
            decode(s, &table, Network::Testnet),
            Err(AddressError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_program_length_bounds() {
        let table = NetworkTable::standard();
        let one_byte = "tbe1pqu27ysg0";
        let forty_one =
            "tbe1pqurswpc8qurswpc8qurswpc8qurswpc8qurswpc8qurswpc8qurswpc8qurswpc8quala4sk";
        let forty =
            "tbe1pqurswpc8qurswpc8qurswpc8qurswpc8qurswpc8qurswpc8qurswpc8qurswpc8t6wgtj";

        for bad in [one_byte, forty_one] {
            assert!(matches!(
                decode(bad, &table, Network::Testnet),
                Err(AddressError::Decode(_))
            ));
        }
        let decoded = decode(forty, &table, Network::Testnet).unwrap();
        assert_eq!(decoded.witness_version, 1);
        assert_eq!(decoded.program.len(), 40);
    }

    #[test]
    fn test_decode_v1_address() {
        let table = NetworkTable::standard();
        let hrp = Hrp::parse("bcrte").unwrap();
        let s = segwit::encode(hrp, segwit::VERSION_1, &[9u8; 32]).unwrap();

        let decoded = decode(&s, &table, Network::Regtest).unwrap();
        assert_eq!(decoded.witness_version, 1);
        assert_eq!(decoded.network, Network::Regtest);

        // only v0 script hashes are family script addresses
        assert!(EvmScriptAddress::parse(&s, &table, Network::Regtest).is_err());
    }

    #[test]
    fn test_decode_plain_segwit_prefix_rejected() {
        let table = NetworkTable::standard();
        assert!(matches!(
            decode(TESTNET_WSH_ADDR, &table, Network::Testnet),
            Err(AddressError::UnknownHrp(_))
        ));
    }

    #[test]
    fn test_script_pubkey_is_p2wsh() {
        let table = NetworkTable::standard();
        let addr = EvmScriptAddress::parse(TESTNET_EVM_ADDR, &table, Network::Testnet).unwrap();
        let spk = addr.script_pubkey();
        assert!(spk.is_p2wsh());
        assert_eq!(&spk.as_bytes()[2..], addr.program());
    }

    proptest! {
        #[test]
        fn proptest_address_round_trip(program in any::<[u8; 32]>(), net in 0usize..4) {
            let table = NetworkTable::standard();
            let params = table.iter().nth(net).unwrap().clone();
            let network = params.network();

            let s = encode(&program, &params).unwrap();
            let decoded = decode(&s, &table, network).unwrap();
            prop_assert_eq!(decoded, DecodedAddress {
                witness_version: 0,
                program: program.to_vec(),
                network,
            });
        }
    }
}
