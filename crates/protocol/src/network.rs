//! Network parameters for the address family.
//!
//! The table is built once and handed to the address codec by reference. Nothing here is
//! registered globally.

use bitcoin::Network;

use crate::{constants::EVM_HRP_MARKER, errors::AddressError};

/// Address parameters for a single source network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkParams {
    network: Network,
    segwit_hrp: &'static str,
    evm_hrp: String,
}

impl NetworkParams {
    pub fn new(network: Network, segwit_hrp: &'static str) -> Self {
        let mut evm_hrp = segwit_hrp.to_owned();
        evm_hrp.push(EVM_HRP_MARKER);
        Self {
            network,
            segwit_hrp,
            evm_hrp,
        }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Prefix of plain segwit addresses on this network.
    pub fn segwit_hrp(&self) -> &'static str {
        self.segwit_hrp
    }

    /// Prefix of family addresses on this network, the segwit prefix plus the family marker.
    pub fn evm_hrp(&self) -> &str {
        &self.evm_hrp
    }
}

/// Immutable lookup table of [`NetworkParams`].
#[derive(Debug, Clone)]
pub struct NetworkTable {
    entries: Vec<NetworkParams>,
}

impl NetworkTable {
    pub fn new(entries: Vec<NetworkParams>) -> Self {
        Self { entries }
    }

    /// Mainnet, testnet, signet and regtest.
    ///
    /// Testnet and signet share a prefix; testnet comes first so it wins when the caller
    /// expresses no preference.
    pub fn standard() -> Self {
        Self::new(vec![
            NetworkParams::new(Network::Bitcoin, "bc"),
            NetworkParams::new(Network::Testnet, "tb"),
            NetworkParams::new(Network::Signet, "tb"),
            NetworkParams::new(Network::Regtest, "bcrt"),
        ])
    }

    pub fn get(&self, network: Network) -> Result<&NetworkParams, AddressError> {
        self.entries
            .iter()
            .find(|p| p.network == network)
            .ok_or(AddressError::UnsupportedNetwork(network))
    }

    /// Resolves a family prefix to its network, preferring `default_network` when several
    /// networks share the prefix.
    pub fn resolve_evm_hrp(
        &self,
        hrp: &str,
        default_network: Network,
    ) -> Result<&NetworkParams, AddressError> {
        let hrp = hrp.to_ascii_lowercase();
        let mut candidates = self.entries.iter().filter(|p| p.evm_hrp == hrp).peekable();
        let first = candidates
            .peek()
            .copied()
            .ok_or_else(|| AddressError::UnknownHrp(hrp.clone()))?;
        Ok(candidates
            .find(|p| p.network == default_network)
            .unwrap_or(first))
    }

    pub fn iter(&self) -> impl Iterator<Item = &NetworkParams> {
        self.entries.iter()
    }
}

impl Default for NetworkTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evm_hrp_appends_marker() {
        let table = NetworkTable::standard();
        assert_eq!(table.get(Network::Bitcoin).unwrap().evm_hrp(), "bce");
        assert_eq!(table.get(Network::Testnet).unwrap().evm_hrp(), "tbe");
        assert_eq!(table.get(Network::Regtest).unwrap().evm_hrp(), "bcrte");
    }

    #[test]
    fn test_shared_prefix_prefers_default() {
        let table = NetworkTable::standard();
        let params = table.resolve_evm_hrp("tbe", Network::Signet).unwrap();
        assert_eq!(params.network(), Network::Signet);

        let params = table.resolve_evm_hrp("tbe", Network::Bitcoin).unwrap();
        assert_eq!(params.network(), Network::Testnet);
    }

    #[test]
    fn test_unknown_hrp() {
        let table = NetworkTable::standard();
        assert!(matches!(
            table.resolve_evm_hrp("bc", Network::Bitcoin),
            Err(AddressError::UnknownHrp(_))
        ));
    }
}
