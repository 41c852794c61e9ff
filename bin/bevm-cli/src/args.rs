//! Command line arguments for the `bevm-cli` binary.

use std::path::PathBuf;

use argh::FromArgs;

/// Wallet and operator tooling for the bitcoin to evm bridge.
#[derive(FromArgs)]
pub(crate) struct Args {
    #[argh(subcommand)]
    pub(crate) subc: Subcommand,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand)]
pub(crate) enum Subcommand {
    Address(SubcAddress),
    DecodeAddress(SubcDecodeAddress),
    Sign(SubcSign),
    Inspect(SubcInspect),
    Scan(SubcScan),
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(
    subcommand,
    name = "address",
    description = "derives the bridge address of a public key"
)]
pub(crate) struct SubcAddress {
    #[argh(option, description = "compressed public key, hex")]
    pub(crate) pubkey: String,

    #[argh(switch, description = "use the deploy locking script")]
    pub(crate) deploy: bool,

    #[argh(
        option,
        description = "network name [bitcoin, testnet, signet, regtest]",
        short = 'n'
    )]
    pub(crate) network: Option<String>,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(
    subcommand,
    name = "decode-address",
    description = "decodes a bridge address"
)]
pub(crate) struct SubcDecodeAddress {
    #[argh(positional, description = "address")]
    pub(crate) address: String,

    #[argh(
        option,
        description = "network preferred when the prefix is shared",
        short = 'n'
    )]
    pub(crate) network: Option<String>,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(
    subcommand,
    name = "sign",
    description = "signs an input locked by a bridge script, attaching a payload"
)]
pub(crate) struct SubcSign {
    #[argh(option, description = "unsigned transaction, hex")]
    pub(crate) tx: String,

    #[argh(option, description = "index of the input to sign")]
    pub(crate) input: usize,

    #[argh(option, description = "value of the spent output in sats")]
    pub(crate) amount: u64,

    #[argh(option, description = "secret key, hex")]
    pub(crate) key: String,

    #[argh(option, description = "call target address, hex")]
    pub(crate) call: Option<String>,

    #[argh(option, description = "call data, hex")]
    pub(crate) data: Option<String>,

    #[argh(option, description = "contract creation code, hex")]
    pub(crate) deploy: Option<String>,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(
    subcommand,
    name = "inspect",
    description = "extracts the invocations carried by a transaction"
)]
pub(crate) struct SubcInspect {
    #[argh(option, description = "transaction, hex")]
    pub(crate) tx: String,

    #[argh(
        option,
        description = "spent output as txid:vout:script-hex, repeatable"
    )]
    pub(crate) prevout: Vec<String>,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(
    subcommand,
    name = "scan",
    description = "translates a range of source blocks without executing them"
)]
pub(crate) struct SubcScan {
    #[argh(option, description = "config file path", short = 'c')]
    pub(crate) config: PathBuf,

    #[argh(option, description = "first source height")]
    pub(crate) from: u64,

    #[argh(option, description = "last source height, inclusive")]
    pub(crate) to: u64,
}
