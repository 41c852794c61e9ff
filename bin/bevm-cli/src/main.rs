//! Command line tool for the bitcoin to evm bridge.
//!
//! Derives and decodes bridge addresses, signs payload-carrying spends, and dry-runs block
//! translation against a bitcoind node.

mod args;
mod cmd;
mod util;

use cmd::exec_subc;

fn main() {
    let args: args::Args = argh::from_env();
    if let Err(e) = exec_subc(args.subc) {
        eprintln!("ERROR\n{e:?}");
        std::process::exit(1);
    }
}
