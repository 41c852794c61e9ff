mod address;
mod inspect;
mod scan;
mod sign;

use crate::args::Subcommand;

/// Executes a subcommand.
pub(crate) fn exec_subc(cmd: Subcommand) -> anyhow::Result<()> {
    match cmd {
        Subcommand::Address(subc) => address::exec_address(subc),
        Subcommand::DecodeAddress(subc) => address::exec_decode_address(subc),
        Subcommand::Sign(subc) => sign::exec(subc),
        Subcommand::Inspect(subc) => inspect::exec(subc),
        Subcommand::Scan(subc) => scan::exec(subc),
    }
}
