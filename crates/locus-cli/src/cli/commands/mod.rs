use super::args::*;

pub mod locate;
pub mod policy;

pub fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Locate(args) => locate::run(args),
        Command::Policy(args) => policy::run(args),
    }
}
