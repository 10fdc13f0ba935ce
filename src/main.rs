#![warn(clippy::pedantic)]

mod cli;
mod error;
mod preferences;
mod prompt;
mod session;
mod token;
mod transport;

use anyhow::{Context, Result};
use std::io;

fn run(args: &cli::Args) -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let accounts = prompt::read_accounts(&mut input, &mut io::stdout())?;
    let config = args.transport_config();

    let from = session::AccountSession::new(&config)
        .with_context(|| "Error creating a session")?
        .authenticate(&accounts.from)
        .with_context(|| "Error authenticating the from account")?;
    let to = session::AccountSession::new(&config)
        .with_context(|| "Error creating a session")?
        .authenticate(&accounts.to)
        .with_context(|| "Error authenticating the to account")?;

    let outcome = preferences::transfer(&from, &to).with_context(|| "Error copying settings")?;
    if outcome.is_success() {
        println!("Account settings transferred successfully");
    } else {
        println!("Failed to transfer settings");
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let args = cli::Args::parse_args();
    if let Err(err) = run(&args) {
        println!("{:#}", err);
    }
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    if let Err(err) = prompt::wait_for_enter(&mut stdin.lock(), &mut stdout) {
        println!("{}", err);
    }
}
