use std::io;

use anyhow::Result;
use log::*;

use blockfit::command::HELP;
use blockfit::config::Config;
use blockfit::session::Session;

fn main() -> Result<()> {
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "info");
    }
    pretty_env_logger::init();

    let config = Config::from_args(std::env::args().skip(1))?;
    let mut session = Session::new(&config)?;
    println!("{HELP}");

    // Commands are read from stdin until `quit` or EOF, so a
    // script can be piped in as well as typed.
    session.run(io::stdin().lock(), io::stdout().lock())?;

    info!(
        "Session ended with {} of {} units allocated.",
        session.ledger().total_allocated(),
        session.ledger().total_size()
    );
    Ok(())
}
