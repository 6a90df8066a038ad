//! Query the Smack access decision interface from the command line.
//!
//! Useful for checking what the kernel would answer for a label pair
//! before pointing a server's monitor at it. Exits 0 on allow, 1 on deny.

use anyhow::{bail, Result};
use clap::Parser;
use smackgate::oracle::{OracleClient, OracleVerdict};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Query the Smack access decision interface")]
struct Cli {
    /// Subject label
    subject: String,
    /// Object label
    object: String,
    /// Access string: r-, -w, or rw
    #[arg(default_value = "rw")]
    access: String,
    /// Primary decision interface path
    #[arg(long, default_value = "/sys/fs/smackfs/access2")]
    primary: PathBuf,
    /// Fallback decision interface path
    #[arg(long, default_value = "/smack/access2")]
    fallback: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let oracle = OracleClient::new(cli.primary, cli.fallback);
    let verdict = oracle.query(&cli.subject, &cli.object, &cli.access)?;

    if oracle.is_unavailable() {
        bail!("decision interface is not present on this system");
    }

    match verdict {
        OracleVerdict::Allow => println!("allow"),
        OracleVerdict::Deny => {
            println!("deny");
            std::process::exit(1);
        }
    }
    Ok(())
}
