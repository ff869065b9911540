use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "nano-wallet", about = "Offline Nano key, address and block tools")]
pub struct Opt {
    #[arg(
        long = "config",
        global = true,
        help = "TOML settings file (NANO_* environment variables override it)"
    )]
    pub config: Option<PathBuf>,
    #[arg(
        long = "prefix",
        global = true,
        help = "Address prefix to print with, overriding the settings"
    )]
    pub prefix: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(name = "generate", about = "Generate a new random private key")]
    Generate,
    #[command(name = "address", about = "Print the address of a public key")]
    Address {
        #[arg(help = "Public key as 64 hex characters")]
        public_key: String,
    },
    #[command(name = "parse-address", about = "Decode and checksum an address")]
    ParseAddress {
        #[arg(help = "Address such as nano_1...")]
        address: String,
    },
    #[command(name = "derive", about = "Derive the public key and address of a private key")]
    Derive {
        #[arg(help = "Private key as 64 hex characters")]
        private_key: String,
    },
    #[command(name = "from-seed", about = "Derive key number INDEX of a seed")]
    FromSeed {
        #[arg(help = "Seed as 64 hex characters")]
        seed: String,
        #[arg(help = "Key index")]
        index: u32,
    },
    #[command(name = "hash-block", about = "Recompute the hash of a block")]
    HashBlock {
        #[arg(help = "Block JSON, or '-' to read it from stdin")]
        block: String,
    },
    #[command(name = "verify-block", about = "Check a block's signature")]
    VerifyBlock {
        #[arg(help = "Block JSON, or '-' to read it from stdin")]
        block: String,
        #[arg(
            long = "signer",
            help = "Signing account; required for legacy blocks without an account field"
        )]
        signer: Option<String>,
    },
    #[command(name = "config", about = "Print the effective settings")]
    Config,
}
