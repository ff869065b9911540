// Entry point for the offline nano-wallet tool.
// Nothing here talks to a node: every command works on keys, addresses
// and block JSON supplied on the command line.
use clap::Parser;
use data_encoding::HEXUPPER_PERMISSIVE;
use log::{error, info, LevelFilter};
use nano_wallet::{
    Block, BlockDeserializer, Command, NanoAccount, NanoError, Opt, PrivateKey, PublicKey, Settings,
};
use std::io::Read;
use std::process;

fn main() {
    // Info level by default; RUST_LOG still wins
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let opt = Opt::parse();

    if let Err(e) = run(opt) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn load_settings(opt: &Opt) -> Result<Settings, NanoError> {
    let base = match &opt.config {
        Some(path) => {
            info!("Loading settings from {}", path.display());
            Settings::from_file(path)?
        }
        None => Settings::default(),
    };
    let mut settings = base.overlay_env()?;
    if let Some(prefix) = &opt.prefix {
        settings.address_prefix = prefix.clone();
        settings.validate()?;
    }
    Ok(settings)
}

fn run(opt: Opt) -> Result<(), Box<dyn std::error::Error>> {
    let settings = load_settings(&opt)?;
    let prefix = settings.address_prefix.as_str();

    match opt.command {
        Command::Generate => {
            let key = PrivateKey::generate()?;
            print_key(&key, prefix)?;
        }
        Command::Address { public_key } => {
            let account = NanoAccount::new(PublicKey::from_hex(&public_key)?, prefix)?;
            println!("{account}");
        }
        Command::ParseAddress { address } => {
            let account = NanoAccount::parse(&address)?;
            println!("Prefix:     {}", account.prefix());
            println!("Public key: {}", account.public_key());
            println!("Checksum:   {}", account.checksum());
        }
        Command::Derive { private_key } => {
            let key = PrivateKey::from_hex(&private_key)?;
            let account = NanoAccount::new(key.public_key(), prefix)?;
            println!("Public key: {}", account.public_key());
            println!("Address:    {account}");
        }
        Command::FromSeed { seed, index } => {
            let seed = decode_seed(&seed)?;
            let key = PrivateKey::from_seed(&seed, index);
            print_key(&key, prefix)?;
        }
        Command::HashBlock { block } => {
            let block = parse_block(&block)?;
            println!("{}", block.hash());
        }
        Command::VerifyBlock { block, signer } => {
            let block = parse_block(&block)?;
            let signer = match signer {
                Some(text) => *NanoAccount::parse(&text)?.public_key(),
                None => *block.account_key().ok_or(
                    "this block does not name its account; pass --signer",
                )?,
            };
            if block.verify_signature(&signer) {
                println!("Signature of {block} is valid");
            } else {
                return Err(format!("signature of {block} does not verify").into());
            }
        }
        Command::Config => {
            println!("address_prefix         = {}", settings.address_prefix);
            match settings.representative_account()? {
                Some(rep) => println!("default_representative = {rep}"),
                None => println!("default_representative = (none)"),
            }
            println!("max_publish_attempts   = {}", settings.max_publish_attempts);
            println!("receive_batch_size     = {}", settings.receive_batch_size);
            println!("receive_threshold_raw  = {}", settings.receive_threshold_raw);
        }
    }
    Ok(())
}

fn print_key(key: &PrivateKey, prefix: &str) -> Result<(), NanoError> {
    let account = NanoAccount::new(key.public_key(), prefix)?;
    println!("Private key: {}", key.to_hex());
    println!("Public key:  {}", account.public_key());
    println!("Address:     {account}");
    Ok(())
}

fn decode_seed(text: &str) -> Result<[u8; 32], NanoError> {
    let bytes = HEXUPPER_PERMISSIVE
        .decode(text.as_bytes())
        .map_err(|e| NanoError::format(format!("invalid seed hex: {e}")))?;
    bytes
        .try_into()
        .map_err(|_| NanoError::format("seed must be 32 bytes"))
}

fn parse_block(arg: &str) -> Result<Block, NanoError> {
    let text = if arg == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        arg.to_string()
    };
    BlockDeserializer::default().deserialize_str(text.trim())
}
