use bip_tools::{AddressType, ExtendedKey, Network, Xprv};
use clap::{Args, Parser, Subcommand};
use tracing::info;

#[derive(Debug, Parser)]
#[command(
    name = "bip-tools",
    arg_required_else_help(true),
    version,
    about,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    commands: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Derive sequential addresses from an extended public key
    Derive(DeriveArgs),
    /// Print the master extended private key for a raw seed
    FromSeed(FromSeedArgs),
    /// Print the master extended private key for a BIP39 mnemonic
    FromMnemonic(FromMnemonicArgs),
    /// Print a single address for one extended public key
    Address(AddressArgs),
}

#[derive(Debug, Args)]
struct DeriveArgs {
    #[arg(long = "xpub")]
    extended_public_key: String,
    #[arg(long)]
    count: u32,
    #[arg(long = "type", value_enum, default_value = "p2pkh")]
    kind: CliAddressType,
    #[arg(long, value_enum, default_value = "btc")]
    network: CliNetwork,
    /// Derive along the BIP44-style m/.../0/i receive chain instead of
    /// walking children at the key's own depth.
    #[arg(long)]
    bip44: bool,
}

#[derive(Debug, Args)]
struct FromSeedArgs {
    #[arg(long)]
    seed: String,
    #[arg(long, value_enum, default_value = "btc")]
    network: CliNetwork,
}

#[derive(Debug, Args)]
struct FromMnemonicArgs {
    #[arg(long)]
    mnemonic: String,
    #[arg(long, default_value = "")]
    passphrase: String,
    #[arg(long, value_enum, default_value = "btc")]
    network: CliNetwork,
}

#[derive(Debug, Args)]
struct AddressArgs {
    #[arg(long = "xpub")]
    extended_public_key: String,
    #[arg(long = "type", value_enum)]
    kind: CliAddressType,
    #[arg(long, value_enum, default_value = "btc")]
    network: CliNetwork,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliAddressType {
    #[value(name = "p2pkh")]
    P2pkh,
    #[value(name = "p2wpkh-p2sh")]
    P2wpkhP2sh,
    #[value(name = "p2wpkh")]
    P2wpkh,
}

impl From<CliAddressType> for AddressType {
    fn from(kind: CliAddressType) -> Self {
        match kind {
            CliAddressType::P2pkh => AddressType::P2pkh,
            CliAddressType::P2wpkhP2sh => AddressType::P2wpkhP2sh,
            CliAddressType::P2wpkh => AddressType::P2wpkh,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliNetwork {
    #[value(name = "btc")]
    Btc,
    #[value(name = "btct")]
    Btct,
}

impl From<CliNetwork> for Network {
    fn from(network: CliNetwork) -> Self {
        match network {
            CliNetwork::Btc => Network::Btc,
            CliNetwork::Btct => Network::Btct,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.commands {
        Commands::Derive(args) => {
            let network = Network::from(args.network);
            let xpub = match bip_tools::decode(&args.extended_public_key, network)? {
                ExtendedKey::Pub(xpub) => xpub,
                ExtendedKey::Prv(_) => {
                    return Err("expected an extended public key, got an extended private key".into())
                }
            };

            info!(count = args.count, bip44 = args.bip44, "deriving addresses");
            let kind = Some(AddressType::from(args.kind));
            let addresses = if args.bip44 {
                xpub.derive_bip44_addresses(args.count, kind)?
            } else {
                xpub.derive_addresses(args.count, kind)?
            };
            for (i, address) in addresses.iter().enumerate() {
                println!("Child {}: {}", i, address);
            }
        }
        Commands::FromSeed(args) => {
            let seed = hex_decode(&args.seed)?;
            let master = Xprv::from_seed(&seed, Network::from(args.network), AddressType::P2pkh)?;
            println!("{}", master.encode()?);
        }
        Commands::FromMnemonic(args) => {
            let master = Xprv::from_mnemonic(
                &args.mnemonic,
                &args.passphrase,
                Network::from(args.network),
                AddressType::P2pkh,
            )?;
            println!("{}", master.encode()?);
        }
        Commands::Address(args) => {
            let network = Network::from(args.network);
            let xpub = match bip_tools::decode(&args.extended_public_key, network)? {
                ExtendedKey::Pub(xpub) => xpub,
                ExtendedKey::Prv(_) => {
                    return Err("expected an extended public key, got an extended private key".into())
                }
            };
            println!("{}", xpub.address(Some(AddressType::from(args.kind)))?);
        }
    }

    Ok(())
}

fn hex_decode(s: &str) -> Result<Vec<u8>, String> {
    let s = s.trim();
    if s.len() % 2 != 0 {
        return Err("odd-length hex string".to_string());
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).map_err(|e| e.to_string()))
        .collect()
}
