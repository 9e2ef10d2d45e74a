use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "backdrop", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate (or fetch from cache) the background for one source image.
    Generate(GenerateArgs),
    /// Print the fingerprints of the default and variant asset bundles.
    Fingerprint(FingerprintArgs),
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Source image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Cache key; defaults to the SHA-256 of the source bytes.
    #[arg(long)]
    key: Option<String>,

    /// Use the variant template base.
    #[arg(long, default_value_t = false)]
    variant: bool,

    /// Output format (png, jpg, jpeg, webp).
    #[arg(long, default_value = "png")]
    format: String,

    /// JSON service config.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the cache directory.
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Override the template assets directory.
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Also copy the result to this path.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct FingerprintArgs {
    /// Template assets directory.
    #[arg(long, default_value = "assets")]
    assets: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Generate(args) => cmd_generate(args).await,
        Command::Fingerprint(args) => cmd_fingerprint(args),
    }
}

async fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let mut cfg = match &args.config {
        Some(path) => backdrop::ServiceConfig::from_path(path)?,
        None => backdrop::ServiceConfig::default(),
    };
    if let Some(dir) = args.cache_dir {
        cfg.cache_dir = dir;
    }
    if let Some(dir) = args.assets {
        cfg.assets_dir = dir;
    }

    let bytes = tokio::fs::read(&args.in_path)
        .await
        .with_context(|| format!("read source '{}'", args.in_path.display()))?;
    let key = match args.key {
        Some(key) => key,
        None => backdrop::sha256_hex(&bytes),
    };

    let service = cfg.build()?;
    let image = service
        .generate(
            backdrop::BytesSource::new(bytes),
            &key,
            args.variant,
            &args.format,
        )
        .await?;

    let entry = service.store().entry_path(
        &backdrop::CacheKey::new(key.as_str())?.with_variant(args.variant),
        service.assets().select(args.variant).fingerprint(),
        image.format,
    );

    if let Some(out) = &args.out {
        if let Some(parent) = out.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        std::fs::write(out, &image.bytes)
            .with_context(|| format!("write output '{}'", out.display()))?;
        eprintln!("wrote {}", out.display());
    }

    println!("{}", entry.display());
    println!("{}", image.content_type());
    Ok(())
}

fn cmd_fingerprint(args: FingerprintArgs) -> anyhow::Result<()> {
    let assets = backdrop::AssetSet::load_dir(&args.assets)?;
    println!("default {}", assets.default.fingerprint());
    println!("variant {}", assets.variant.fingerprint());
    Ok(())
}
