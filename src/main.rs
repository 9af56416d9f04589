use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use doctor_portraits::backend::{BackendSettings, RetryPolicy, Txt2ImgParams};
use doctor_portraits::batch::driver::{local_seed, run_batch, BatchSettings};
use doctor_portraits::{BackendKind, Config, PromptConstructor};

#[derive(Parser, Debug)]
#[command(name = "doctor-portraits", about = "Batch generate doctor profile images", version)]
struct Cli {
    /// Override OPENAI_BASE_URL
    #[arg(global = true, long)]
    openai_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a batch of images and a metadata.csv ledger
    Generate {
        /// Number of images (ignored when --csv is given)
        #[arg(long, default_value_t = 140)]
        count: usize,
        /// Image backend
        #[arg(long, value_enum, default_value_t = BackendKind::OpenAi)]
        backend: BackendKind,
        /// Output directory (defaults to DOCTOR_IMAGES_DIR)
        #[arg(long, value_name = "PATH")]
        outdir: Option<PathBuf>,
        /// Optional CSV with id,name columns to name the images
        #[arg(long, value_name = "PATH")]
        csv: Option<PathBuf>,
        /// Master seed; item i uses (seed + i) mod 2^32
        #[arg(long)]
        seed: Option<u64>,
        /// Image size for OpenAI, e.g. 1024x1024
        #[arg(long, default_value = "1024x1024")]
        size: String,
        /// OpenAI image model (API default when omitted)
        #[arg(long)]
        model: Option<String>,
        /// Automatic1111 URL (defaults to AUTOMATIC1111_URL)
        #[arg(long)]
        auto_url: Option<String>,
        /// Sampling steps (automatic1111)
        #[arg(long, default_value_t = 20)]
        steps: u32,
        /// Sampler name (automatic1111)
        #[arg(long, default_value = "Euler a")]
        sampler: String,
        /// CFG scale (automatic1111)
        #[arg(long, default_value_t = 7.0)]
        cfg_scale: f64,
        /// Width (automatic1111)
        #[arg(long, default_value_t = 1024)]
        width: u32,
        /// Height (automatic1111)
        #[arg(long, default_value_t = 1024)]
        height: u32,
        /// Attempts per image before it is recorded as failed
        #[arg(long, default_value_t = 3)]
        retries: u32,
    },
    /// Print the prompts a seeded batch would use, without generating
    Prompt {
        /// Master seed
        #[arg(long)]
        seed: Option<u64>,
        /// Number of prompts
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    Config::dotenv_load();
    let cli = Cli::parse();

    let mut conf = Config::new();
    if let Some(url) = cli.openai_url {
        conf.openai_base_url = url;
    }

    match cli.command {
        Commands::Generate {
            count, backend, outdir, csv, seed, size, model, auto_url,
            steps, sampler, cfg_scale, width, height, retries,
        } => {
            if let Some(url) = auto_url {
                conf.automatic1111_url = url;
            }
            if let Some(dir) = outdir {
                conf.output_dir = dir;
            }
            conf.print_env_vars();

            let settings = BatchSettings {
                count,
                output_dir: conf.output_dir.clone(),
                backend,
                manifest_path: csv,
                seed,
                backend_settings: BackendSettings {
                    size,
                    model,
                    txt2img: Txt2ImgParams { steps, sampler, cfg_scale, width, height },
                    retry: RetryPolicy::new(retries),
                },
            };

            let summary = run_batch(&conf, &settings).await.map_err(|e| {
                eprintln!("Error: {}", e);
                e
            })?;
            println!(
                "Done. {} images ({} failed) + metadata saved to {} (seed {})",
                summary.succeeded,
                summary.failed,
                summary.output_dir.display(),
                summary.master_seed
            );
            Ok(())
        }
        Commands::Prompt { seed, count } => {
            let constructor = PromptConstructor::new();
            match seed {
                Some(master) => {
                    for i in 0..count {
                        let item_seed = local_seed(master, i);
                        println!("{}\t{}", item_seed, constructor.build_prompt(Some(u64::from(item_seed))));
                    }
                }
                None => {
                    for _ in 0..count {
                        println!("{}", constructor.build_prompt(None));
                    }
                }
            }
            Ok(())
        }
    }
}
