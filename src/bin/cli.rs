//! filexfer CLI Client
//!
//! Command-line interface for exchanging files with a filexfer server.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use filexfer::{Client, ClientConfig};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{fmt, EnvFilter};

/// filexfer CLI
#[derive(Parser, Debug)]
#[command(name = "filexfer-cli")]
#[command(about = "CLI for the filexfer file server")]
#[command(version)]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:6666")]
    server: String,

    /// Socket timeout in seconds (0 disables it)
    #[arg(short, long, default_value = "120")]
    timeout_secs: u64,

    /// Default directory for downloads
    #[arg(long, default_value = "./downloads")]
    download_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List files on the server
    List,

    /// Upload a local file
    Upload {
        /// The file to upload
        path: PathBuf,
    },

    /// Download a file from the server
    Download {
        /// Name of the file on the server
        filename: String,

        /// Where to save it (defaults to the download directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete a file on the server
    Delete {
        /// Name of the file on the server
        filename: String,
    },

    /// Show server directory statistics
    Info,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let args = Args::parse();

    let config = ClientConfig::builder()
        .download_dir(&args.download_dir)
        .timeout_ms(args.timeout_secs * 1000)
        .build();

    let mut client = match Client::connect(args.server.as_str(), config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Cannot connect to {}: {}", args.server, e);
            return ExitCode::FAILURE;
        }
    };

    let result = run(&mut client, args.command);
    client.disconnect();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(client: &mut Client, command: Commands) -> filexfer::Result<()> {
    match command {
        Commands::List => {
            let mut files = client.list_files()?;
            files.sort_by(|a, b| a.name.cmp(&b.name));
            for file in &files {
                println!("{:>12}  {:>14.0}  {}", file.size, file.modified, file.name);
            }
            println!("{} file(s)", files.len());
        }
        Commands::Upload { path } => {
            let bar = transfer_bar();
            let report = client.upload_file(&path, &mut |p: f64| bar.set_position(p as u64));
            bar.finish_and_clear();
            let report = report?;
            println!("Uploaded {} ({} bytes, md5 {})", report.path.display(), report.size, report.md5);
        }
        Commands::Download { filename, output } => {
            let bar = transfer_bar();
            let report = client.download_file(&filename, output.as_deref(), &mut |p: f64| {
                bar.set_position(p as u64)
            });
            bar.finish_and_clear();
            let report = report?;
            println!("Saved {} ({} bytes, md5 {})", report.path.display(), report.size, report.md5);
        }
        Commands::Delete { filename } => {
            let message = client.delete_file(&filename)?;
            println!("{}: {}", filename, message);
        }
        Commands::Info => {
            let info = client.server_info()?;
            println!("Directory:   {}", info.upload_dir);
            println!("Files:       {}", info.total_files);
            println!("Total size:  {} bytes", info.total_size);
        }
    }
    Ok(())
}

/// Percentage progress bar for one transfer
fn transfer_bar() -> ProgressBar {
    let bar = ProgressBar::new(100);
    if let Ok(style) = ProgressStyle::with_template("[{elapsed_precise}] {bar:40} {pos:>3}%") {
        bar.set_style(style);
    }
    bar
}
