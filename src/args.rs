use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "site-capture")]
#[command(about = "Fetch web pages and print their sanitized content as JSON")]
#[command(version)]
pub struct Args {
    /// URLs to capture (a missing scheme defaults to https://)
    #[arg(required = true)]
    pub urls: Vec<String>,

    /// Path to a JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Request timeout in milliseconds
    #[arg(short, long)]
    pub timeout_ms: Option<u64>,

    /// User-Agent header to send
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Return redirect responses instead of following them
    #[arg(long)]
    pub no_follow_redirects: bool,

    /// Maximum number of redirects to follow
    #[arg(long)]
    pub max_redirects: Option<usize>,

    /// Attempts per URL (with exponential backoff between them)
    #[arg(short, long)]
    pub retries: Option<u32>,

    /// Fetch external stylesheets and append them to the CSS
    #[arg(long)]
    pub external_css: bool,

    /// Allow localhost and private network targets
    #[arg(long)]
    pub allow_private: bool,

    /// Write a standalone HTML file per captured page into this directory
    #[arg(short, long)]
    pub save_dir: Option<PathBuf>,

    /// Also run each page through the configured enhancement service
    #[arg(long, requires = "save_dir")]
    pub enhance: bool,
}
