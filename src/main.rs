use clap::Parser;
use site_capture::enhance::{ChatCompletionsEnhancer, Enhancer};
use site_capture::utils::sanitize_filename;
use site_capture::{CaptureConfig, CaptureError, SiteCapture, WebsiteContent};
use std::path::Path;
use std::process::ExitCode;

mod args;
use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            ::log::error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let max_retries = config.max_retries;
    let enhancer = if args.enhance {
        match build_enhancer(&config) {
            Ok(enhancer) => Some(enhancer),
            Err(e) => {
                ::log::error!("Cannot enhance: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        None
    };

    let capture = SiteCapture::new().with_config(config);

    let start_time = std::time::Instant::now();
    ::log::info!("Capturing {} URL(s)", args.urls.len());

    // A single attempt goes through the plain batch path
    let pages = if max_retries > 1 {
        capture
            .fetch_multiple_with_retry(&args.urls[..], max_retries)
            .await
    } else {
        capture.fetch_multiple_urls(&args.urls[..]).await
    };

    let failures = pages.iter().filter(|page| page.is_error()).count();
    ::log::info!(
        "Captured {} page(s), {} failed, in {:.2} seconds",
        pages.len() - failures,
        failures,
        start_time.elapsed().as_secs_f64()
    );

    if let Some(dir) = &args.save_dir {
        if let Err(e) = save_pages(dir, &pages, enhancer.as_ref()).await {
            ::log::error!("Failed to save pages: {}", e);
            return ExitCode::FAILURE;
        }
    }

    match serde_json::to_string_pretty(&pages) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            ::log::error!("Failed to serialize results: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Config file values, overridden by command-line flags
fn load_config(args: &Args) -> Result<CaptureConfig, CaptureError> {
    let mut config = match &args.config {
        Some(path) => CaptureConfig::from_file(path)?,
        None => CaptureConfig::default(),
    };

    if let Some(timeout_ms) = args.timeout_ms {
        config.fetch.timeout_ms = timeout_ms;
    }
    if let Some(user_agent) = &args.user_agent {
        config.fetch.user_agent = user_agent.clone();
    }
    if args.no_follow_redirects {
        config.fetch.follow_redirects = false;
    }
    if let Some(max_redirects) = args.max_redirects {
        config.fetch.max_redirects = max_redirects;
    }
    if let Some(retries) = args.retries {
        config.max_retries = retries;
    }
    if args.external_css {
        config.stylesheets.enabled = true;
    }
    if args.allow_private {
        config.policy.allow_private_networks = true;
    }

    Ok(config)
}

fn build_enhancer(config: &CaptureConfig) -> Result<ChatCompletionsEnhancer, CaptureError> {
    let enhancer_config = config.enhancer.clone().ok_or_else(|| {
        CaptureError::Config("no `enhancer` section in the configuration".to_string())
    })?;
    ChatCompletionsEnhancer::new(enhancer_config)
}

/// Write each successful page as a standalone document, plus its enhanced
/// version when an enhancer is given
async fn save_pages(
    dir: &Path,
    pages: &[WebsiteContent],
    enhancer: Option<&ChatCompletionsEnhancer>,
) -> Result<(), CaptureError> {
    tokio::fs::create_dir_all(dir).await?;

    for page in pages.iter().filter(|page| !page.is_error()) {
        let name = sanitize_filename(&page.url);
        let path = dir.join(format!("{}.html", name));
        tokio::fs::write(&path, page.to_standalone_html()).await?;
        ::log::info!("Saved {}", path.display());

        if let Some(enhancer) = enhancer {
            match enhancer.enhance(&page.enhancement_input()).await {
                Ok(enhanced) => {
                    let path = dir.join(format!("{}.enhanced.html", name));
                    tokio::fs::write(&path, enhanced).await?;
                    ::log::info!("Saved enhanced page {}", path.display());
                }
                Err(e) => ::log::warn!("Enhancement failed for {}: {}", page.url, e),
            }
        }
    }

    Ok(())
}
