#![deny(clippy::all)]
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use log::debug;
use vk_media_downloader::cli::{owner, Cli, Commands};
use vk_media_downloader::fetch::default_client;
use vk_media_downloader::{Downloader, Fetcher, HttpApi, RunSummary};

fn main() -> Result<()> {
    let args = Cli::parse();

    env_logger::builder().format_timestamp(None).init();

    let dest = args.output_dir()?;
    debug!("Target dir: {}", dest.display());

    let client = default_client()?;

    let api = HttpApi::new(client.clone())
        .access_token(args.token.clone())
        .version(args.api_version.clone());

    let fetcher = Fetcher::new(Arc::new(client)).max_attempts(args.attempts);

    let downloader = Downloader::new(api, fetcher).with_threads(usize::from(args.threads));

    let summary = match &args.mode {
        Commands::Albums {
            user,
            group,
            albums,
        } => {
            let albums = (!albums.is_empty()).then_some(albums.as_slice());
            downloader.album_photos(&dest, owner(*user, *group), albums)?
        }
        Commands::UserPhotos { user } => downloader.user_photos(&dest, *user)?,
        Commands::Audios { user, group } => downloader.audios(&dest, owner(*user, *group))?,
        Commands::FriendsPhotos { user } => downloader.friends_photos(&dest, *user)?,
    };

    print_results(summary);

    Ok(())
}

fn print_results(summary: RunSummary) {
    println!(
        "{} {} {}",
        summary.downloaded.to_string().bold().blue(),
        "files".bold().blue(),
        "downloaded".bold()
    );

    if summary.failed > 0 {
        println!(
            "{} {}",
            summary.failed.to_string().bold().red(),
            "files could not be downloaded. Check the log for details."
                .bold()
                .red()
        );
    }
}
