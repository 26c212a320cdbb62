use clap::{Parser, Subcommand};
use dwarchive::{
    archiver::Archiver,
    clients::{
        errors::Result,
        spotify::{DEFAULT_REDIRECT_URI, authorize_refresh_token},
    },
    playlist_ref::PlaylistRef,
    settings::{AppCredentials, PLAYLIST_VAR, REFRESH_TOKEN_VAR, Settings},
};
use log::info;

#[derive(Parser)]
#[command(name = "dwarchive")]
#[command(version, about = "Archive Discover Weekly into a dated Spotify playlist", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Source playlist id, URI or link. Overrides DW_PLAYLIST_ID
    #[arg(long, global = true, value_parser = parse_playlist)]
    playlist: Option<PlaylistRef>,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy the source playlist into a new dated playlist (default)
    Archive {
        /// Read the source playlist but create nothing
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the id of the playlist that would be archived
    Resolve {},
    /// Authorize the app in a browser and print a refresh token
    Authorize {
        /// Redirect URI registered for the app in the Spotify dashboard
        #[arg(long, default_value = DEFAULT_REDIRECT_URI)]
        redirect_uri: String,
    },
}

fn parse_playlist(value: &str) -> std::result::Result<PlaylistRef, String> {
    PlaylistRef::parse(value).map_err(|e| e.to_string())
}

/// Parses the command line and runs the selected command
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Archive { dry_run: false }) {
        Commands::Archive { dry_run } => archive(settings(cli.playlist)?, dry_run).await,
        Commands::Resolve {} => resolve(settings(cli.playlist)?).await,
        Commands::Authorize { redirect_uri } => authorize(&redirect_uri).await,
    }
}

fn settings(playlist: Option<PlaylistRef>) -> Result<Settings> {
    info!("Building config ...");
    if playlist.is_some() {
        info!("Using --playlist instead of {PLAYLIST_VAR}");
    }
    Settings::from_env(playlist)
}

async fn archive(settings: Settings, dry_run: bool) -> Result<()> {
    let archiver = Archiver::connect(settings).await?.dry_run(dry_run);
    let outcome = archiver.run().await?;
    println!("{outcome}");
    Ok(())
}

async fn resolve(settings: Settings) -> Result<()> {
    let archiver = Archiver::connect(settings).await?;
    let id = archiver.resolve().await?;
    println!("{id}");
    Ok(())
}

async fn authorize(redirect_uri: &str) -> Result<()> {
    let app = AppCredentials::from_env()?;
    let refresh_token =
        authorize_refresh_token(&app.client_id, &app.client_secret, redirect_uri).await?;
    println!("{REFRESH_TOKEN_VAR}={refresh_token}");
    Ok(())
}
