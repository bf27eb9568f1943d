use clap::{
    ArgAction, CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tracing::debug;

use spotgrab::{
    cli,
    config::{self, AppContext, Config},
    fatal,
    management::LoginHint,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    /// Username to log in with, together with --token
    #[clap(long, global = true)]
    username: Option<String>,

    /// Stored credential token to log in with, together with --username
    #[clap(long, global = true)]
    token: Option<String>,

    /// More log output (-v debug, -vv trace)
    #[clap(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[clap(short, long, global = true)]
    quiet: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Log in and save credentials for later runs
    Login(LoginOptions),

    /// Remove saved credentials
    Logout,

    /// Resolve a single track
    Track(TargetOptions),

    /// Resolve every track of an album
    Album(TargetOptions),

    /// Resolve every album and single of an artist
    Artist(TargetOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct LoginOptions {
    /// Print the login link without opening a browser
    #[clap(long)]
    no_browser: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct TargetOptions {
    /// Id, share link, or spotify: URI
    id: String,

    /// Hide the progress bar
    #[clap(long)]
    no_progress: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn init_tracing(verbose: u8, quiet: bool) {
    // RUST_LOG wins over the flags.
    let default_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Command::Completions(opt) = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    if let Err(e) = config::load_env().await {
        fatal!("Cannot load environment. Err: {}", e);
    }

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => fatal!("Invalid configuration: {}", e),
    };
    debug!(?config, "configuration loaded");

    let ctx = match AppContext::new(config) {
        Ok(ctx) => ctx,
        Err(e) => fatal!("Cannot build HTTP client: {}", e),
    };

    let hint = LoginHint::new(cli.username.clone(), cli.token.clone());

    let result = match cli.command {
        Command::Login(opt) => cli::login(&ctx, &hint, !opt.no_browser).await,
        Command::Logout => cli::logout(&ctx).await,
        Command::Track(opt) => {
            cli::download(&ctx, &hint, cli::Target::track(&opt.id), !opt.no_progress).await
        }
        Command::Album(opt) => {
            cli::download(&ctx, &hint, cli::Target::album(&opt.id), !opt.no_progress).await
        }
        Command::Artist(opt) => {
            cli::download(&ctx, &hint, cli::Target::artist(&opt.id), !opt.no_progress).await
        }
        Command::Completions(_) => Ok(()),
    };

    if let Err(e) = result {
        fatal!("{}", e);
    }
}
