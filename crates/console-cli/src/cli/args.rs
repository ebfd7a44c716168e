use super::*;
#[derive(Parser)]
#[command(author, version, about = "Terminal console for the redemption admin backend")]
pub(super) struct Cli {
    #[arg(
        long,
        global = true,
        env = "ADMIN_CONSOLE_SERVER",
        help = "Backend base URL for this run (overrides the saved config)"
    )]
    pub(super) server: Option<String>,
    #[command(subcommand)]
    pub(super) command: Option<Commands>,
}

#[derive(clap::Subcommand)]
pub(super) enum Commands {
    #[command(about = "Launch terminal UI (default)")]
    Tui,
    #[command(about = "Sign in and store the session token")]
    Login(LoginArgs),
    #[command(about = "Forget the stored session token")]
    Logout,
    #[command(about = "Manage config")]
    Config(ConfigArgs),
}

#[derive(Parser)]
pub(super) struct LoginArgs {
    #[arg(long)]
    pub(super) username: String,
    #[arg(long, help = "Read from stdin when omitted")]
    pub(super) password: Option<String>,
}

#[derive(Parser)]
pub(super) struct ConfigArgs {
    #[command(subcommand)]
    pub(super) command: ConfigCommands,
}

#[derive(clap::Subcommand)]
pub(super) enum ConfigCommands {
    #[command(about = "Print the effective config")]
    Show,
    #[command(about = "Set the backend base URL")]
    SetServer(SetServerArgs),
    #[command(about = "Set the live task refresh interval")]
    SetInterval(SetIntervalArgs),
}

#[derive(Parser)]
pub(super) struct SetServerArgs {
    pub(super) url: String,
}

#[derive(Parser)]
pub(super) struct SetIntervalArgs {
    #[arg(help = "Milliseconds: one of 1000, 2000, 5000, 10000, 30000")]
    pub(super) ms: u64,
}

pub(super) fn command_label(command: &Option<Commands>) -> &'static str {
    match command {
        None | Some(Commands::Tui) => "tui",
        Some(Commands::Login(_)) => "login",
        Some(Commands::Logout) => "logout",
        Some(Commands::Config(args)) => match args.command {
            ConfigCommands::Show => "config.show",
            ConfigCommands::SetServer(_) => "config.set-server",
            ConfigCommands::SetInterval(_) => "config.set-interval",
        },
    }
}
