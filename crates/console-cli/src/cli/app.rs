use super::*;

const LOG_BUFFER_CAPACITY: usize = 200;

pub async fn run(utc_offset: UtcOffset) -> anyhow::Result<()> {
    let cli = Cli::parse();
    let interactive = matches!(cli.command, None | Some(Commands::Tui));

    let log_buffer = logging::LogBuffer::new(LOG_BUFFER_CAPACITY);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // The TUI owns the terminal, so only non-interactive commands log to stderr.
    let stderr_layer =
        (!interactive).then(|| tracing_subscriber::fmt::layer().with_writer(io::stderr));
    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(logging::LogLayer::new(log_buffer.clone()))
        .init();

    let config_path = default_config_path()?;
    let config = AppConfig::load(&config_path)?;
    info!(command = command_label(&cli.command), "Running command");

    let diagnostics = match DiagnosticsLog::new() {
        Ok(log) => Some(log),
        Err(err) => {
            warn!(error = %err, "Diagnostics log unavailable");
            None
        }
    };

    match cli.command {
        Some(Commands::Config(args)) => handle_config(args, &config_path, config),
        command => {
            let server_url = resolve_server(cli.server.as_deref(), &config)?;
            let credentials =
                CredentialStore::new(Arc::new(KeyringStore::for_server(&server_url)));
            match command {
                Some(Commands::Login(args)) => {
                    let client = build_client(&server_url, credentials.clone())?;
                    handle_login(args, &client, &credentials, diagnostics.as_ref()).await
                }
                Some(Commands::Logout) => handle_logout(&credentials, diagnostics.as_ref()),
                _ => {
                    let client = build_client(&server_url, credentials.clone())?;
                    tui::run_tui(tui::TuiContext {
                        backend: Arc::new(client),
                        credentials,
                        config,
                        config_path,
                        diagnostics,
                        log_buffer,
                        server_url,
                        utc_offset,
                    })
                    .await
                }
            }
        }
    }
}

/// The `--server` flag wins over the saved config for this run only.
pub(super) fn resolve_server(flag: Option<&str>, config: &AppConfig) -> anyhow::Result<String> {
    let raw = flag.unwrap_or(&config.server_url);
    normalize_server_url(raw).with_context(|| format!("invalid server URL: {raw}"))
}

fn build_client(server_url: &str, credentials: CredentialStore) -> anyhow::Result<AdminClient> {
    let transport = AuthTransport::new(server_url, credentials)?;
    Ok(AdminClient::new(transport))
}
