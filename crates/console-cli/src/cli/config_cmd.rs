use super::*;
pub(super) fn handle_config(
    args: ConfigArgs,
    config_path: &Path,
    config: AppConfig,
) -> anyhow::Result<()> {
    match args.command {
        ConfigCommands::Show => handle_show(config_path, &config),
        ConfigCommands::SetServer(args) => handle_set_server(args, config_path, config),
        ConfigCommands::SetInterval(args) => handle_set_interval(args, config_path, config),
    }
}

fn handle_show(config_path: &Path, config: &AppConfig) -> anyhow::Result<()> {
    println!("Config file: {}", config_path.display());
    let rendered = serde_json::to_string_pretty(config).context("serialize config")?;
    println!("{rendered}");
    Ok(())
}

pub(super) fn handle_set_server(
    args: SetServerArgs,
    config_path: &Path,
    mut config: AppConfig,
) -> anyhow::Result<()> {
    config.server_url = normalize_server_url(&args.url)?;
    config.save(config_path)?;
    info!(server = %config.server_url, "Server URL updated");
    println!("Server set to {}", config.server_url);
    Ok(())
}

pub(super) fn handle_set_interval(
    args: SetIntervalArgs,
    config_path: &Path,
    mut config: AppConfig,
) -> anyhow::Result<()> {
    let Some(interval) = RefreshInterval::from_millis(args.ms) else {
        let choices: Vec<String> = RefreshInterval::CHOICES_MS
            .iter()
            .map(|ms| ms.to_string())
            .collect();
        anyhow::bail!(
            "unsupported interval {} ms; choose one of {}",
            args.ms,
            choices.join(", ")
        );
    };
    config.set_refresh_interval(interval);
    config.save(config_path)?;
    info!(interval_ms = interval.as_millis(), "Refresh interval updated");
    println!("Refresh interval set to {interval}");
    Ok(())
}
