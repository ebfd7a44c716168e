use super::*;

pub(super) async fn handle_login(
    args: LoginArgs,
    client: &AdminClient,
    credentials: &CredentialStore,
    diagnostics: Option<&DiagnosticsLog>,
) -> anyhow::Result<()> {
    let password = match args.password {
        Some(password) => password,
        None => prompt_password()?,
    };
    let result: anyhow::Result<()> = async {
        let data = client
            .login(&args.username, &password)
            .await
            .context("login request failed")?;
        credentials.save(&data.token, data.expires_at.as_deref())?;
        match data.expires_at.as_deref() {
            Some(expires_at) => println!("Logged in as {} (expires {expires_at})", args.username),
            None => println!("Logged in as {}", args.username),
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    let outcome = if result.is_ok() {
        Outcome::Ok
    } else {
        Outcome::Failed
    };
    let error = result.as_ref().err().map(|err| format!("{err:#}"));
    record(
        diagnostics,
        DiagnosticRecord {
            message: Some(args.username.as_str()),
            error: error.as_deref(),
            ..DiagnosticRecord::new("auth.login", outcome)
        },
    );
    result
}

pub(super) fn handle_logout(
    credentials: &CredentialStore,
    diagnostics: Option<&DiagnosticsLog>,
) -> anyhow::Result<()> {
    let had_token = credentials.read().has_token();
    credentials.clear();
    if had_token {
        println!("Logged out");
    } else {
        println!("No stored session");
    }
    record(diagnostics, DiagnosticRecord::new("auth.logout", Outcome::Ok));
    Ok(())
}

fn prompt_password() -> anyhow::Result<String> {
    print!("Password: ");
    io::stdout().flush().context("flush stdout")?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("read password from stdin")?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        anyhow::bail!("password is required");
    }
    Ok(password)
}

fn record(diagnostics: Option<&DiagnosticsLog>, entry: DiagnosticRecord<'_>) {
    let Some(diagnostics) = diagnostics else {
        return;
    };
    match diagnostics.record(&entry) {
        Ok(entry_id) => println!("Diagnostics ID: {entry_id}"),
        Err(err) => warn!(error = %err, "Failed to write diagnostics entry"),
    }
}
