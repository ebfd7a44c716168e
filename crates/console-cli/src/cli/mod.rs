use crate::{logging, tui};
use anyhow::Context;
use clap::Parser;
use console_api::auth::KeyringStore;
use console_api::{AdminBackend, AdminClient, AuthTransport};
use console_core::config::{
    AppConfig, RefreshInterval, default_config_path, normalize_server_url,
};
use console_core::credential::CredentialStore;
use console_core::diagnostics::{DiagnosticRecord, DiagnosticsLog, Outcome};
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use time::UtcOffset;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod app;
mod args;
mod auth_cmd;
mod config_cmd;

use args::*;

pub use app::run;
use auth_cmd::{handle_login, handle_logout};
use config_cmd::handle_config;
