//! DNAC Session - command-line entry point
//!
//! Builds the session manager from layered settings and runs one command
//! against the named controller. Sessions persist in the store directory, so
//! `login` in one invocation serves `headers` or `get` in the next.

mod cli;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dnac_application::{AuthenticationSessionManager, SessionCredentialStore, SessionEvent};
use dnac_domain::{ControllerAddress, Credentials, SessionSettings};
use dnac_infrastructure::{
    FileCredentialStore, ReqwestHttpClient, SettingsLoader, SystemClock, TokioFileSystem,
    resolve_store_dir,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries command output.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings = load_settings(&cli)?;

    let store_dir = resolve_store_dir(&settings)?;
    tracing::debug!(store = %store_dir.display(), "using session store");
    let store = Arc::new(FileCredentialStore::new(TokioFileSystem::new(), store_dir));

    let http = ReqwestHttpClient::new(&settings).context("failed to build HTTP client")?;
    let manager = AuthenticationSessionManager::new(
        settings,
        Arc::new(http),
        store.clone(),
        Arc::new(SystemClock),
    );
    manager.set_observer(Arc::new(log_event));

    run(cli.command, &manager, store.as_ref()).await
}

/// Settings from files and environment, then command-line overrides.
fn load_settings(cli: &Cli) -> anyhow::Result<SessionSettings> {
    let mut loader = SettingsLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_file(path);
    }
    let mut settings = loader.load().context("failed to load settings")?;

    if let Some(scheme) = cli.scheme {
        settings.scheme = scheme;
    }
    if cli.insecure {
        settings.trust.force_trust = true;
    }
    if let Some(dir) = &cli.store_dir {
        settings.store_dir = Some(dir.clone());
    }
    Ok(settings)
}

fn log_event(event: &SessionEvent) {
    match event {
        SessionEvent::Started { attempt, address } => {
            tracing::info!(%attempt, %address, "login started");
        }
        SessionEvent::CookieSaved { attempt, address } => {
            tracing::debug!(%attempt, %address, "session cookies stored");
        }
        SessionEvent::Succeeded { attempt, address } => {
            tracing::info!(%attempt, %address, "login succeeded");
        }
        SessionEvent::Failed {
            attempt,
            address,
            error,
        } => {
            tracing::error!(%attempt, %address, %error, "login failed");
        }
    }
}

async fn run(
    command: Command,
    manager: &AuthenticationSessionManager,
    store: &dyn SessionCredentialStore,
) -> anyhow::Result<()> {
    match command {
        Command::Login {
            controller,
            username,
            password,
        } => {
            let session = manager
                .start_authentication(controller.as_str(), Credentials::new(username, password))
                .outcome()
                .await
                .with_context(|| format!("login to {controller} failed"))?;
            println!(
                "Authenticated with {} ({} cookie(s) stored)",
                session.address,
                session.cookies.len()
            );
        }
        Command::Headers { controller } => {
            manager.select_controller(controller.as_str());
            let headers = manager
                .auth_headers()
                .await
                .with_context(|| format!("no usable session for {controller}"))?;
            for (name, value) in headers.entries() {
                println!("{name}: {value}");
            }
        }
        Command::Logout { controller } => {
            manager.select_controller(controller.as_str());
            manager.end_session().await?;
            println!("Session for {controller} cleared");
        }
        Command::Status { controller } => {
            let addresses = match controller {
                Some(controller) => vec![ControllerAddress::new(controller)],
                None => store.addresses().await?,
            };
            if addresses.is_empty() {
                println!("No stored sessions");
            }
            for address in addresses {
                let state = manager.session_state(&address).await?;
                println!("{address}: {}", state.message());
            }
        }
        Command::Url { controller, path } => {
            manager.select_controller(controller.as_str());
            let url = match path {
                Some(path) => manager.service_url(&path),
                None => manager.base_url(),
            };
            if let Some(url) = url {
                println!("{url}");
            }
        }
        Command::Get { controller, path } => {
            manager.select_controller(controller.as_str());
            let response = manager.get(&path).await?;
            if !response.is_ok() {
                tracing::warn!(status = response.status, "controller returned an error status");
            }
            println!("{}", response.body);
        }
    }
    Ok(())
}

