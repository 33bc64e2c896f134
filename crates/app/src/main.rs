//! Life OS command line client.

use std::sync::Arc;

use lifeos::LifeOs;
use lifeos::cli::{Cli, Command};
use lifeos_application::GatewayError;
use lifeos_application::ports::CredentialStore;
use lifeos_domain::{ApiRequest, ApiResponse, RegisterRequest, SessionEvent};
use lifeos_infrastructure::{FileCredentialStore, SettingsRepository};
use tokio::sync::broadcast;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so response bodies can be piped
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse_args();

    let settings = match &cli.settings {
        Some(path) => SettingsRepository::with_path(path),
        None => SettingsRepository::new(),
    }
    .load()
    .await?;

    let store: Arc<dyn CredentialStore> = Arc::new(match &cli.credentials {
        Some(path) => FileCredentialStore::open(path)?,
        None => FileCredentialStore::open_default()?,
    });

    tracing::debug!(base_url = %settings.base_url, "starting Life OS client v{}", env!("CARGO_PKG_VERSION"));

    let client = LifeOs::connect(settings, store)?;
    let mut events = client.events.subscribe();

    let outcome = run(&client, cli.command).await;
    report_events(&mut events);
    outcome
}

async fn run(client: &LifeOs, command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Login { username, password } => {
            client.session.login(&username, &password).await?;
            println!("Logged in as {username}");
        }
        Command::Register {
            username,
            email,
            password,
        } => {
            let request = RegisterRequest::new(username, email, password);
            if let Err(error) = client.session.register(&request).await {
                print_validation(&error);
                return Err(error.into());
            }
            println!("Account created, log in with `lifeos login`");
        }
        Command::Logout => {
            client.session.logout()?;
            println!("Logged out");
        }
        Command::Status => {
            println!("{}", client.session.status().display_message());
        }
        Command::Request {
            method,
            path,
            data,
            query,
        } => {
            let mut request = ApiRequest::new(method, path);
            for (name, value) in query {
                request = request.with_query(name, value);
            }
            if let Some(data) = data {
                request = request.with_json_value(serde_json::from_str(&data)?);
            }

            match client.gateway.execute(request).await {
                Ok(response) => print_response(&response),
                Err(error) => {
                    if let Some(response) = error.response() {
                        print_response(response);
                    }
                    return Err(error.into());
                }
            }
        }
    }
    Ok(())
}

fn print_response(response: &ApiResponse) {
    eprintln!("{}", response.status);
    match response.json::<serde_json::Value>() {
        Ok(serde_json::Value::Null) => {}
        Ok(value) => println!(
            "{}",
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| response.text())
        ),
        Err(_) => println!("{}", response.text()),
    }
}

fn print_validation(error: &GatewayError) {
    if let Some(errors) = error.validation_errors() {
        eprintln!("{}", errors.summary());
    }
}

fn report_events(events: &mut broadcast::Receiver<SessionEvent>) {
    while let Ok(event) = events.try_recv() {
        match (&event, event.redirect()) {
            (SessionEvent::Terminated { .. }, Some(route)) => {
                eprintln!("Session expired, please log in again ({route})");
            }
            (SessionEvent::TokenRefreshed { token_preview }, _) => {
                tracing::debug!(%token_preview, "access token renewed during request");
            }
            (_, route) => tracing::debug!(?event, ?route, "session event"),
        }
    }
}
