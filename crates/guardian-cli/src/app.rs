//! Command dispatch.
//!
//! Every page command is resolved to a `Route` and goes through the
//! `AuthGate` before anything is fetched.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::{debug, info, warn};

use guardian_core::models::{ClientDraft, PolicyDraft};
use guardian_core::views::{
    filter_clients, greeting, ClientDetails, Dashboard, DashboardTab, LoadState,
    PolicyFormOptions,
};
use guardian_core::{
    ApiClient, AuthGate, Claims, Config, GateDecision, Route, SessionManager, SessionStatus,
};

use crate::commands::{read_json, Command, USAGE};
use crate::display;

/// Environment variable supplying the login username
const USERNAME_ENV: &str = "GUARDIAN_USERNAME";

/// Environment variable supplying the login password
const PASSWORD_ENV: &str = "GUARDIAN_PASSWORD";

pub struct App {
    config: Config,
    session: Arc<SessionManager>,
    gate: AuthGate,
    api: ApiClient,
}

fn ready<T>(state: LoadState<T>) -> Result<T> {
    match state {
        LoadState::Ready(value) => Ok(value),
        LoadState::Failed(message) => Err(anyhow!(message)),
        LoadState::Loading => Err(anyhow!("Still loading")),
    }
}

impl App {
    pub fn new(config: Config, session: Arc<SessionManager>, api: ApiClient) -> Self {
        let gate = AuthGate::new(session.clone());
        Self {
            config,
            session,
            gate,
            api,
        }
    }

    pub async fn run(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Help => {
                print!("{}", USAGE);
                Ok(())
            }
            Command::Login { username } => self.login(username).await,
            Command::Open(Route::Login) => self.login(None).await,
            Command::Logout => {
                self.session.logout();
                println!("Logged out.");
                Ok(())
            }
            Command::WhoAmI => self.whoami().await,
            page => self.show(page).await,
        }
    }

    /// Run a page command if the gate lets it through.
    async fn show(&self, command: Command) -> Result<()> {
        let route = command.route();
        let claims = match self.gate.guard(&route, |claims| claims.cloned()) {
            GateDecision::Render(claims) => claims,
            GateDecision::Redirect(to) => {
                debug!(from = %route, to = %to, "Redirected by auth gate");
                return Err(anyhow!(
                    "Not logged in. Run `guardian login` to open {}",
                    route
                ));
            }
            GateDecision::Loading => return Err(anyhow!("Session is still being restored")),
        };

        match command {
            Command::Dashboard { upcoming } => {
                let tab = if upcoming { DashboardTab::Upcoming } else { DashboardTab::All };
                self.dashboard(claims.as_ref(), tab).await
            }
            Command::Alerts => {
                let view = ready(Dashboard::load(&self.api, self.session.today()).await)?;
                display::alerts(&view.alerts());
                Ok(())
            }
            Command::Clients { search } => self.clients(search.as_deref()).await,
            Command::Client(id) => self.client(id).await,
            Command::Policy(id) => {
                display::policy(&self.api.fetch_policy(id).await?);
                Ok(())
            }
            Command::Carriers => {
                display::carriers(&self.api.fetch_carriers().await?);
                Ok(())
            }
            Command::AddClient(json) => {
                let draft: ClientDraft = read_json(&json)?;
                let client = self.api.create_client(&draft).await?;
                println!("Created client #{}: {}", client.id, client.display_name());
                Ok(())
            }
            Command::EditClient(id, json) => {
                let draft: ClientDraft = read_json(&json)?;
                let client = self.api.update_client(id, &draft).await?;
                println!("Updated client #{}: {}", client.id, client.display_name());
                Ok(())
            }
            Command::AddPolicy(json) => {
                let draft: PolicyDraft = read_json(&json)?;
                self.check_policy(&draft).await?;
                let policy = self.api.create_policy(&draft).await?;
                println!("Created policy #{}: {}", policy.id, policy.policy_number);
                Ok(())
            }
            Command::EditPolicy(id, json) => {
                let draft: PolicyDraft = read_json(&json)?;
                self.check_policy(&draft).await?;
                let policy = self.api.update_policy(id, &draft).await?;
                println!("Updated policy #{}: {}", policy.id, policy.policy_number);
                Ok(())
            }
            Command::Open(route) => self.open(&route, claims.as_ref()).await,
            Command::Help | Command::Login { .. } | Command::Logout | Command::WhoAmI => Ok(()),
        }
    }

    async fn open(&self, route: &Route, claims: Option<&Claims>) -> Result<()> {
        match route {
            Route::Login => {
                if let Some(claims) = claims {
                    println!("Already logged in as {}", claims.display_name());
                }
                Ok(())
            }
            Route::Dashboard => self.dashboard(claims, DashboardTab::All).await,
            Route::Clients => self.clients(None).await,
            Route::ClientDetails(id) => self.client(*id).await,
            Route::ClientAdd => {
                println!("New client fields (pass to `guardian add-client`):");
                println!("{}", serde_json::to_string_pretty(&ClientDraft::default())?);
                Ok(())
            }
            Route::PolicyAdd => {
                let options = ready(PolicyFormOptions::load(&self.api).await)?;
                display::policy_form(&options);
                Ok(())
            }
            Route::PolicyDetails(id) => {
                display::policy(&self.api.fetch_policy(*id).await?);
                Ok(())
            }
        }
    }

    async fn dashboard(&self, claims: Option<&Claims>, tab: DashboardTab) -> Result<()> {
        let view = ready(Dashboard::load(&self.api, self.session.today()).await)?;
        let hello = claims.map(greeting).unwrap_or_default();
        display::dashboard(&hello, &view, tab);
        Ok(())
    }

    async fn clients(&self, search: Option<&str>) -> Result<()> {
        let clients = self.api.fetch_clients().await?;
        display::clients(&filter_clients(&clients, search.unwrap_or_default()));
        Ok(())
    }

    async fn client(&self, id: i64) -> Result<()> {
        let details = ready(ClientDetails::load(&self.api, id).await)?;
        display::client_details(&details);
        Ok(())
    }

    async fn check_policy(&self, draft: &PolicyDraft) -> Result<()> {
        let options = ready(PolicyFormOptions::load(&self.api).await)?;
        options.check(draft)?;
        Ok(())
    }

    async fn login(&mut self, username: Option<String>) -> Result<()> {
        let username = match username
            .or_else(|| std::env::var(USERNAME_ENV).ok())
            .or_else(|| self.config.last_username.clone())
        {
            Some(username) => username,
            None => prompt_username()?,
        };
        let password = match std::env::var(PASSWORD_ENV) {
            Ok(password) => password,
            Err(_) => rpassword::prompt_password("Password: ")?,
        };

        let mut events = self.session.events();
        let claims = self.session.login(&self.api, &username, &password).await?;
        info!(subject = %claims.subject, "Logged in");

        self.config.last_username = Some(username);
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        println!("Login successful!\n");
        let destination = match events.try_recv() {
            Ok(event) => event.destination(),
            Err(_) => Route::Dashboard,
        };
        self.show(Command::Open(destination)).await
    }

    async fn whoami(&self) -> Result<()> {
        let session = self.session.validate();
        match (session.status(), session.identity()) {
            (SessionStatus::Authenticated, Some(claims)) => {
                println!("Logged in as {}", claims.display_name());
                println!(
                    "Token expires in {} minutes",
                    claims.minutes_until_expiry(self.session.now())
                );
                match self.api.fetch_profile().await {
                    Ok(profile) => {
                        println!("Email:      {}", profile.email);
                        if !profile.agent_code.is_empty() {
                            println!("Agent code: {}", profile.agent_code);
                        }
                        if profile.is_agency_admin {
                            println!("Agency administrator");
                        }
                    }
                    Err(e) => warn!(error = %e, "Failed to fetch profile"),
                }
            }
            _ => println!("Not logged in."),
        }
        Ok(())
    }
}

fn prompt_username() -> Result<String> {
    print!("Username: ");
    io::stdout().flush()?;

    let mut username = String::new();
    io::stdin().read_line(&mut username)?;
    Ok(username.trim().to_string())
}
