//! Command-line argument parsing.

use anyhow::{anyhow, bail, Context, Result};
use guardian_core::Route;

pub const USAGE: &str = "\
Usage: guardian <command> [args]

Session:
  login [username]           Log in (password from GUARDIAN_PASSWORD or prompt)
  logout                     Forget the stored token
  whoami                     Show the current session

Pages (require a session):
  dashboard [--upcoming]     Policies, or renewals due within 30 days
  alerts                     Policies at a 90/60/30 day renewal milestone
  clients [search]           List clients, optionally filtered by name or email
  client <id>                A client and their policies
  policy <id>                One policy
  carriers                   Insurance carriers
  add-client <json|@file>    Create a client
  edit-client <id> <json|@file>
  add-policy <json|@file>    Create a policy
  edit-policy <id> <json|@file>
  open <path>                Open a page by path, e.g. /clients/3

Set RUST_LOG=debug for diagnostics.
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Login { username: Option<String> },
    Logout,
    WhoAmI,
    Dashboard { upcoming: bool },
    Alerts,
    Clients { search: Option<String> },
    Client(i64),
    Policy(i64),
    Carriers,
    AddClient(String),
    EditClient(i64, String),
    AddPolicy(String),
    EditPolicy(i64, String),
    Open(Route),
}

impl Command {
    pub fn parse(args: &[String]) -> Result<Self> {
        let Some((name, rest)) = args.split_first() else {
            return Ok(Command::Help);
        };
        let rest: Vec<&str> = rest.iter().map(String::as_str).collect();

        let command = match (name.as_str(), rest.as_slice()) {
            ("help" | "--help" | "-h", _) => Command::Help,
            ("login", []) => Command::Login { username: None },
            ("login", [username]) => Command::Login {
                username: Some(username.to_string()),
            },
            ("logout", []) => Command::Logout,
            ("whoami", []) => Command::WhoAmI,
            ("dashboard", []) => Command::Dashboard { upcoming: false },
            ("dashboard", ["--upcoming"]) => Command::Dashboard { upcoming: true },
            ("alerts", []) => Command::Alerts,
            ("clients", []) => Command::Clients { search: None },
            ("clients", terms) => Command::Clients {
                search: Some(terms.join(" ")),
            },
            ("client", [id]) => Command::Client(parse_id(id)?),
            ("policy", [id]) => Command::Policy(parse_id(id)?),
            ("carriers", []) => Command::Carriers,
            ("add-client", [json]) => Command::AddClient(json.to_string()),
            ("edit-client", [id, json]) => Command::EditClient(parse_id(id)?, json.to_string()),
            ("add-policy", [json]) => Command::AddPolicy(json.to_string()),
            ("edit-policy", [id, json]) => Command::EditPolicy(parse_id(id)?, json.to_string()),
            ("open", [path]) => Command::Open(path.parse()?),
            (other, _) => bail!("Unknown command or wrong arguments: {}\n\n{}", other, USAGE),
        };
        Ok(command)
    }

    /// The page this command shows. Session commands live on the login page.
    pub fn route(&self) -> Route {
        match self {
            Command::Help | Command::Login { .. } | Command::Logout | Command::WhoAmI => {
                Route::Login
            }
            Command::Dashboard { .. } | Command::Alerts => Route::Dashboard,
            Command::Clients { .. } => Route::Clients,
            Command::Client(id) | Command::EditClient(id, _) => Route::ClientDetails(*id),
            Command::Policy(id) | Command::EditPolicy(id, _) => Route::PolicyDetails(*id),
            Command::Carriers | Command::AddPolicy(_) => Route::PolicyAdd,
            Command::AddClient(_) => Route::ClientAdd,
            Command::Open(route) => route.clone(),
        }
    }
}

fn parse_id(raw: &str) -> Result<i64> {
    raw.parse()
        .map_err(|_| anyhow!("Expected a numeric id, got {:?}", raw))
}

/// Read a JSON argument, either inline or from `@path`.
pub fn read_json<T: serde::de::DeserializeOwned>(arg: &str) -> Result<T> {
    let text = match arg.strip_prefix('@') {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?
        }
        None => arg.to_string(),
    };
    serde_json::from_str(&text).context("Invalid JSON")
}
