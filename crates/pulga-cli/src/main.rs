//! `pulga`: command-line client for the PulgaShop marketplace API.
//!
//! # Usage
//!
//! ```
//! pulga rut check 12.345.678-5
//! pulga normalize users dump.json
//! pulga --url http://localhost:3000 login admin@demo.local
//! pulga users list --search 12345678
//! pulga --config ~/.config/pulga/config.toml roles
//! ```

mod client;
mod commands;
mod session_file;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use commands::NormalizeKind;
use pulga_core::{
  rut,
  session::SessionStore,
  validate::{AccreditationForm, ProfileForm, RegisterForm, UserForm},
};
use serde::Deserialize;
use session_file::FileSessionStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://localhost:3000";
const DEFAULT_SESSION_PATH: &str = "~/.pulga/session.json";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "pulga", version, about = "Command-line client for the PulgaShop API")]
struct Args {
  /// Path to a TOML config file (url, session).
  #[arg(short, long, value_name = "FILE", global = true)]
  config: Option<PathBuf>,

  /// Base URL of the PulgaShop API (default: http://localhost:3000).
  #[arg(long, env = "PULGA_URL", global = true)]
  url: Option<String>,

  /// Where the login session is kept (default: ~/.pulga/session.json).
  #[arg(long, env = "PULGA_SESSION", value_name = "FILE", global = true)]
  session: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Offline RUT helpers.
  Rut {
    #[command(subcommand)]
    action: RutAction,
  },

  /// Normalize a JSON payload read from FILE (or stdin) and print it.
  Normalize {
    #[arg(value_enum)]
    kind: NormalizeKind,
    file: Option<PathBuf>,
  },

  /// Log in and store the session.
  Login {
    email:    String,
    /// Read from stdin when omitted.
    #[arg(long, env = "PULGA_PASSWORD", hide_env_values = true)]
    password: Option<String>,
  },

  /// Create an account.
  Register {
    #[arg(long)]
    rut:          String,
    #[arg(long)]
    name:         String,
    #[arg(long)]
    last_name:    String,
    #[arg(long)]
    email:        String,
    /// Read from stdin (twice) when omitted.
    #[arg(long, env = "PULGA_PASSWORD", hide_env_values = true)]
    password:     Option<String>,
    /// Defaults to --password.
    #[arg(long)]
    repeat:       Option<String>,
    #[arg(long)]
    accept_terms: bool,
  },

  /// Ask for a password reset email.
  ResetPassword { email: String },

  /// Forget the stored session.
  Logout,

  /// Show the logged-in user.
  Whoami,

  /// Edit your own account and profile.
  Profile {
    #[command(subcommand)]
    action: ProfileAction,
  },

  /// Administer users (admin only).
  Users {
    #[command(subcommand)]
    action: UsersAction,
  },

  /// Show the role catalog.
  Roles,

  /// Vendor accreditation requests.
  Vendor {
    #[command(subcommand)]
    action: VendorAction,
  },
}

#[derive(Subcommand, Debug)]
enum RutAction {
  /// Strip everything but digits, `-` and `K`.
  Sanitise { value: String },
  /// Print the canonical `12345678-9` form.
  Normalise { value: String },
  /// Print the dotted `12.345.678-9` form.
  Format { value: String },
  /// Report format validity and the check digit verdict.
  Check { value: String },
}

#[derive(Subcommand, Debug)]
enum ProfileAction {
  /// Change the given fields; everything else is left as is.
  Update {
    #[arg(long)]
    name:      Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    email:     Option<String>,
    #[arg(long)]
    phone:     Option<String>,
    #[arg(long)]
    bio:       Option<String>,
    /// Photo URL.
    #[arg(long)]
    photo:     Option<String>,
    /// New password; must be confirmed with --repeat.
    #[arg(long, default_value = "")]
    password:  String,
    #[arg(long, default_value = "")]
    repeat:    String,
  },
}

#[derive(Subcommand, Debug)]
enum UsersAction {
  /// List users, optionally filtered like the admin search box.
  List {
    #[arg(long)]
    search: Option<String>,
  },
  /// Delete a user by id.
  Delete { id: String },
  /// Create a user, or update one when --id is given.
  Save {
    #[arg(long)]
    id:        Option<String>,
    #[arg(long)]
    name:      String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    email:     String,
    #[arg(long, default_value = "")]
    rut:       String,
    /// Repeatable.
    #[arg(long = "role", required = true)]
    roles:     Vec<String>,
    /// Required when creating; leave out to keep the current one.
    #[arg(long, default_value = "")]
    password:  String,
  },
}

#[derive(Subcommand, Debug)]
enum VendorAction {
  /// Apply for vendor accreditation.
  Request {
    #[arg(long)]
    store_name:     String,
    #[arg(long)]
    contact_number: String,
    #[arg(long)]
    company_rut:    String,
  },
  /// List accreditation requests (admin only).
  List,
  /// Delete an accreditation request (admin only).
  Delete { id: String },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default, Debug, PartialEq)]
struct ConfigFile {
  #[serde(default)]
  url:     String,
  #[serde(default)]
  session: String,
}

#[derive(Debug, PartialEq)]
struct Settings {
  base_url:     String,
  session_path: PathBuf,
}

/// Flags (and their env fallbacks) override the config file, which overrides
/// the defaults.
fn resolve_settings(
  url: Option<String>,
  session: Option<PathBuf>,
  file: ConfigFile,
) -> Settings {
  Settings {
    base_url:     url
      .or_else(|| (!file.url.is_empty()).then(|| file.url.clone()))
      .unwrap_or_else(|| DEFAULT_URL.to_string()),
    session_path: session
      .or_else(|| (!file.session.is_empty()).then(|| PathBuf::from(&file.session)))
      .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_PATH)),
  }
}

fn load_config_file(path: Option<&std::path::Path>) -> Result<ConfigFile> {
  let Some(path) = path else {
    return Ok(ConfigFile::default());
  };
  let raw = std::fs::read_to_string(path)
    .with_context(|| format!("reading config file {}", path.display()))?;
  toml::from_str(&raw).context("parsing config file")
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  // Offline subcommands need neither config nor session.
  match &args.command {
    Command::Rut { action } => return run_rut(action),
    Command::Normalize { kind, file } => {
      let body = commands::read_input(file.as_deref())?;
      return commands::print_json(&commands::normalize(*kind, &body)?);
    }
    _ => {}
  }

  let file_cfg = load_config_file(args.config.as_deref())?;
  let settings = resolve_settings(args.url, args.session, file_cfg);
  tracing::debug!(?settings, "resolved settings");

  let store = FileSessionStore::new(settings.session_path);
  let session = store.get()?;
  let client = ApiClient::new(ApiConfig {
    base_url: settings.base_url,
    token:    session.bearer_token().map(str::to_string),
  })?;

  match args.command {
    Command::Rut { .. } | Command::Normalize { .. } => Ok(()),

    Command::Login { email, password } => {
      let password = match password {
        Some(p) => p,
        None => commands::prompt_line("Password: ")?,
      };
      commands::login(&client, &store, email, password).await
    }
    Command::Register {
      rut,
      name,
      last_name,
      email,
      password,
      repeat,
      accept_terms,
    } => {
      let (password, repeat) = match password {
        Some(p) => {
          let repeat = repeat.unwrap_or_else(|| p.clone());
          (p, repeat)
        }
        None => (
          commands::prompt_line("Password: ")?,
          commands::prompt_line("Repeat password: ")?,
        ),
      };
      let form = RegisterForm {
        rut,
        name,
        last_name,
        email,
        password,
        repeat,
        terms_accepted: accept_terms,
      };
      commands::register(&client, &store, form).await
    }
    Command::ResetPassword { email } => commands::reset_password(&client, &email).await,
    Command::Logout => commands::logout(&store),
    Command::Whoami => commands::whoami(&client, &session).await,

    Command::Profile {
      action:
        ProfileAction::Update {
          name,
          last_name,
          email,
          phone,
          bio,
          photo,
          password,
          repeat,
        },
    } => {
      let form = ProfileForm {
        name,
        last_name,
        email,
        phone,
        bio,
        photo,
        password,
        repeat,
      };
      commands::profile_update(&client, &store, &session, form).await
    }

    Command::Users { action } => match action {
      UsersAction::List { search } => {
        commands::users_list(&client, &session, search.as_deref()).await
      }
      UsersAction::Delete { id } => commands::users_delete(&client, &session, &id).await,
      UsersAction::Save {
        id,
        name,
        last_name,
        email,
        rut,
        roles,
        password,
      } => {
        let form = UserForm {
          id,
          name,
          last_name,
          email,
          rut,
          roles,
          password,
        };
        commands::users_save(&client, &session, form).await
      }
    },

    Command::Roles => commands::roles(&client).await,

    Command::Vendor { action } => match action {
      VendorAction::Request {
        store_name,
        contact_number,
        company_rut,
      } => {
        let form = AccreditationForm {
          store_name,
          contact_number,
          company_rut,
        };
        commands::vendor_request(&client, &session, form).await
      }
      VendorAction::List => commands::vendor_list(&client, &session).await,
      VendorAction::Delete { id } => commands::vendor_delete(&client, &session, &id).await,
    },
  }
}

fn run_rut(action: &RutAction) -> Result<()> {
  match action {
    RutAction::Sanitise { value } => println!("{}", rut::sanitise_rut_input(value)),
    RutAction::Normalise { value } => println!("{}", rut::normalise_rut(value)),
    RutAction::Format { value } => println!("{}", rut::format_rut(value)),
    RutAction::Check { value } => commands::print_json(&commands::rut_report(value))?,
  }
  Ok(())
}
