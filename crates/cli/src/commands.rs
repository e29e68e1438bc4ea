//! CLI commands

use anyhow::{Result, bail};
use clap::Subcommand;
use singularity_core::{
    AuthResult, FileStorage, InvalidationReason, LoginCredentials, Registration, User, UserClass,
};
use singularity_http::SessionManager;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config;

#[derive(Subcommand)]
pub enum Commands {
    /// Log in with email and password
    Login {
        #[arg(long)]
        email: String,

        #[arg(long, env = "SINGULARITY_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and log in
    Register {
        #[arg(long)]
        username: String,

        #[arg(long)]
        email: String,

        #[arg(long, env = "SINGULARITY_PASSWORD", hide_env_values = true)]
        password: String,

        #[arg(long)]
        full_name: String,

        /// Character class (warrior, mage, rogue, cleric)
        #[arg(long, default_value_t = UserClass::Warrior)]
        class: UserClass,
    },

    /// Show the logged-in user
    Me,

    /// Forget the stored session
    Logout,

    /// Show what is stored for the current session
    Status,
}

impl Commands {
    pub async fn execute(self, data_dir: Option<PathBuf>) -> Result<()> {
        let data_dir = config::data_dir(data_dir);
        let client_config = config::load_client_config(&data_dir)?;
        let storage = FileStorage::new(data_dir.join(config::SESSION_FILE));
        debug!(path = %storage.path().display(), base_url = %client_config.base_url, "Using session file");

        let manager = SessionManager::new(&client_config, Arc::new(storage))?;
        self.run(&manager).await
    }

    async fn run(self, manager: &SessionManager) -> Result<()> {
        match self {
            Commands::Login { email, password } => {
                let result = manager
                    .login(&LoginCredentials::new(email, password))
                    .await;
                report(result)
            }
            Commands::Register {
                username,
                email,
                password,
                full_name,
                class,
            } => {
                let registration = Registration {
                    username,
                    email,
                    password,
                    full_name,
                    user_class: class,
                };
                report(manager.register(&registration).await)
            }
            Commands::Me => {
                let mut events = manager.subscribe();
                match manager.current_user().await {
                    Ok(user) => {
                        print_user(&user);
                        Ok(())
                    }
                    Err(e) => {
                        if let Ok(event) = events.try_recv() {
                            bail!("{} Run `singularity login`.", reason_message(event.reason));
                        }
                        Err(e.into())
                    }
                }
            }
            Commands::Logout => {
                manager.logout()?;
                info!("Session cleared");
                println!("Logged out");
                Ok(())
            }
            Commands::Status => {
                let session = manager.session();
                let refresh = if session.refresh_token.is_some() {
                    "present"
                } else {
                    "absent"
                };
                println!("Refresh token: {refresh}");

                match session.expires_at {
                    Some(expires_at) => {
                        let state = if manager.store().is_token_expired() {
                            "expired"
                        } else {
                            "valid"
                        };
                        println!("Access token expiry: {} ({state})", expires_at.to_rfc3339());
                    }
                    None => println!("Access token expiry: none"),
                }
                Ok(())
            }
        }
    }
}

fn report(result: AuthResult) -> Result<()> {
    if !result.success {
        bail!(
            result
                .error
                .unwrap_or_else(|| "Authentication failed".to_string())
        );
    }

    match result.user {
        Some(user) => println!("Logged in as {}", user.username),
        None => println!("Logged in"),
    }
    Ok(())
}

fn reason_message(reason: InvalidationReason) -> &'static str {
    match reason {
        InvalidationReason::RefreshFailed => "Your session has expired.",
        InvalidationReason::Unauthorized => "The server rejected your session.",
    }
}

fn print_user(user: &User) {
    let attributes = user.attributes_or_default();
    println!("{} ({})", user.username, user.full_name);
    println!("Email:      {}", user.email);
    println!("Class:      {}", user.user_class);
    println!("Level:      {} ({} xp)", user.level, user.experience);
    println!(
        "Attributes: strength {}, agility {}, vitality {}",
        attributes.strength, attributes.agility, attributes.vitality
    );
    println!("Joined:     {}", user.created_at.format("%Y-%m-%d"));
}
