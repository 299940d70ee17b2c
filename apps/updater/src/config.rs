use clap::Parser;

use marketsync_core::errors::ConfigError;

/// Positional fallback for the database credentials, used when the
/// environment does not provide a complete set.
#[derive(Parser, Debug, Default)]
#[command(name = "marketsync-updater", about = "Sync market quotes and price history into the datastore")]
pub struct Cli {
    /// Database URL, e.g. jdbc:mariadb://host:3306/finance
    pub db_url: Option<String>,
    /// Database user
    pub db_user: Option<String>,
    /// Database password
    pub db_password: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_url: String,
    pub db_user: String,
    pub db_password: String,
}

/// One place credentials can come from. Sources are queried in priority
/// order and the first complete set wins; partial sets never mix.
trait CredentialsSource {
    fn resolve(&self) -> Option<Config>;
}

/// `DB_URL` / `DB_USER` / `DB_PASSWORD` environment variables
struct EnvSource;

impl CredentialsSource for EnvSource {
    fn resolve(&self) -> Option<Config> {
        Some(Config {
            db_url: std::env::var("DB_URL").ok()?,
            db_user: std::env::var("DB_USER").ok()?,
            db_password: std::env::var("DB_PASSWORD").ok()?,
        })
    }
}

/// Positional command-line arguments, in url/user/password order
struct ArgsSource<'a>(&'a Cli);

impl CredentialsSource for ArgsSource<'_> {
    fn resolve(&self) -> Option<Config> {
        Some(Config {
            db_url: self.0.db_url.clone()?,
            db_user: self.0.db_user.clone()?,
            db_password: self.0.db_password.clone()?,
        })
    }
}

impl Config {
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        resolve(&[&EnvSource, &ArgsSource(cli)])
    }
}

fn resolve(sources: &[&dyn CredentialsSource]) -> Result<Config, ConfigError> {
    sources
        .iter()
        .find_map(|source| source.resolve())
        .ok_or(ConfigError::MissingCredentials)
}
