use rocket::figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::Deserialize;

#[derive(Deserialize, Clone)]
pub struct AppConfig {
    #[serde(alias = "DATABASE_URL")]
    pub database_url: String,
    #[serde(alias = "ADMIN_PASSWORD_HASH")]
    pub admin_password_hash: String,
    /// Comma-separated emails allowed into the admin area.
    #[serde(default, alias = "ALLOWED_ADMINS")]
    pub allowed_admins: String,
    #[serde(default = "default_rocket_port", alias = "ROCKET_PORT")]
    pub rocket_port: u16,
}

fn default_rocket_port() -> u16 {
    8000
}

impl AppConfig {
    pub fn load() -> Self {
        Figment::new()
            .merge(Toml::file("Config.toml"))
            .merge(Toml::file("../Config.toml"))
            .merge(Env::raw().only(&[
                "DATABASE_URL",
                "ADMIN_PASSWORD_HASH",
                "ALLOWED_ADMINS",
                "ROCKET_PORT",
            ]))
            .extract()
            .expect(
                "Failed to load configuration. Ensure Config.toml exists or environment \
                 variables are set (DATABASE_URL, ADMIN_PASSWORD_HASH, ALLOWED_ADMINS).",
            )
    }

    /// The allow-list as configured, order preserved, blanks dropped.
    pub fn allowed_admin_list(&self) -> Vec<String> {
        self.allowed_admins
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(admins: &str) -> AppConfig {
        AppConfig {
            database_url: String::new(),
            admin_password_hash: String::new(),
            allowed_admins: admins.to_string(),
            rocket_port: 8000,
        }
    }

    #[test]
    fn allow_list_splits_and_trims() {
        let list = config(" a@x.com , b@x.com,,c@x.com ").allowed_admin_list();
        assert_eq!(list, vec!["a@x.com", "b@x.com", "c@x.com"]);
    }

    #[test]
    fn empty_allow_list_is_empty() {
        assert!(config("").allowed_admin_list().is_empty());
    }
}
