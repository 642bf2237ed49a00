use std::env;

/// Environment configuration
/// Loads and validates environment variables
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub public_host: String,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL must be set".to_string())?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| "JWT_SECRET must be set".to_string())?;

        // Host prefix for the activation / password-set links put into emails.
        let public_host =
            env::var("PUBLIC_HOST").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        Ok(Self {
            database_url,
            jwt_secret,
            public_host,
            bind_addr,
        })
    }
}
