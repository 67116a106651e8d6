use std::env;

use config::Config;
use dotenvy::dotenv;

use backoffice_console::models::config::{AppEnv, ServerConfig};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    // Select config profile (defaults to `local`).
    let app_env = match env::var("APP_ENV").unwrap_or_default().parse::<AppEnv>() {
        Ok(app_env) => app_env,
        Err(err) => {
            log::error!("{err}");
            std::process::exit(1);
        }
    };

    let settings = Config::builder()
        // Add `./config/default.yaml`
        .add_source(config::File::with_name("config/default"))
        // Add environment-specific overrides
        .add_source(config::File::with_name(&format!("config/{}", app_env.as_str())).required(false))
        // Add settings from the environment (with a prefix of APP)
        .add_source(config::Environment::with_prefix("APP"))
        .set_override("app_env", app_env.as_str())
        .and_then(|builder| builder.build());

    let settings = match settings {
        Ok(settings) => settings,
        Err(err) => {
            log::error!("Error loading settings: {}", err);
            std::process::exit(1);
        }
    };

    let server_config = match settings.try_deserialize::<ServerConfig>() {
        Ok(server_config) => server_config,
        Err(err) => {
            log::error!("Error loading server config: {}", err);
            std::process::exit(1);
        }
    };

    let server_config = match server_config
        .with_backend_overrides(
            env::var("BACKEND_BASE_URL_LOCAL").ok(),
            env::var("BACKEND_BASE_URL_DEV").ok(),
        )
        .validated()
    {
        Ok(server_config) => server_config,
        Err(err) => {
            log::error!("Invalid server config: {err}");
            std::process::exit(1);
        }
    };

    backoffice_console::run(server_config).await
}
