use anyhow::{Context, Result};
use portfolio_history_core::models::settings::Settings;

/// Load settings from `config/default.toml`, `config/local.toml` and
/// `PORTFOLIO__*` environment variables, later sources winning.
/// Fields nobody sets keep their [`Settings::default`] value.
pub fn load_settings() -> Result<Settings> {
    dotenv::dotenv().ok();

    let cfg = config::Config::builder()
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        .add_source(
            config::File::with_name("config/local")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        .add_source(
            config::Environment::with_prefix("PORTFOLIO")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("providers")
                .try_parsing(true),
        )
        .build()
        .context("reading configuration")?;

    cfg.try_deserialize::<Settings>()
        .context("invalid configuration")
}
