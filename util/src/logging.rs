use env_logger::LogBuilder;
use error_chain::ChainedError;
use errors::*;
use std::env;

const LOG_CONFIG_VAR: &str = "RUST_LOG";

// Everything logs at info unless `RUST_LOG` says otherwise. Payload binaries write their results
// to stdout, so logs must go to stderr, which is where env_logger writes.
const DEFAULT_LOG_CONFIG: &str = "info";

fn log_config(env_value: Option<String>) -> String {
    match env_value {
        Some(ref config) if !config.trim().is_empty() => config.to_owned(),
        _ => DEFAULT_LOG_CONFIG.to_owned(),
    }
}

pub fn init_logger() -> Result<()> {
    let config = log_config(env::var(LOG_CONFIG_VAR).ok());

    LogBuilder::new()
        .parse(&config)
        .init()
        .chain_err(|| "Failed to build env_logger")?;
    Ok(())
}

/// Logs an error followed by every error in its chain, and its backtrace when one was captured.
pub fn output_error<E: ChainedError>(err: &E) {
    error!("{}", err);

    for cause in err.iter().skip(1) {
        error!("caused by: {}", cause);
    }

    if let Some(backtrace) = err.backtrace() {
        error!("backtrace: {:?}", backtrace);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_config_defaults_to_info() {
        assert_eq!("info", log_config(None));
        assert_eq!("info", log_config(Some("  ".to_owned())));
    }

    #[test]
    fn log_config_uses_environment_value() {
        assert_eq!(
            "movielens=debug",
            log_config(Some("movielens=debug".to_owned()))
        );
    }
}
