use std::process::ExitCode;

use tracing::{error, info, warn};

use dnswatch_logging::config::LogConfig;
use dnswatch_logging::logging::{ExecutionContext, LogDestination, LoggingContext};
use dnswatch_logging::notice;

fn main() -> ExitCode {
    let logging = LoggingContext::new();

    // A broken config file must not keep the daemon from logging
    let (config, config_error) = match LogConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (LogConfig::default(), Some(e)),
    };

    // Console first, so failures below have somewhere to go
    logging.init_console(config.verbosity());

    let context = ExecutionContext::detect();
    let destinations =
        match logging.init_with_backup(&config, context, config.backup_on_start) {
            Ok(destinations) => destinations,
            Err(e) => {
                logging.main().load().in_scope(|| error!("{}", e));
                return ExitCode::from(e.exit_code());
            }
        };

    let logger = logging.main().load();
    logger.in_scope(|| {
        if let Some(e) = &config_error {
            warn!("using default logging config: {:#}", e);
        }
        for destination in &destinations {
            if let LogDestination::File { path, .. } = destination {
                info!("Logging to: {}", path.display());
            }
        }
        notice!(
            "logging initialized ({:?}, level {})",
            context,
            logging.level()
        );
    });

    ExitCode::SUCCESS
}
