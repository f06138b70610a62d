use replykit_core::config::{AppConfig, LoadOptions, LogFormat};

use crate::commands::CommandResult;

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let payload = serde_json::json!({
        "command": "config",
        "status": "ok",
        "config": {
            "database": {
                "url": config.database.url,
                "max_connections": config.database.max_connections,
                "timeout_secs": config.database.timeout_secs,
            },
            "seeder": {
                "max_keyword_fragments": config.seeder.max_keyword_fragments,
            },
            "logging": {
                "level": config.logging.level,
                "format": format_name(config.logging.format),
            },
        },
    });

    CommandResult { exit_code: 0, output: payload.to_string() }
}

fn format_name(format: LogFormat) -> &'static str {
    match format {
        LogFormat::Compact => "compact",
        LogFormat::Pretty => "pretty",
        LogFormat::Json => "json",
    }
}
