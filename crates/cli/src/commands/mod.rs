pub mod config;
pub mod migrate;
pub mod seed;

use replykit_core::config::AppConfig;

/// Machine-readable command envelope printed to stdout.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = serde_json::json!({
            "command": command,
            "status": "ok",
            "message": message.into(),
        });
        Self { exit_code: 0, output: payload.to_string() }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = serde_json::json!({
            "command": command,
            "status": "error",
            "error_class": error_class,
            "message": message.into(),
        });
        Self { exit_code, output: payload.to_string() }
    }
}

pub(crate) fn init_logging(config: &AppConfig) {
    use replykit_core::config::LogFormat;
    use tracing::Level;

    let level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt().with_target(false).with_max_level(level);

    // try_init: a second command in the same process keeps the first
    // subscriber.
    let _ = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::CommandResult;

    #[test]
    fn success_envelope_is_machine_readable() {
        let result = CommandResult::success("seed", "2 organizations seeded");
        assert_eq!(result.exit_code, 0);

        let parsed: serde_json::Value =
            serde_json::from_str(&result.output).expect("envelope is JSON");
        assert_eq!(parsed["command"], "seed");
        assert_eq!(parsed["status"], "ok");
        assert_eq!(parsed["message"], "2 organizations seeded");
    }

    #[test]
    fn failure_envelope_carries_class_and_exit_code() {
        let result = CommandResult::failure("seed", "db_connectivity", "pool closed", 4);
        assert_eq!(result.exit_code, 4);

        let parsed: serde_json::Value =
            serde_json::from_str(&result.output).expect("envelope is JSON");
        assert_eq!(parsed["status"], "error");
        assert_eq!(parsed["error_class"], "db_connectivity");
    }
}
