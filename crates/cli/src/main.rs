use std::process::ExitCode;

fn main() -> ExitCode {
    replykit_cli::run()
}
