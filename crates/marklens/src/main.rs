#![forbid(unsafe_code)]

//! marklens binary entry point.

use std::io;

use marklens::app::{App, AppConfig, Clock};
use marklens::cli::Opts;
use marklens::clipboard::Clipboard;
use marklens::logging;
use marklens::runtime::{Program, ProgramConfig};
use marklens::session::{SessionOptions, TerminalSession};

fn main() {
    let opts = Opts::parse();

    if let Err(e) = logging::init(opts.log_file.as_deref()) {
        eprintln!("Failed to open log file: {e}");
        std::process::exit(1);
    }

    let session = match TerminalSession::new(SessionOptions {
        alternate_screen: true,
        mouse_capture: opts.mouse,
    }) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Failed to initialize terminal: {e}");
            std::process::exit(1);
        }
    };

    let model = App::new(AppConfig::from_opts(&opts), Clock::system());
    let config = ProgramConfig {
        hyperlinks: opts.hyperlinks,
        ..ProgramConfig::default()
    };
    let result = Program::new(model, session, io::stdout(), Clipboard::detect(), config)
        .and_then(|mut program| program.run());
    if let Err(e) = result {
        eprintln!("Runtime error: {e}");
        std::process::exit(1);
    }
}
