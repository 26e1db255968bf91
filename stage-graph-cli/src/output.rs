// Output formatting helpers for CLI commands

use stage_graph::Stage;

/// Print a status message: "  Status message"
pub fn status(action: &str, message: &str) {
    eprintln!("\x1b[1;36m{:>12}\x1b[0m {}", action, message);
}

/// Print a success message with checkmark
pub fn success(message: &str) {
    eprintln!("\x1b[1;32m  \u{2713}\x1b[0m {}", message);
}

/// Print a failure message with X
pub fn failure(message: &str) {
    eprintln!("\x1b[1;31m  \u{2717}\x1b[0m {}", message);
}

/// Print a check/pass item
pub fn check(message: &str) {
    eprintln!("\x1b[32m  \u{2713}\x1b[0m {}", message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("\x1b[1;31merror:\x1b[0m {}", message);
}

/// Print an info message
pub fn info(message: &str) {
    eprintln!("\x1b[36m  i\x1b[0m {}", message);
}

/// Print a header line
pub fn header(message: &str) {
    println!("\x1b[1m==> {}\x1b[0m", message);
}

/// One stage per line: refId, name, type, id
pub fn stage_line(indent: usize, stage: &Stage) {
    println!(
        "{:indent$}{:<6} {} \x1b[2m({}, {})\x1b[0m",
        "",
        stage.ref_id().unwrap_or("-"),
        stage.name(),
        stage.stage_type(),
        stage.id(),
        indent = indent
    );
}
