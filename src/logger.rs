//! Terminal logging with colored module prefixes.
//!
//! # Usage
//! ```ignore
//! log!("build"; "merged {} templates", count);
//! ```

use colored::{ColoredString, Colorize};

/// Log a message with a colored module prefix.
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a message with a colored `[module]` prefix.
pub fn log(module: &str, message: &str) {
    println!("{} {message}", colorize_prefix(module));
}

/// Apply color to a module prefix based on module type.
#[inline]
fn colorize_prefix(module: &str) -> ColoredString {
    let prefix = format!("[{module}]");
    match module {
        "check" => prefix.bright_blue().bold(),
        "error" => prefix.bright_red().bold(),
        _ => prefix.bright_yellow().bold(),
    }
}
