pub mod analyze;
pub mod list;
pub mod techniques;
pub mod validate;

use colored::{ColoredString, Colorize};
use quota_optimiser::Level;

/// Colour a level the way every command prints it
pub fn format_level(level: Level) -> ColoredString {
    match level {
        Level::Low => level.as_str().green(),
        Level::Medium => level.as_str().yellow(),
        Level::High => level.as_str().red(),
    }
}
