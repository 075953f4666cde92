use colored::Colorize;
use reconcile::{FileConflict, Resolution};

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print one resolved conflict
pub fn conflict(conflict: &FileConflict) {
    let (mark, outcome) = match conflict.resolution {
        Resolution::Overwritten => ("!".red().bold(), "candidate wins, yours saved as .glold"),
        Resolution::UserPreserved => ("~".yellow().bold(), "yours kept, candidate saved as .glnew"),
    };
    println!(
        "  {} {} {}",
        mark,
        conflict.path,
        format!(
            "(user {}, update {}: {})",
            conflict.user, conflict.update, outcome
        )
        .dimmed()
    );
}

/// Truncate a path string for display, keeping the end
pub fn truncate_path(path: &str, max_len: usize) -> String {
    if path.len() <= max_len {
        path.to_string()
    } else if max_len <= 3 {
        "...".to_string()
    } else {
        let cut = path.len() - max_len + 3;
        let start = (cut..path.len())
            .find(|i| path.is_char_boundary(*i))
            .unwrap_or(path.len());
        format!("...{}", &path[start..])
    }
}
