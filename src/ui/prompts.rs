// UI prompts and user interaction module

use colored::Colorize;
use std::io::{self, Write};

/// Ask user for confirmation, retrying on IO errors
///
/// # Returns
/// * `Ok(true)` - User confirmed (y/yes)
/// * `Ok(false)` - User declined (n/no or any other input)
/// * `Err` - IO error after max attempts
pub fn read_confirmation(prompt: &str, max_attempts: u32) -> anyhow::Result<bool> {
    let max_attempts = max_attempts.max(1);
    for attempt in 1..=max_attempts {
        print!("{}", prompt.white().bold());
        io::stdout().flush()?;

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(_) => return Ok(is_yes(&input)),
            Err(e) if attempt < max_attempts => {
                println!(
                    "{}",
                    format!(
                        "Error reading input (attempt {}/{}): {}",
                        attempt, max_attempts, e
                    )
                    .yellow()
                );
                println!("{}", "Retrying...".dimmed());
            }
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Failed to read confirmation after {} attempts: {}",
                    max_attempts,
                    e
                ));
            }
        }
    }
    Ok(false)
}

fn is_yes(input: &str) -> bool {
    let response = input.trim().to_lowercase();
    response == "y" || response == "yes"
}

/// Display a warning message
pub fn warn(message: &str) {
    println!("{}", format!("⚠️  Warning: {}", message).yellow().bold());
}

/// Display an info message
pub fn info(message: &str) {
    println!("{}", message.cyan());
}

/// Display a success message
pub fn success(message: &str) {
    println!("{}", message.green().bold());
}

/// Display an error message
pub fn error(message: &str) {
    eprintln!("{}", message.red().bold());
}

/// Display a dimmed/secondary message
pub fn dimmed(message: &str) {
    println!("{}", message.dimmed());
}
