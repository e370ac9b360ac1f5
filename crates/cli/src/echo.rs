use std::path::Path;

use owo_colors::OwoColorize;
use zenn_migrate_core::MigrationSummary;

use crate::VERSION;

/// Print a styled banner
pub fn print_banner() {
    eprintln!(
        "\n{} {} {}",
        "zenn-migrate".bold().bright_blue(),
        "v".dimmed(),
        VERSION.dimmed()
    );
    eprintln!("{}", "Export Zenn articles to local Markdown files\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message.bright_red());
}

/// Print the final tally and the manual migration note
pub fn print_summary(summary: &MigrationSummary, output_dir: &Path) {
    eprintln!("\n{}", "═".repeat(60).dimmed());
    print_success("Migration completed!");
    eprintln!("   {}", summary.bright_white());
    eprintln!("   {} {}", "Output:".dimmed(), output_dir.display().bright_white());

    if !summary.failed_slugs.is_empty() {
        print_warning(&format!("Not migrated: {}", summary.failed_slugs.join(", ")));
    }

    eprintln!("{}", "═".repeat(60).dimmed());
    eprintln!("\nNote: Due to Zenn's protection, some articles may need manual migration.");
    eprintln!("Please check the Zenn dashboard and manually export any missing articles.");
}
