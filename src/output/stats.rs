//! Crawl summary reporting.

use console::style;

use crate::crawl::CrawlSummary;

/// Print the end-of-crawl summary to stderr.
pub fn print_crawl_summary(summary: &CrawlSummary) {
    let reason = if summary.reason.is_success() {
        style(summary.reason.to_string()).green()
    } else {
        style(summary.reason.to_string()).red()
    };

    eprintln!();
    eprintln!(
        "{}",
        style(format!("Summary for {}:", summary.user)).bold()
    );
    eprintln!("  Items:    {} emitted", summary.items_emitted);
    if summary.items_skipped > 0 {
        eprintln!("  Skipped:  {} (no id)", summary.items_skipped);
    }
    eprintln!("  Pages:    {}", summary.pages_fetched);
    eprintln!("  Tokens:   {} acquired", summary.token_refreshes);
    eprintln!("  Stopped:  {}", reason);
    eprintln!("  Elapsed:  {}s", summary.elapsed().num_seconds());
}
