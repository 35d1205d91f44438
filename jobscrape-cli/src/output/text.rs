//! Text output formatting.

use super::json::{CheckOutput, SiteInfoOutput, SiteRunOutput};

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn status(&self, ok: bool) -> String {
        if ok {
            self.paint(GREEN, "✓")
        } else {
            self.paint(RED, "✗")
        }
    }

    /// Formats the outcome of one site's run.
    pub fn format_site_run(&self, run: &SiteRunOutput) -> String {
        let mut lines = vec![format!(
            "{} {}",
            self.status(!run.has_errors()),
            self.paint(BOLD, &run.site)
        )];

        if let Some(h) = &run.harvest {
            lines.push(format!(
                "  harvest   {} discovered, {} new, {} known, {} duplicate, {} failed",
                h.discovered, h.inserted, h.skipped_existing, h.duplicates, h.failed
            ));
            if h.listing_failures > 0 {
                lines.push(self.paint(
                    YELLOW,
                    &format!("            {} listing page(s) unavailable", h.listing_failures),
                ));
            }
        }
        if let Some(s) = &run.acquisition {
            lines.push(self.paint(
                DIM,
                &format!(
                    "  fetch     {} calls, {} attempts, {} resets, {} exhausted",
                    s.fetches, s.attempts, s.resets, s.exhausted
                ),
            ));
        }
        if let Some(c) = &run.classify {
            lines.push(format!(
                "  classify  {} labelled, {} errors, {} already done",
                c.classified, c.errors, c.skipped
            ));
        }
        if let Some(rows) = run.exported_rows {
            lines.push(format!("  export    {rows} rows"));
        }
        for error in &run.errors {
            lines.push(self.paint(RED, &format!("  error     {error}")));
        }

        lines.join("\n")
    }

    /// Header for the sites listing.
    pub fn format_sites_header(&self) -> String {
        self.paint(
            BOLD,
            &format!(
                "{:<20} {:<28} {:<8} {:<20} {:>7}",
                "NAME", "SITE", "FETCHER", "DISCOVERY", "STORED"
            ),
        )
    }

    /// One line of the sites listing.
    pub fn format_site_line(&self, site: &SiteInfoOutput) -> String {
        let stored = site
            .stored
            .map_or_else(|| "-".to_string(), |n| n.to_string());
        let line = format!(
            "{:<20} {:<28} {:<8} {:<20} {:>7}",
            site.cli_name, site.display_name, site.fetcher, site.discovery, stored
        );
        if site.enabled {
            line
        } else {
            self.paint(DIM, &format!("{line}  (disabled)"))
        }
    }

    /// Formats a URL probe.
    pub fn format_check(&self, check: &CheckOutput) -> String {
        let mut lines = vec![format!(
            "{} {} via {}",
            self.status(check.acquired),
            check.url,
            check.fetcher
        )];

        if let Some(len) = check.content_length {
            lines.push(format!("  content   {len} chars"));
        }
        lines.push(self.paint(
            DIM,
            &format!(
                "  attempts  {} ({} resets)",
                check.stats.attempts, check.stats.resets
            ),
        ));
        if let Some(error) = &check.error {
            lines.push(self.paint(RED, &format!("  error     {error}")));
        }

        lines.join("\n")
    }
}
