//! CLI output formatting tests.

#[cfg(test)]
mod text_formatter_tests {
    use super::super::json::{CheckOutput, SiteInfoOutput, SiteRunOutput};
    use super::super::text::TextFormatter;
    use jobscrape_core::SiteKind;
    use jobscrape_fetch::SessionStats;
    use jobscrape_sites::{HarvestReport, SiteRegistry};

    #[test]
    fn test_site_run_lines() {
        let mut run = SiteRunOutput::new(SiteKind::Agrilabour);
        run.harvest = Some(HarvestReport {
            discovered: 12,
            inserted: 3,
            skipped_existing: 8,
            failed: 1,
            ..HarvestReport::new(SiteKind::Agrilabour)
        });
        run.exported_rows = Some(40);

        let text = TextFormatter::new(false).format_site_run(&run);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "✓ agrilabour");
        assert!(lines[1].contains("12 discovered, 3 new, 8 known, 0 duplicate, 1 failed"));
        assert_eq!(lines[2], "  export    40 rows");
    }

    #[test]
    fn test_site_run_errors_marked() {
        let mut run = SiteRunOutput::named("all");
        run.errors.push("export: API error 403".into());

        let text = TextFormatter::new(false).format_site_run(&run);
        assert!(text.starts_with("✗ all"));
        assert!(text.contains("error     export: API error 403"));

        let colored = TextFormatter::new(true).format_site_run(&run);
        assert!(colored.contains("\x1b[31m"));
    }

    #[test]
    fn test_disabled_site_line() {
        let desc = SiteRegistry::get(SiteKind::Apgworkforce).unwrap();
        let line = TextFormatter::new(false).format_site_line(&SiteInfoOutput::new(desc, false, None));
        assert!(line.starts_with("apgworkforce"));
        assert!(line.contains("listing (paginated)"));
        assert!(line.ends_with("(disabled)"));
    }

    #[test]
    fn test_check_failure() {
        let check = CheckOutput {
            url: "https://example.com".into(),
            fetcher: "HTTP".into(),
            acquired: false,
            content_length: None,
            stats: SessionStats {
                fetches: 1,
                attempts: 5,
                resets: 5,
                exhausted: 1,
                pages: 0,
            },
            error: Some("page unavailable".into()),
        };

        let text = TextFormatter::new(false).format_check(&check);
        assert!(text.starts_with("✗ https://example.com via HTTP"));
        assert!(text.contains("attempts  5 (5 resets)"));
    }
}

#[cfg(test)]
mod json_formatter_tests {
    use super::super::json::{JsonFormatter, SiteInfoOutput, SiteRunOutput};
    use jobscrape_core::SiteKind;
    use jobscrape_sites::{ClassifyReport, SiteRegistry};

    #[test]
    fn test_site_run_json_omits_empty_phases() {
        let mut run = SiteRunOutput::new(SiteKind::WorkforceAustralia);
        run.classify = Some(ClassifyReport {
            examined: 4,
            skipped: 1,
            classified: 2,
            errors: 1,
        });

        let json = JsonFormatter::new(false).format(&run).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["site"], "workforceaustralia");
        assert_eq!(value["classify"]["classified"], 2);
        assert!(value.get("harvest").is_none());
        assert!(value.get("errors").is_none());
    }

    #[test]
    fn test_site_info_json() {
        let desc = SiteRegistry::get(SiteKind::WorkforceAustralia).unwrap();
        let json = JsonFormatter::new(true)
            .format(&SiteInfoOutput::new(desc, true, Some(7)))
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["cliName"], "workforceaustralia");
        assert_eq!(value["discovery"], "api");
        assert_eq!(value["stored"], 7);
        assert!(json.contains('\n'));
    }
}
