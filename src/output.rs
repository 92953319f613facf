//! Report rendering and ranking exports.
//!
//! Supports the HTML best/worst report, JSON and CSV.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use csv::WriterBuilder;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::ranking::{Extremes, RankingEntry, Rankings};

/// Template used when no template file can be read.
pub const DEFAULT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Airline punctuality report</title>
<style>
body { font-family: sans-serif; margin: 2em; }
.best { background: #e6f4ea; }
.worse { background: #fce8e6; }
</style>
</head>
<body>
<h1>Airline punctuality report</h1>
<p>Generated on {date} at {time}</p>
<div class="best">
<h2>Best airlines</h2>
<ol><li>{best_airlines}</li></ol>
<h2>Best flights</h2>
<ol><li>{best_flights}</li></ol>
</div>
<div class="worse">
<h2>Worst airlines</h2>
<ol><li>{worse_airlines}</li></ol>
<h2>Worst flights</h2>
<ol><li>{worse_flights}</li></ol>
</div>
</body>
</html>
"#;

/// Values substituted into the report template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub date: String,
    pub time: String,
    pub best_airlines: String,
    pub worse_airlines: String,
    pub best_flights: String,
    pub worse_flights: String,
}

impl Report {
    /// Renders the best and worst `n` airlines and flights of `rankings`.
    pub fn new(rankings: &Rankings, n: usize, generated_at: DateTime<Local>) -> Self {
        let airlines = rankings.airline_extremes(n);
        let flights = rankings.flight_extremes(n);

        Report {
            date: generated_at.format("%Y-%m-%d").to_string(),
            time: generated_at.format("%H:%M:%S").to_string(),
            best_airlines: render_ranking(&airlines.best),
            worse_airlines: render_ranking(&airlines.worst),
            best_flights: render_ranking(&flights.best),
            worse_flights: render_ranking(&flights.worst),
        }
    }

    /// Fills the `{date}`, `{time}`, `{best_airlines}`, `{worse_airlines}`,
    /// `{best_flights}` and `{worse_flights}` placeholders of `template`.
    pub fn render(&self, template: &str) -> String {
        [
            ("{date}", &self.date),
            ("{time}", &self.time),
            ("{best_airlines}", &self.best_airlines),
            ("{worse_airlines}", &self.worse_airlines),
            ("{best_flights}", &self.best_flights),
            ("{worse_flights}", &self.worse_flights),
        ]
        .into_iter()
        .fold(template.to_string(), |html, (key, value)| {
            html.replace(key, value)
        })
    }
}

/// Formats entries as HTML list items, without the outer `<li>` tags.
pub fn render_ranking(entries: &[RankingEntry]) -> String {
    entries
        .iter()
        .map(|e| {
            format!(
                "<b>{}</b> ({}%, avg={} min)",
                escape_html(&e.subject_id),
                e.percent_late,
                e.average_delay_minutes
            )
        })
        .collect::<Vec<_>>()
        .join("</li>\n<li>")
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Reads the report template, falling back to [`DEFAULT_TEMPLATE`].
pub fn load_template(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(template) => template,
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "Could not read report template, using built-in template"
            );
            DEFAULT_TEMPLATE.to_string()
        }
    }
}

/// Renders `report` into the template at `template_path` and writes it to
/// `output_path`.
#[tracing::instrument(skip_all, fields(template = %template_path.display(), output = %output_path.display()))]
pub fn write_report(report: &Report, template_path: &Path, output_path: &Path) -> Result<()> {
    let html = report.render(&load_template(template_path));

    fs::write(output_path, html)
        .with_context(|| format!("failed to write report `{}`", output_path.display()))?;

    info!("Report written");
    Ok(())
}

/// Logs rankings using Rust's debug pretty-print format.
pub fn print_pretty(rankings: &Rankings) {
    debug!("{:#?}", rankings);
}

/// Full rankings together with their best and worst `n` entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingExport<'a> {
    pub airlines: &'a [RankingEntry],
    pub flights: &'a [RankingEntry],
    pub airline_extremes: Extremes<RankingEntry>,
    pub flight_extremes: Extremes<RankingEntry>,
}

impl<'a> RankingExport<'a> {
    pub fn new(rankings: &'a Rankings, n: usize) -> Self {
        RankingExport {
            airlines: &rankings.airlines,
            flights: &rankings.flights,
            airline_extremes: rankings.airline_extremes(n),
            flight_extremes: rankings.flight_extremes(n),
        }
    }
}

/// Writes an export as pretty-printed JSON.
pub fn write_json<W: Write>(writer: W, export: &RankingExport<'_>) -> Result<()> {
    serde_json::to_writer_pretty(writer, export)?;
    Ok(())
}

#[derive(Serialize)]
struct CsvRow<'a> {
    kind: &'a str,
    subject_id: &'a str,
    percent_late: i64,
    average_delay_minutes: i64,
}

/// Writes an export to a CSV file, replacing any existing file.
///
/// Rows come in the order airlines, flights, best airlines, worst airlines,
/// best flights, worst flights, tagged by the `kind` column.
pub fn write_csv(path: &Path, export: &RankingExport<'_>) -> Result<()> {
    debug!(path = %path.display(), "Writing CSV rankings");

    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("failed to create `{}`", path.display()))?;

    let sections: [(&str, &[RankingEntry]); 6] = [
        ("airline", export.airlines),
        ("flight", export.flights),
        ("best_airline", export.airline_extremes.best.as_slice()),
        ("worst_airline", export.airline_extremes.worst.as_slice()),
        ("best_flight", export.flight_extremes.best.as_slice()),
        ("worst_flight", export.flight_extremes.worst.as_slice()),
    ];

    for (kind, entries) in sections {
        for entry in entries {
            writer.serialize(CsvRow {
                kind,
                subject_id: &entry.subject_id,
                percent_late: entry.percent_late,
                average_delay_minutes: entry.average_delay_minutes,
            })?;
        }
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::env;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(name)
    }

    fn entry(subject_id: &str, percent_late: i64, average_delay_minutes: i64) -> RankingEntry {
        RankingEntry {
            subject_id: subject_id.to_string(),
            percent_late,
            average_delay_minutes,
        }
    }

    fn sample_rankings() -> Rankings {
        Rankings {
            airlines: vec![
                entry("China Eastern Airlines", 50, 25),
                entry("Emirates Airlines", 100, 36),
            ],
            flights: vec![
                entry("MU553", 0, 10),
                entry("EK303", 100, 36),
                entry("MU219", 100, 40),
            ],
        }
    }

    fn generated_at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2015, 8, 20, 9, 5, 7).unwrap()
    }

    #[test]
    fn test_render_ranking() {
        let html = render_ranking(&[entry("MU553", 0, 10), entry("EK303", 100, 36)]);
        assert_eq!(
            html,
            "<b>MU553</b> (0%, avg=10 min)</li>\n<li><b>EK303</b> (100%, avg=36 min)"
        );
        assert_eq!(render_ranking(&[]), "");
    }

    #[test]
    fn test_render_ranking_escapes_names() {
        let html = render_ranking(&[entry("A&B <Air>", 0, 0)]);
        assert_eq!(html, "<b>A&amp;B &lt;Air&gt;</b> (0%, avg=0 min)");
    }

    #[test]
    fn test_report_fields() {
        let report = Report::new(&sample_rankings(), 1, generated_at());
        assert_eq!(report.date, "2015-08-20");
        assert_eq!(report.time, "09:05:07");
        assert_eq!(report.best_airlines, "<b>China Eastern Airlines</b> (50%, avg=25 min)");
        assert_eq!(report.worse_airlines, "<b>Emirates Airlines</b> (100%, avg=36 min)");
        assert_eq!(report.best_flights, "<b>MU553</b> (0%, avg=10 min)");
        assert_eq!(report.worse_flights, "<b>MU219</b> (100%, avg=40 min)");
    }

    #[test]
    fn test_render_template() {
        let report = Report::new(&sample_rankings(), 1, generated_at());
        let html = report.render("<p>{date} {time}</p><style>p { color: red; }</style><li>{worse_flights}</li>");
        assert_eq!(
            html,
            "<p>2015-08-20 09:05:07</p><style>p { color: red; }</style><li><b>MU219</b> (100%, avg=40 min)</li>"
        );
    }

    #[test]
    fn test_missing_template_falls_back() {
        let template = load_template(&temp_path("airline_rater_no_such_template.html"));
        assert_eq!(template, DEFAULT_TEMPLATE);
    }

    #[test]
    fn test_write_report() {
        let path = temp_path("airline_rater_test_report.html");
        let _ = fs::remove_file(&path);

        let report = Report::new(&sample_rankings(), 2, generated_at());
        write_report(&report, &temp_path("airline_rater_missing.html"), &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("<b>MU553</b> (0%, avg=10 min)"));
        assert!(content.contains("<b>Emirates Airlines</b> (100%, avg=36 min)"));
        assert!(!content.contains("{best_flights}"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&sample_rankings());
    }

    #[test]
    fn test_write_json() {
        let rankings = sample_rankings();
        let mut buf = Vec::new();
        write_json(&mut buf, &RankingExport::new(&rankings, 1)).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["airlines"][0]["subject_id"], "China Eastern Airlines");
        assert_eq!(value["flights"][2]["average_delay_minutes"], 40);
        assert_eq!(value["airline_extremes"]["best"][0]["subject_id"], "China Eastern Airlines");
        assert_eq!(value["flight_extremes"]["worst"][0]["subject_id"], "MU219");
        assert_eq!(value["flight_extremes"]["worst"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_export_without_extremes() {
        let rankings = sample_rankings();
        let export = RankingExport::new(&rankings, 0);
        assert_eq!(export.flights.len(), 3);
        assert!(export.airline_extremes.best.is_empty());
        assert!(export.flight_extremes.worst.is_empty());
    }

    #[test]
    fn test_write_csv() {
        let path = temp_path("airline_rater_test_rankings.csv");
        let _ = fs::remove_file(&path);

        let rankings = sample_rankings();
        write_csv(&path, &RankingExport::new(&rankings, 1)).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        // 1 header + 2 airlines + 3 flights + 4 extremes
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0], "kind,subject_id,percent_late,average_delay_minutes");
        assert_eq!(lines[1], "airline,China Eastern Airlines,50,25");
        assert_eq!(lines[5], "flight,MU219,100,40");
        assert_eq!(lines[6], "best_airline,China Eastern Airlines,50,25");
        assert_eq!(lines[7], "worst_airline,Emirates Airlines,100,36");
        assert_eq!(lines[8], "best_flight,MU553,0,10");
        assert_eq!(lines[9], "worst_flight,MU219,100,40");

        fs::remove_file(&path).unwrap();
    }
}
