//! Static HTML training report.
use std::fs;
use std::path::Path;

use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::tracking::RunRecord;

const STYLE: &str = "
body { font-family: sans-serif; margin: 2em auto; max-width: 960px; color: #222; }
table { border-collapse: collapse; width: 100%; margin-bottom: 1em; }
th, td { border: 1px solid #ccc; padding: 6px 10px; text-align: left; }
th { background: #f0f0f0; }
tr.winner td { font-weight: bold; background: #eef7ee; }
.code-container {
    background-color: #f5f5f5;
    padding: 10px;
    border-radius: 5px;
    overflow-x: auto;
    font-family: monospace;
    white-space: pre-wrap;
}";

pub struct ReportSection {
    title: String,
    content: Vec<Markup>,
}

impl ReportSection {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            content: Vec::new(),
        }
    }

    pub fn add_content(&mut self, markup: Markup) {
        self.content.push(markup);
    }

    fn render(&self) -> Markup {
        html! {
            section {
                h2 { (self.title) }
                @for block in &self.content {
                    (block)
                }
            }
        }
    }
}

pub struct Report {
    title: String,
    subtitle: String,
    sections: Vec<ReportSection>,
}

impl Report {
    pub fn new(title: &str, subtitle: &str) -> Self {
        Self {
            title: title.to_string(),
            subtitle: subtitle.to_string(),
            sections: Vec::new(),
        }
    }

    pub fn add_section(&mut self, section: ReportSection) {
        self.sections.push(section);
    }

    pub fn render(&self) -> Markup {
        html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="utf-8";
                    title { (self.title) }
                    style { (PreEscaped(STYLE)) }
                }
                body {
                    h1 { (self.title) }
                    p { (self.subtitle) }
                    @for section in &self.sections {
                        (section.render())
                    }
                }
            }
        }
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
        }
        fs::write(path, self.render().into_string()).map_err(|e| PipelineError::io(path, e))
    }
}

fn fmt_score(score: Option<f64>) -> String {
    score.map_or_else(|| "failed".to_string(), |s| format!("{:.4}", s))
}

/// Build the report for one finished training run.
pub fn training_report(record: &RunRecord, config: &PipelineConfig) -> Result<Report> {
    let mut report = Report::new(
        "Credit Risk Training Report",
        &format!(
            "Experiment '{}', run {} ({})",
            record.experiment_name,
            record.run_id,
            record.timestamp.to_rfc3339()
        ),
    );

    let mut overview = ReportSection::new("Model selection");
    overview.add_content(html! {
        p {
            "Each family was searched with " (config.selection.cv_folds)
            "-fold stratified cross-validation on SMOTE-resampled training folds, scored by F1."
        }
        table {
            thead {
                tr { th { "Family" } th { "Best CV F1" } th { "Candidates" } th { "Failed" } th { "Best parameters" } }
            }
            tbody {
                @for family in &record.families {
                    tr class=[(family.best_params.as_ref() == Some(&record.winner)).then_some("winner")] {
                        td { (family.family) }
                        td { (fmt_score(family.best_f1)) }
                        td { (family.n_candidates) }
                        td { (family.n_failed) }
                        td {
                            @if let Some(params) = &family.best_params {
                                code { (format!("{:?}", params)) }
                            } @else {
                                "-"
                            }
                        }
                    }
                }
            }
        }
    });
    report.add_section(overview);

    let mut winner = ReportSection::new("Selected model");
    winner.add_content(html! {
        ul {
            li { "Family: " (record.winner.family()) }
            li { "Cross-validated F1: " (format!("{:.4}", record.cv_f1)) }
            li { "Test F1: " (format!("{:.4}", record.test_f1)) }
        }
    });
    report.add_section(winner);

    let config_json = serde_json::to_string_pretty(config).map_err(|source| {
        PipelineError::Serialization {
            path: config.paths.report.clone().unwrap_or_default(),
            source,
        }
    })?;
    let mut config_section = ReportSection::new("Configuration");
    config_section.add_content(html! {
        div class="code-container" {
            pre { code { (config_json) } }
        }
    });
    report.add_section(config_section);

    Ok(report)
}
