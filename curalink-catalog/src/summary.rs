//! Plain-text "Medical Research Summary" export of selected favorites.
use crate::types::SearchResults;
use std::fmt::Write;

pub const SUMMARY_TITLE: &str = "CuraLink - Medical Research Summary";
pub const SUMMARY_FILE_NAME: &str = "medical-research-summary.txt";

fn heading(out: &mut String, title: &str, first: bool) {
    if !first {
        out.push('\n');
    }
    out.push_str(title);
    out.push('\n');
    out.push_str(&"=".repeat(50));
    out.push_str("\n\n");
}

/// Render the export. Empty sections are left out entirely.
pub fn render_summary(selection: &SearchResults) -> String {
    let mut out = format!("{SUMMARY_TITLE}\n\n");
    let mut first = true;

    if !selection.researchers.is_empty() {
        heading(&mut out, "HEALTH EXPERTS", first);
        first = false;
        for r in &selection.researchers {
            let _ = write!(
                out,
                "{}\nInstitution: {}\nSpecialty: {}\nLocation: {}\n\n",
                r.name, r.institution, r.specialty, r.location
            );
        }
    }

    if !selection.publications.is_empty() {
        heading(&mut out, "RELEVANT PUBLICATIONS", first);
        first = false;
        for p in &selection.publications {
            let _ = write!(out, "{}\n{}\n{}, {}\n\n", p.title, p.authors, p.journal, p.date);
        }
    }

    if !selection.trials.is_empty() {
        heading(&mut out, "CLINICAL TRIALS", first);
        for t in &selection.trials {
            let _ = write!(
                out,
                "{}\nID: {}\nStatus: {} | Phase: {}\nLocation: {}\n\n",
                t.title, t.id, t.status, t.phase, t.location
            );
        }
    }

    out
}
