//! Sample records served by the mock index.
use crate::types::{ClinicalTrial, Publication, Researcher};

fn researcher(
    id: &str,
    name: &str,
    specialty: &str,
    match_score: u8,
    publications: u32,
    interests: &[&str],
) -> Researcher {
    Researcher {
        id: id.into(),
        name: name.into(),
        institution: "Toronto Western Hospital".into(),
        specialty: specialty.into(),
        location: "Toronto, Canada".into(),
        match_score: Some(match_score),
        publications: Some(publications),
        research_interests: interests.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn researchers() -> Vec<Researcher> {
    vec![
        researcher(
            "1",
            "Dr. Alfonso Fasano",
            "Movement Disorders",
            95,
            234,
            &["Deep Brain Stimulation", "Parkinson's Disease", "Movement Disorders"],
        ),
        researcher(
            "2",
            "Dr. Renato Munhoz",
            "Parkinson's Disease",
            92,
            189,
            &["Parkinson's Disease", "Neurology", "Clinical Trials"],
        ),
        researcher(
            "3",
            "Dr. Anthony Lang",
            "Neurology",
            88,
            412,
            &["Movement Disorders", "Neurodegenerative Diseases"],
        ),
    ]
}

fn publication(id: &str, title: &str, authors: &str, journal: &str, date: &str, summary: &str) -> Publication {
    Publication {
        id: id.into(),
        title: title.into(),
        authors: authors.into(),
        journal: journal.into(),
        date: date.into(),
        r#abstract: Some(summary.into()),
        url: Some("https://scholar.google.com".into()),
    }
}

pub fn publications() -> Vec<Publication> {
    vec![
        publication(
            "1",
            "Advances in Deep Brain Stimulation for Parkinson's Disease: A Comprehensive Review",
            "Fasano A, Lang AE, et al.",
            "Nature Neuroscience",
            "2025-01",
            "This comprehensive review examines recent advances in deep brain stimulation techniques for Parkinson's disease treatment...",
        ),
        publication(
            "2",
            "Long-term Outcomes of Movement Disorder Treatment in Clinical Practice",
            "Munhoz RP, Teive HA, et al.",
            "The Lancet Neurology",
            "2024-12",
            "A longitudinal study examining the long-term efficacy and safety of various movement disorder treatments...",
        ),
        publication(
            "3",
            "Stem Cell Therapy in Parkinson's Disease: Current State and Future Directions",
            "Lang AE, Kalia LV, et al.",
            "Cell Stem Cell",
            "2024-11",
            "An overview of current stem cell therapy approaches for Parkinson's disease and potential future developments...",
        ),
    ]
}

struct TrialRow<'a> {
    id: &'a str,
    title: &'a str,
    status: &'a str,
    phase: &'a str,
    condition: &'a str,
    description: &'a str,
    eligibility: &'a str,
}

impl From<TrialRow<'_>> for ClinicalTrial {
    fn from(row: TrialRow<'_>) -> Self {
        ClinicalTrial {
            id: row.id.into(),
            title: row.title.into(),
            status: row.status.into(),
            phase: row.phase.into(),
            location: "Toronto, Canada".into(),
            condition: row.condition.into(),
            description: row.description.into(),
            eligibility: Some(row.eligibility.into()),
            url: Some("https://clinicaltrials.gov".into()),
        }
    }
}

pub fn clinical_trials() -> Vec<ClinicalTrial> {
    [
        TrialRow {
            id: "NCT05123456",
            title: "Deep Brain Stimulation for Advanced Parkinson's Disease",
            status: "Recruiting",
            phase: "Phase 3",
            condition: "Parkinson's Disease",
            description: "This study evaluates the efficacy of deep brain stimulation in patients with advanced Parkinson's disease who have motor fluctuations.",
            eligibility: "Ages 18-75, diagnosed with Parkinson's disease for at least 5 years",
        },
        TrialRow {
            id: "NCT05123457",
            title: "Novel Immunotherapy for Multiple System Atrophy",
            status: "Recruiting",
            phase: "Phase 2",
            condition: "Multiple System Atrophy",
            description: "A clinical trial investigating a new immunotherapy approach for treating multiple system atrophy.",
            eligibility: "Ages 40-80, diagnosed with MSA within the last 3 years",
        },
        TrialRow {
            id: "NCT05123458",
            title: "Freezing of Gait Treatment Study in Parkinson's Patients",
            status: "Active, not recruiting",
            phase: "Phase 2",
            condition: "Parkinson's Disease",
            description: "Examining novel therapeutic approaches for freezing of gait in Parkinson's disease patients.",
            eligibility: "Ages 50-85, experiencing freezing of gait episodes",
        },
    ]
    .into_iter()
    .map(ClinicalTrial::from)
    .collect()
}
