//! Terminal formatting for catalog entities.
use curalink_catalog::forum::ForumPost;
use curalink_catalog::{ClinicalTrial, Publication, Researcher};
use curalink_store::{FavoriteCategory, FavoritesSet, Profile};
use std::fmt::Write;

fn marker(favorites: &FavoritesSet, category: FavoriteCategory, id: &str) -> &'static str {
    if favorites.contains(category, id) { "[*]" } else { "[ ]" }
}

pub fn researcher(r: &Researcher, favorites: &FavoritesSet) -> String {
    let mut line = format!(
        "{} {:<4} {} - {}, {} ({})",
        marker(favorites, FavoriteCategory::Researchers, &r.id),
        r.id,
        r.name,
        r.specialty,
        r.institution,
        r.location
    );
    if let Some(score) = r.match_score {
        let _ = write!(line, " | match {score}%");
    }
    if let Some(count) = r.publications {
        let _ = write!(line, " | {count} publications");
    }
    if !r.research_interests.is_empty() {
        let _ = write!(line, "\n         interests: {}", r.research_interests.join(", "));
    }
    line
}

pub fn publication(p: &Publication, favorites: &FavoritesSet) -> String {
    let mut line = format!(
        "{} {:<4} {}\n         {} - {}, {}",
        marker(favorites, FavoriteCategory::Publications, &p.id),
        p.id,
        p.title,
        p.authors,
        p.journal,
        p.date
    );
    if let Some(url) = &p.url {
        let _ = write!(line, "\n         {url}");
    }
    line
}

pub fn trial(t: &ClinicalTrial, favorites: &FavoritesSet) -> String {
    let mut line = format!(
        "{} {} {}\n         {} | {} | {} | {}",
        marker(favorites, FavoriteCategory::Trials, &t.id),
        t.id,
        t.title,
        t.status,
        t.phase,
        t.condition,
        t.location
    );
    if let Some(eligibility) = &t.eligibility {
        let _ = write!(line, "\n         eligibility: {eligibility}");
    }
    line
}

pub fn forum_post(p: &ForumPost) -> String {
    format!(
        "[{}] {}\n    {} ({}) | {} replies | {}\n    {}",
        p.category, p.title, p.author, p.author_type, p.replies, p.date, p.content
    )
}

pub fn profile(p: &Profile) -> String {
    match p {
        Profile::Patient(pt) => {
            let mut out = format!(
                "Account:   patient\nName:      {}\nCondition: {}\nLocation:  {}",
                pt.name, pt.disease, pt.location
            );
            if !pt.additional_info.trim().is_empty() {
                let _ = write!(out, "\nNotes:     {}", pt.additional_info);
            }
            out
        }
        Profile::Researcher(r) => {
            let mut out = format!(
                "Account:     researcher\nName:        {}\nInstitution: {}\nSpecialties: {}\nInterests:   {}\nLocation:    {}",
                r.name, r.institution, r.specialties, r.research_interests, r.location
            );
            if !r.orcid.trim().is_empty() {
                let _ = write!(out, "\nORCID:       {}", r.orcid);
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curalink_catalog::data;

    #[test]
    fn favorites_are_starred() {
        let mut favorites = FavoritesSet::default();
        favorites.toggle(FavoriteCategory::Trials, "NCT05123456");
        let trials = data::clinical_trials();
        assert!(trial(&trials[0], &favorites).starts_with("[*] NCT05123456"));
        assert!(trial(&trials[1], &favorites).starts_with("[ ] NCT05123457"));
    }

    #[test]
    fn researcher_line_shows_score_and_interests() {
        let line = researcher(&data::researchers()[0], &FavoritesSet::default());
        assert!(line.contains("match 95%"));
        assert!(line.contains("interests: Deep Brain Stimulation"));
    }
}
