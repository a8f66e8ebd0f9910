//! Record mapping — projects an [`ExtractionRecord`] into the canonical
//! relational shape plus the narrative text used for semantic indexing.

use crate::extraction::protocol::{
    round_to_half, ExtractionRecord, ProjectEntry, WorkExperienceEntry,
};
use crate::models::applicant::{
    NewApplicant, NewEducation, NewExperiencedSkill, NewProject, NewWorkExperience,
};

/// A canonical applicant plus the synthesized narrative. The narrative is
/// only ever used for semantic indexing, never as a source of structured
/// fields.
#[derive(Debug, Clone)]
pub struct MappedApplicant {
    pub applicant: NewApplicant,
    pub narrative: String,
}

pub fn map_record(record: &ExtractionRecord) -> MappedApplicant {
    let applicant = NewApplicant {
        name: record.name.clone(),
        email: record.email.clone(),
        phone: record.phone.clone(),
        address: record.address.clone(),
        linked_in: record.linked_in.clone(),
        git_repo: record.git_repo.clone(),
        // Re-rounded here as well; idempotent with the parse-time rounding.
        years_of_experience: record.total_years_of_experience.map(round_to_half),
        educations: record
            .educations
            .iter()
            .map(|e| NewEducation {
                degree: e.degree.clone(),
                institution: e.institution.clone(),
                year: e.year.clone(),
                gpa: e.gpa.clone(),
            })
            .collect(),
        // Entries without a numeric YoE are dropped, not demoted to skills.
        experienced_skills: record
            .experienced_skills
            .iter()
            .filter_map(|e| {
                e.years_of_experience.map(|years| NewExperiencedSkill {
                    skill: e.skill.clone(),
                    years_of_experience: round_to_half(years),
                })
            })
            .collect(),
        work_experiences: record
            .work_experiences
            .iter()
            .map(|w| NewWorkExperience {
                company: w.company.clone(),
                position: w.position.clone(),
                start_date: w.start_date,
                end_date: w.end_date,
                description: w.description.clone(),
            })
            .collect(),
        projects: record
            .projects
            .iter()
            .map(|p| NewProject {
                name: p.name.clone(),
                start_date: p.start_date,
                end_date: p.end_date,
                description: p.description.clone(),
            })
            .collect(),
    };

    MappedApplicant {
        applicant,
        narrative: synthesize_narrative(record),
    }
}

/// Builds the free-text profile indexed by the vector store: address line,
/// then Skills, Work Experiences, and Projects sections in that fixed
/// order. A section is omitted when its source is empty.
fn synthesize_narrative(record: &ExtractionRecord) -> String {
    let mut sections = Vec::new();

    if let Some(address) = &record.address {
        sections.push(format!("Address: {address}"));
    }

    if !record.skills.is_empty() {
        sections.push(format!("Skills: \n{}", record.skills.join(", ")));
    }

    if !record.work_experiences.is_empty() {
        let lines: Vec<String> = record
            .work_experiences
            .iter()
            .map(summarize_work_experience)
            .collect();
        sections.push(format!("Work Experiences: \n{}", lines.join("\n")));
    }

    if !record.projects.is_empty() {
        let lines: Vec<String> = record.projects.iter().map(summarize_project).collect();
        sections.push(format!("Projects: \n{}", lines.join("\n")));
    }

    sections.join("\n\n")
}

fn summarize_work_experience(entry: &WorkExperienceEntry) -> String {
    let mut line = match (&entry.position, &entry.company) {
        (Some(position), Some(company)) => format!("{position} at {company}"),
        (Some(position), None) => position.clone(),
        (None, Some(company)) => company.clone(),
        (None, None) => "Work experience".to_string(),
    };
    if let Some(range) = format_date_range(entry.start_date, entry.end_date) {
        line.push_str(&format!(" ({range})"));
    }
    if let Some(description) = &entry.description {
        line.push_str(": ");
        line.push_str(description);
    }
    line
}

fn summarize_project(entry: &ProjectEntry) -> String {
    let mut line = entry.name.clone().unwrap_or_else(|| "Project".to_string());
    if let Some(range) = format_date_range(entry.start_date, entry.end_date) {
        line.push_str(&format!(" ({range})"));
    }
    if let Some(description) = &entry.description {
        line.push_str(": ");
        line.push_str(description);
    }
    line
}

fn format_date_range(
    start: Option<chrono::NaiveDate>,
    end: Option<chrono::NaiveDate>,
) -> Option<String> {
    let start = start?;
    let start = start.format("%b %Y");
    Some(match end {
        Some(end) => format!("{start} - {}", end.format("%b %Y")),
        None => format!("{start} - present"),
    })
}
