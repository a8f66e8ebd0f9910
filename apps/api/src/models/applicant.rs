#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicantRow {
    pub id: Uuid,
    /// Shared identifier tying this row to its semantic document.
    pub link_id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub linked_in: Option<String>,
    pub git_repo: Option<String>,
    pub years_of_experience: Option<f64>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EducationRow {
    pub id: i64,
    pub applicant_id: Uuid,
    pub degree: Option<String>,
    pub institution: Option<String>,
    pub year: Option<String>,
    pub gpa: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExperiencedSkillRow {
    pub id: i64,
    pub applicant_id: Uuid,
    pub skill: String,
    pub years_of_experience: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkExperienceRow {
    pub id: i64,
    pub applicant_id: Uuid,
    pub company: Option<String>,
    pub position: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProjectRow {
    pub id: i64,
    pub applicant_id: Uuid,
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
}

/// One applicant with all child collections loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicantRecord {
    pub applicant: ApplicantRow,
    pub educations: Vec<EducationRow>,
    pub experienced_skills: Vec<ExperiencedSkillRow>,
    pub work_experiences: Vec<WorkExperienceRow>,
    pub projects: Vec<ProjectRow>,
}

/// Input shape for insert/replace: scalar fields plus child collections,
/// before any identifiers are assigned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewApplicant {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub linked_in: Option<String>,
    pub git_repo: Option<String>,
    pub years_of_experience: Option<f64>,
    pub educations: Vec<NewEducation>,
    pub experienced_skills: Vec<NewExperiencedSkill>,
    pub work_experiences: Vec<NewWorkExperience>,
    pub projects: Vec<NewProject>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewEducation {
    pub degree: Option<String>,
    pub institution: Option<String>,
    pub year: Option<String>,
    pub gpa: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExperiencedSkill {
    pub skill: String,
    pub years_of_experience: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewWorkExperience {
    pub company: Option<String>,
    pub position: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewProject {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
}
