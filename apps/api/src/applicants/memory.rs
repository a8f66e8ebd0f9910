//! In-memory [`RelationalStore`] used by the controller and search tests.
//! Mirrors the Postgres semantics: cascade deletes, wholesale child
//! replacement, inclusive skill minimums, last-updated-desc default order.

use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::applicants::search::SearchQuery;
use crate::applicants::store::{OrderBy, RelationalStore};
use crate::models::applicant::{
    ApplicantRecord, ApplicantRow, EducationRow, ExperiencedSkillRow, NewApplicant, ProjectRow,
    WorkExperienceRow,
};

pub struct InMemoryRelationalStore {
    records: Mutex<Vec<ApplicantRecord>>,
    next_child_id: Mutex<i64>,
}

impl InMemoryRelationalStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            next_child_id: Mutex::new(1),
        }
    }

    fn child_id(&self) -> i64 {
        let mut next = self.next_child_id.lock().unwrap();
        let id = *next;
        *next += 1;
        id
    }

    fn materialize(&self, id: Uuid, link_id: Uuid, applicant: &NewApplicant) -> ApplicantRecord {
        ApplicantRecord {
            applicant: ApplicantRow {
                id,
                link_id,
                name: applicant.name.clone(),
                email: applicant.email.clone(),
                phone: applicant.phone.clone(),
                address: applicant.address.clone(),
                linked_in: applicant.linked_in.clone(),
                git_repo: applicant.git_repo.clone(),
                years_of_experience: applicant.years_of_experience,
                last_updated: Utc::now(),
            },
            educations: applicant
                .educations
                .iter()
                .map(|e| EducationRow {
                    id: self.child_id(),
                    applicant_id: id,
                    degree: e.degree.clone(),
                    institution: e.institution.clone(),
                    year: e.year.clone(),
                    gpa: e.gpa.clone(),
                })
                .collect(),
            experienced_skills: applicant
                .experienced_skills
                .iter()
                .map(|s| ExperiencedSkillRow {
                    id: self.child_id(),
                    applicant_id: id,
                    skill: s.skill.clone(),
                    years_of_experience: s.years_of_experience,
                })
                .collect(),
            work_experiences: applicant
                .work_experiences
                .iter()
                .map(|w| WorkExperienceRow {
                    id: self.child_id(),
                    applicant_id: id,
                    company: w.company.clone(),
                    position: w.position.clone(),
                    start_date: w.start_date,
                    end_date: w.end_date,
                    description: w.description.clone(),
                })
                .collect(),
            projects: applicant
                .projects
                .iter()
                .map(|p| ProjectRow {
                    id: self.child_id(),
                    applicant_id: id,
                    name: p.name.clone(),
                    start_date: p.start_date,
                    end_date: p.end_date,
                    description: p.description.clone(),
                })
                .collect(),
        }
    }
}

fn contains_ci(haystack: &Option<String>, needle: &str) -> bool {
    haystack
        .as_deref()
        .is_some_and(|h| h.to_lowercase().contains(&needle.to_lowercase()))
}

fn matches(record: &ApplicantRecord, query: &SearchQuery) -> bool {
    let row = &record.applicant;
    if let Some(name) = &query.name {
        if !contains_ci(&row.name, name) {
            return false;
        }
    }
    if let Some(email) = &query.email {
        if !contains_ci(&row.email, email) {
            return false;
        }
    }
    if let Some(phone) = &query.phone {
        if !contains_ci(&row.phone, phone) {
            return false;
        }
    }
    if let Some(linked_in) = &query.linked_in {
        if !contains_ci(&row.linked_in, linked_in) {
            return false;
        }
    }
    if let Some(git_repo) = &query.git_repo {
        if !contains_ci(&row.git_repo, git_repo) {
            return false;
        }
    }
    if let Some(minimums) = &query.experienced_skills {
        for (skill, minimum) in minimums {
            let satisfied = record.experienced_skills.iter().any(|s| {
                s.skill.to_lowercase().contains(&skill.to_lowercase())
                    && s.years_of_experience >= *minimum
            });
            if !satisfied {
                return false;
            }
        }
    }
    true
}

fn sort_records(records: &mut [ApplicantRecord], order: OrderBy) {
    match order {
        OrderBy::NameAsc => records.sort_by(|a, b| a.applicant.name.cmp(&b.applicant.name)),
        OrderBy::NameDesc => records.sort_by(|a, b| b.applicant.name.cmp(&a.applicant.name)),
        OrderBy::IdAsc => records.sort_by(|a, b| a.applicant.id.cmp(&b.applicant.id)),
        OrderBy::LastUpdatedAsc => {
            records.sort_by(|a, b| a.applicant.last_updated.cmp(&b.applicant.last_updated))
        }
        OrderBy::LastUpdatedDesc => {
            records.sort_by(|a, b| b.applicant.last_updated.cmp(&a.applicant.last_updated))
        }
    }
}

#[async_trait]
impl RelationalStore for InMemoryRelationalStore {
    async fn insert(&self, link_id: Uuid, applicant: &NewApplicant) -> Result<ApplicantRecord> {
        let record = self.materialize(Uuid::new_v4(), link_id, applicant);
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn replace(
        &self,
        id: Uuid,
        applicant: &NewApplicant,
    ) -> Result<Option<ApplicantRecord>> {
        let link_id = {
            let records = self.records.lock().unwrap();
            match records.iter().find(|r| r.applicant.id == id) {
                Some(existing) => existing.applicant.link_id,
                None => return Ok(None),
            }
        };
        let replaced = self.materialize(id, link_id, applicant);
        let mut records = self.records.lock().unwrap();
        if let Some(slot) = records.iter_mut().find(|r| r.applicant.id == id) {
            *slot = replaced.clone();
        }
        Ok(Some(replaced))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<ApplicantRecord>> {
        let mut records = self.records.lock().unwrap();
        let position = records.iter().position(|r| r.applicant.id == id);
        Ok(position.map(|i| records.remove(i)))
    }

    async fn get(&self, id: Uuid) -> Result<Option<ApplicantRecord>> {
        let records = self.records.lock().unwrap();
        Ok(records.iter().find(|r| r.applicant.id == id).cloned())
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<ApplicantRecord>> {
        let records = self.records.lock().unwrap();
        let mut matched: Vec<ApplicantRecord> = records
            .iter()
            .filter(|r| matches(r, query))
            .cloned()
            .collect();
        sort_records(&mut matched, OrderBy::LastUpdatedDesc);
        Ok(matched)
    }

    async fn list(
        &self,
        page: u32,
        page_size: u32,
        order: OrderBy,
    ) -> Result<(Vec<ApplicantRecord>, u32)> {
        let mut all: Vec<ApplicantRecord> = self.records.lock().unwrap().clone();
        sort_records(&mut all, order);

        let page_size = page_size.max(1);
        let page_count = (all.len() as u32).div_ceil(page_size);
        let start = ((page.max(1) - 1) * page_size) as usize;
        let items = all.into_iter().skip(start).take(page_size as usize).collect();
        Ok((items, page_count))
    }
}
