//! Postgres-backed [`RelationalStore`]. Writes touching an applicant and
//! its child rows run inside one transaction; child rows are replaced
//! wholesale on update and removed via `ON DELETE CASCADE` on delete.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::applicants::search::SearchQuery;
use crate::applicants::store::{OrderBy, RelationalStore};
use crate::models::applicant::{
    ApplicantRecord, ApplicantRow, EducationRow, ExperiencedSkillRow, NewApplicant, ProjectRow,
    WorkExperienceRow,
};

pub struct PgRelationalStore {
    pool: PgPool,
}

impl PgRelationalStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_record(&self, row: ApplicantRow) -> Result<ApplicantRecord> {
        let id = row.id;

        let educations = sqlx::query_as::<_, EducationRow>(
            "SELECT * FROM educations WHERE applicant_id = $1 ORDER BY id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let experienced_skills = sqlx::query_as::<_, ExperiencedSkillRow>(
            "SELECT * FROM experienced_skills WHERE applicant_id = $1 ORDER BY id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let work_experiences = sqlx::query_as::<_, WorkExperienceRow>(
            "SELECT * FROM work_experiences WHERE applicant_id = $1 ORDER BY id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let projects = sqlx::query_as::<_, ProjectRow>(
            "SELECT * FROM projects WHERE applicant_id = $1 ORDER BY id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ApplicantRecord {
            applicant: row,
            educations,
            experienced_skills,
            work_experiences,
            projects,
        })
    }

    async fn load_records(&self, rows: Vec<ApplicantRow>) -> Result<Vec<ApplicantRecord>> {
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(self.load_record(row).await?);
        }
        Ok(records)
    }
}

async fn insert_children(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    id: Uuid,
    applicant: &NewApplicant,
) -> Result<()> {
    for e in &applicant.educations {
        sqlx::query(
            "INSERT INTO educations (applicant_id, degree, institution, year, gpa)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id)
        .bind(&e.degree)
        .bind(&e.institution)
        .bind(&e.year)
        .bind(&e.gpa)
        .execute(&mut **tx)
        .await?;
    }

    for s in &applicant.experienced_skills {
        sqlx::query(
            "INSERT INTO experienced_skills (applicant_id, skill, years_of_experience)
             VALUES ($1, $2, $3)",
        )
        .bind(id)
        .bind(&s.skill)
        .bind(s.years_of_experience)
        .execute(&mut **tx)
        .await?;
    }

    for w in &applicant.work_experiences {
        sqlx::query(
            "INSERT INTO work_experiences (applicant_id, company, position, start_date, end_date, description)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(id)
        .bind(&w.company)
        .bind(&w.position)
        .bind(w.start_date)
        .bind(w.end_date)
        .bind(&w.description)
        .execute(&mut **tx)
        .await?;
    }

    for p in &applicant.projects {
        sqlx::query(
            "INSERT INTO projects (applicant_id, name, start_date, end_date, description)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id)
        .bind(&p.name)
        .bind(p.start_date)
        .bind(p.end_date)
        .bind(&p.description)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

fn order_clause(order: OrderBy) -> &'static str {
    match order {
        OrderBy::NameAsc => "name ASC NULLS LAST",
        OrderBy::NameDesc => "name DESC NULLS LAST",
        OrderBy::IdAsc => "id ASC",
        OrderBy::LastUpdatedAsc => "last_updated ASC",
        OrderBy::LastUpdatedDesc => "last_updated DESC",
    }
}

#[async_trait]
impl RelationalStore for PgRelationalStore {
    async fn insert(&self, link_id: Uuid, applicant: &NewApplicant) -> Result<ApplicantRecord> {
        let id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ApplicantRow>(
            "INSERT INTO applicants
                 (id, link_id, name, email, phone, address, linked_in, git_repo, years_of_experience)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING *",
        )
        .bind(id)
        .bind(link_id)
        .bind(&applicant.name)
        .bind(&applicant.email)
        .bind(&applicant.phone)
        .bind(&applicant.address)
        .bind(&applicant.linked_in)
        .bind(&applicant.git_repo)
        .bind(applicant.years_of_experience)
        .fetch_one(&mut *tx)
        .await?;

        insert_children(&mut tx, id, applicant).await?;
        tx.commit().await?;

        self.load_record(row).await
    }

    async fn replace(
        &self,
        id: Uuid,
        applicant: &NewApplicant,
    ) -> Result<Option<ApplicantRecord>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ApplicantRow>(
            "UPDATE applicants
             SET name = $2, email = $3, phone = $4, address = $5, linked_in = $6,
                 git_repo = $7, years_of_experience = $8, last_updated = now()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(&applicant.name)
        .bind(&applicant.email)
        .bind(&applicant.phone)
        .bind(&applicant.address)
        .bind(&applicant.linked_in)
        .bind(&applicant.git_repo)
        .bind(applicant.years_of_experience)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        // Wholesale child replacement; no per-row merging.
        for table in [
            "educations",
            "experienced_skills",
            "work_experiences",
            "projects",
        ] {
            sqlx::query(&format!("DELETE FROM {table} WHERE applicant_id = $1"))
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        insert_children(&mut tx, id, applicant).await?;
        tx.commit().await?;

        self.load_record(row).await.map(Some)
    }

    async fn delete(&self, id: Uuid) -> Result<Option<ApplicantRecord>> {
        let Some(snapshot) = self.get(id).await? else {
            return Ok(None);
        };

        // Children go with the parent via ON DELETE CASCADE.
        sqlx::query("DELETE FROM applicants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("failed to delete applicant")?;

        Ok(Some(snapshot))
    }

    async fn get(&self, id: Uuid) -> Result<Option<ApplicantRecord>> {
        let row = sqlx::query_as::<_, ApplicantRow>("SELECT * FROM applicants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => self.load_record(row).await.map(Some),
            None => Ok(None),
        }
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<ApplicantRecord>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM applicants WHERE 1=1");

        if let Some(name) = &query.name {
            builder.push(" AND name ILIKE ").push_bind(like(name));
        }
        if let Some(email) = &query.email {
            builder.push(" AND email ILIKE ").push_bind(like(email));
        }
        if let Some(phone) = &query.phone {
            builder.push(" AND phone ILIKE ").push_bind(like(phone));
        }
        if let Some(linked_in) = &query.linked_in {
            builder
                .push(" AND linked_in ILIKE ")
                .push_bind(like(linked_in));
        }
        if let Some(git_repo) = &query.git_repo {
            builder
                .push(" AND git_repo ILIKE ")
                .push_bind(like(git_repo));
        }
        if let Some(minimums) = &query.experienced_skills {
            for (skill, minimum) in minimums {
                builder
                    .push(
                        " AND EXISTS (SELECT 1 FROM experienced_skills es \
                         WHERE es.applicant_id = applicants.id AND es.skill ILIKE ",
                    )
                    .push_bind(like(skill))
                    .push(" AND es.years_of_experience >= ")
                    .push_bind(*minimum)
                    .push(")");
            }
        }

        builder.push(" ORDER BY last_updated DESC");

        let rows = builder
            .build_query_as::<ApplicantRow>()
            .fetch_all(&self.pool)
            .await?;
        self.load_records(rows).await
    }

    async fn list(
        &self,
        page: u32,
        page_size: u32,
        order: OrderBy,
    ) -> Result<(Vec<ApplicantRecord>, u32)> {
        let page_size = page_size.max(1);
        let offset = (page.max(1) - 1) * page_size;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM applicants")
            .fetch_one(&self.pool)
            .await?;
        let page_count = (total as u32).div_ceil(page_size);

        let rows = sqlx::query_as::<_, ApplicantRow>(&format!(
            "SELECT * FROM applicants ORDER BY {} OFFSET $1 LIMIT $2",
            order_clause(order)
        ))
        .bind(offset as i64)
        .bind(page_size as i64)
        .fetch_all(&self.pool)
        .await?;

        let records = self.load_records(rows).await?;
        Ok((records, page_count))
    }
}

fn like(needle: &str) -> String {
    format!("%{needle}%")
}
