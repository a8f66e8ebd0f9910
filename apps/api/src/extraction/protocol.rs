//! The tag-delimited wire format exchanged with the LLM and its
//! deterministic parser.
//!
//! Parsing is purely structural: tag-delimited spans are extracted with a
//! sequential scanner and their content is never reinterpreted. Each
//! `<ParsedCV>` block becomes one [`ExtractionRecord`]; fields absent from a
//! block stay `None`, never empty strings or defaults.

use chrono::NaiveDate;
use serde::Serialize;

/// The parsed tag tree for one applicant.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractionRecord {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linked_in: Option<String>,
    pub git_repo: Option<String>,
    pub address: Option<String>,
    /// Rounded to the nearest 0.5 at parse time.
    pub total_years_of_experience: Option<f64>,
    pub work_experiences: Vec<WorkExperienceEntry>,
    pub projects: Vec<ProjectEntry>,
    pub educations: Vec<EducationEntry>,
    pub skills: Vec<String>,
    pub experienced_skills: Vec<ExperiencedSkillEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkExperienceEntry {
    pub company: Option<String>,
    pub position: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectEntry {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EducationEntry {
    pub degree: Option<String>,
    pub institution: Option<String>,
    pub year: Option<String>,
    pub gpa: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperiencedSkillEntry {
    pub skill: String,
    /// `None` when the `<YoE>` value did not parse as a number.
    pub years_of_experience: Option<f64>,
}

/// Rounds to the nearest multiple of 0.5. Idempotent.
pub fn round_to_half(x: f64) -> f64 {
    (x * 2.0).round() / 2.0
}

/// Parses a years-of-experience value and rounds it to the nearest 0.5.
/// An unparsable string yields `None`, never zero.
pub fn parse_years(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().map(round_to_half)
}

/// Best-effort date parse over the formats CVs commonly carry.
/// Unparsable or missing dates yield `None`, never a default date.
pub fn parse_date_loose(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%d/%m/%Y", "%B %d, %Y", "%d %B %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    // Month-year forms ("June 2019", "Jun 2019", "06/2019") pin to day 1.
    let padded = format!("1 {s}");
    for fmt in ["%d %B %Y", "%d %b %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(&padded, fmt) {
            return Some(date);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("1/{s}"), "%d/%m/%Y") {
        return Some(date);
    }

    // Bare year pins to January 1st.
    if let Ok(year) = s.parse::<i32>() {
        if (1000..=9999).contains(&year) {
            return NaiveDate::from_ymd_opt(year, 1, 1);
        }
    }

    None
}

/// Wraps each input text in `<CV>` tags and joins the batch into one
/// request payload.
pub fn build_request(texts: &[String]) -> String {
    texts
        .iter()
        .map(|text| format!("<CV>{text}</CV>"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Returns the content of every `<ParsedCV>` block in a reply, in order.
/// An empty result means the reply is malformed for this protocol.
pub fn parsed_cv_blocks(reply: &str) -> Vec<&str> {
    tag_spans(reply, "ParsedCV")
}

/// Parses one `<ParsedCV>` block content into an [`ExtractionRecord`].
/// Missing fields are not an error; they stay absent.
pub fn parse_record(block: &str) -> ExtractionRecord {
    ExtractionRecord {
        name: scalar(block, "ApplicationName"),
        email: scalar(block, "Email"),
        phone: scalar(block, "Phone"),
        linked_in: scalar(block, "LinkedIn"),
        git_repo: scalar(block, "GitRepo"),
        address: scalar(block, "Address"),
        total_years_of_experience: scalar(block, "YearOfExperience")
            .and_then(|s| parse_years(&s)),
        work_experiences: tag_spans(block, "WorkExperience")
            .into_iter()
            .map(parse_work_experience)
            .collect(),
        projects: tag_spans(block, "Project")
            .into_iter()
            .map(parse_project)
            .collect(),
        educations: tag_spans(block, "Education")
            .into_iter()
            .map(parse_education)
            .collect(),
        skills: tag_spans(block, "Skill")
            .into_iter()
            .filter_map(non_empty)
            .collect(),
        experienced_skills: experienced_skill_pairs(block),
    }
}

fn parse_work_experience(entry: &str) -> WorkExperienceEntry {
    WorkExperienceEntry {
        company: scalar(entry, "Company"),
        position: scalar(entry, "Position"),
        start_date: scalar(entry, "StartDate").and_then(|s| parse_date_loose(&s)),
        end_date: scalar(entry, "EndDate").and_then(|s| parse_date_loose(&s)),
        description: scalar(entry, "Description"),
    }
}

fn parse_project(entry: &str) -> ProjectEntry {
    ProjectEntry {
        name: scalar(entry, "ProjectName"),
        start_date: scalar(entry, "StartDate").and_then(|s| parse_date_loose(&s)),
        end_date: scalar(entry, "EndDate").and_then(|s| parse_date_loose(&s)),
        description: scalar(entry, "Description"),
    }
}

fn parse_education(entry: &str) -> EducationEntry {
    EducationEntry {
        degree: scalar(entry, "Degree"),
        institution: scalar(entry, "Institution"),
        year: scalar(entry, "Year"),
        gpa: scalar(entry, "GPA"),
    }
}

/// First occurrence of a paired tag, trimmed; empty content counts as absent.
fn scalar(input: &str, tag: &str) -> Option<String> {
    first_tag_span(input, tag).and_then(non_empty)
}

fn non_empty(span: &str) -> Option<String> {
    let trimmed = span.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// All non-overlapping `<tag>...</tag>` spans, scanned left to right.
fn tag_spans<'a>(input: &'a str, tag: &str) -> Vec<&'a str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let mut spans = Vec::new();
    let mut rest = input;

    while let Some(start) = rest.find(&open) {
        let after_open = &rest[start + open.len()..];
        let Some(end) = after_open.find(&close) else {
            break; // unterminated tag: stop scanning, keep what we have
        };
        spans.push(&after_open[..end]);
        rest = &after_open[end + close.len()..];
    }
    spans
}

fn first_tag_span<'a>(input: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = input.find(&open)?;
    let after_open = &input[start + open.len()..];
    let end = after_open.find(&close)?;
    Some(&after_open[..end])
}

/// Scans `<ExperiencedSkill>x</ExperiencedSkill><YoE>n</YoE>` pairs.
/// The `<YoE>` tag must be byte-adjacent to the closing skill tag; a skill
/// without an adjacent YoE is not an experienced skill and is skipped.
fn experienced_skill_pairs(input: &str) -> Vec<ExperiencedSkillEntry> {
    const OPEN: &str = "<ExperiencedSkill>";
    const CLOSE: &str = "</ExperiencedSkill>";
    const YOE_OPEN: &str = "<YoE>";
    const YOE_CLOSE: &str = "</YoE>";

    let mut entries = Vec::new();
    let mut rest = input;

    while let Some(start) = rest.find(OPEN) {
        let after_open = &rest[start + OPEN.len()..];
        let Some(end) = after_open.find(CLOSE) else {
            break;
        };
        let skill = after_open[..end].trim();
        let after_close = &after_open[end + CLOSE.len()..];

        if let Some(after_yoe_open) = after_close.strip_prefix(YOE_OPEN) {
            if let Some(yoe_end) = after_yoe_open.find(YOE_CLOSE) {
                if !skill.is_empty() {
                    entries.push(ExperiencedSkillEntry {
                        skill: skill.to_string(),
                        years_of_experience: parse_years(&after_yoe_open[..yoe_end]),
                    });
                }
                rest = &after_yoe_open[yoe_end + YOE_CLOSE.len()..];
                continue;
            }
        }
        rest = after_close;
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_BLOCK: &str = r#"
        <ApplicationName>John Doe</ApplicationName>
        <Email>johndoe@gmail.com</Email>
        <Phone>+1234567890</Phone>
        <LinkedIn>https://www.linkedin.com/in/johndoe</LinkedIn>
        <GitRepo>https://github.com/johndoe</GitRepo>
        <YearOfExperience>3.74</YearOfExperience>
        <Address>123 Main St, City, Country</Address>
        <WorkExperience>
            <Company>ExpriLabs</Company>
            <StartDate>2022</StartDate>
            <EndDate>2024</EndDate>
            <Position>Project Manager</Position>
            <Description>
            - Developed AI models.
            </Description>
        </WorkExperience>
        <WorkExperience>
            <Company>TechCorp</Company>
            <Position>Cloud Engineer</Position>
        </WorkExperience>
        <Project>
            <ProjectName>Fraud Detection</ProjectName>
            <StartDate>June 2019</StartDate>
            <EndDate>December 2019</EndDate>
            <Description>Detected fraud in real-time.</Description>
        </Project>
        <Education>
            <Degree>BSc Computer Science</Degree>
            <Institution>University of Technology</Institution>
            <Year>2016-2020</Year>
            <GPA>3.8</GPA>
        </Education>
        <Skill>Python</Skill>
        <Skill>Machine Learning</Skill>
        <ExperiencedSkill>Cloud computing</ExperiencedSkill><YoE>2</YoE>
        <ExperiencedSkill>Project management</ExperiencedSkill><YoE>abc</YoE>
    "#;

    #[test]
    fn test_round_to_half() {
        assert_eq!(round_to_half(3.74), 3.5);
        assert_eq!(round_to_half(3.76), 4.0);
        assert_eq!(round_to_half(2.0), 2.0);
        assert_eq!(round_to_half(2.25), 2.5);
    }

    #[test]
    fn test_round_to_half_idempotent() {
        for x in [0.1, 3.74, 3.76, 7.3, 12.49, 0.0] {
            let once = round_to_half(x);
            assert_eq!(round_to_half(once), once);
        }
    }

    #[test]
    fn test_parse_years_unparsable_is_none() {
        assert_eq!(parse_years("two"), None);
        assert_eq!(parse_years(""), None);
        assert_eq!(parse_years("2.3"), Some(2.5));
    }

    #[test]
    fn test_parse_date_loose_formats() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        assert_eq!(parse_date_loose("2019-06-15"), Some(d(2019, 6, 15)));
        assert_eq!(parse_date_loose("June 2019"), Some(d(2019, 6, 1)));
        assert_eq!(parse_date_loose("Jun 2019"), Some(d(2019, 6, 1)));
        assert_eq!(parse_date_loose("June 5, 2019"), Some(d(2019, 6, 5)));
        assert_eq!(parse_date_loose("06/2019"), Some(d(2019, 6, 1)));
        assert_eq!(parse_date_loose("2019"), Some(d(2019, 1, 1)));
        assert_eq!(parse_date_loose("ongoing"), None);
        assert_eq!(parse_date_loose(""), None);
    }

    #[test]
    fn test_build_request_wraps_each_text() {
        let texts = vec!["cv one".to_string(), "cv two".to_string()];
        assert_eq!(build_request(&texts), "<CV>cv one</CV>\n<CV>cv two</CV>");
    }

    #[test]
    fn test_parsed_cv_blocks_extracts_all() {
        let reply = "noise <ParsedCV>first</ParsedCV> mid <ParsedCV>second</ParsedCV> tail";
        assert_eq!(parsed_cv_blocks(reply), vec!["first", "second"]);
    }

    #[test]
    fn test_parsed_cv_blocks_empty_when_malformed() {
        assert!(parsed_cv_blocks("I could not parse these CVs.").is_empty());
        assert!(parsed_cv_blocks("<ParsedCV>unterminated").is_empty());
    }

    #[test]
    fn test_parse_record_scalars() {
        let record = parse_record(FULL_BLOCK);
        assert_eq!(record.name.as_deref(), Some("John Doe"));
        assert_eq!(record.email.as_deref(), Some("johndoe@gmail.com"));
        assert_eq!(record.phone.as_deref(), Some("+1234567890"));
        assert_eq!(
            record.linked_in.as_deref(),
            Some("https://www.linkedin.com/in/johndoe")
        );
        assert_eq!(record.git_repo.as_deref(), Some("https://github.com/johndoe"));
        assert_eq!(record.address.as_deref(), Some("123 Main St, City, Country"));
        // 3.74 rounds to 3.5 at parse time
        assert_eq!(record.total_years_of_experience, Some(3.5));
    }

    #[test]
    fn test_parse_record_nested_entries() {
        let record = parse_record(FULL_BLOCK);

        assert_eq!(record.work_experiences.len(), 2);
        let first = &record.work_experiences[0];
        assert_eq!(first.company.as_deref(), Some("ExpriLabs"));
        assert_eq!(first.position.as_deref(), Some("Project Manager"));
        assert_eq!(first.start_date, NaiveDate::from_ymd_opt(2022, 1, 1));
        assert_eq!(first.end_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(first.description.as_deref(), Some("- Developed AI models."));
        // Second entry has no dates or description — absent, not defaulted.
        let second = &record.work_experiences[1];
        assert_eq!(second.start_date, None);
        assert_eq!(second.description, None);

        assert_eq!(record.projects.len(), 1);
        let project = &record.projects[0];
        assert_eq!(project.name.as_deref(), Some("Fraud Detection"));
        assert_eq!(project.start_date, NaiveDate::from_ymd_opt(2019, 6, 1));
        assert_eq!(project.end_date, NaiveDate::from_ymd_opt(2019, 12, 1));

        assert_eq!(record.educations.len(), 1);
        assert_eq!(record.educations[0].gpa.as_deref(), Some("3.8"));
    }

    #[test]
    fn test_parse_record_skills() {
        let record = parse_record(FULL_BLOCK);
        assert_eq!(record.skills, vec!["Python", "Machine Learning"]);
        assert_eq!(record.experienced_skills.len(), 2);
        assert_eq!(record.experienced_skills[0].skill, "Cloud computing");
        assert_eq!(record.experienced_skills[0].years_of_experience, Some(2.0));
        // Unparsable YoE keeps the entry but with no value.
        assert_eq!(record.experienced_skills[1].years_of_experience, None);
    }

    #[test]
    fn test_experienced_skill_requires_adjacent_yoe() {
        let block = "<ExperiencedSkill>Rust</ExperiencedSkill> <YoE>3</YoE>";
        assert!(experienced_skill_pairs(block).is_empty());

        let adjacent = "<ExperiencedSkill>Rust</ExperiencedSkill><YoE>3</YoE>";
        let entries = experienced_skill_pairs(adjacent);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].skill, "Rust");
        assert_eq!(entries[0].years_of_experience, Some(3.0));
    }

    #[test]
    fn test_parse_record_missing_fields_stay_absent() {
        let record = parse_record("<ApplicationName>Jane</ApplicationName>");
        assert_eq!(record.name.as_deref(), Some("Jane"));
        assert_eq!(record.email, None);
        assert_eq!(record.total_years_of_experience, None);
        assert!(record.work_experiences.is_empty());
        assert!(record.skills.is_empty());
    }

    #[test]
    fn test_empty_tag_content_is_absent() {
        let record = parse_record("<Email>   </Email>");
        assert_eq!(record.email, None);
    }
}
