use std::fmt;

use serde::Deserialize;

/// Which roster a card belongs to. Selects the backend endpoint and the
/// naming convention of the exported files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardKind {
    Staff,
    Student,
}

impl CardKind {
    /// Endpoint path of one rendered card, relative to the base URL.
    pub fn card_path(&self, id: &str) -> String {
        match self {
            CardKind::Staff => format!("id-cards/staff/{id}"),
            CardKind::Student => format!("id-cards/student/{id}"),
        }
    }

    /// Prefix used for archive and single-card filenames.
    pub fn file_prefix(&self) -> &'static str {
        match self {
            CardKind::Staff => "Staff",
            CardKind::Student => "Student",
        }
    }
}

impl fmt::Display for CardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardKind::Staff => write!(f, "staff"),
            CardKind::Student => write!(f, "student"),
        }
    }
}

/// Identifier plus display name for one exportable roster entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRef {
    pub id: String,
    pub name: String,
}

impl EntityRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// One row of the staff roster, as served by `GET /staff`.
#[derive(Debug, Clone, Deserialize)]
pub struct StaffMember {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub designation: Option<String>,
    #[serde(default)]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl StaffMember {
    /// Case-insensitive match over name, designation, employee id and
    /// department.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        let hit = |field: &str| field.to_lowercase().contains(&term);
        hit(&self.name)
            || self.designation.as_deref().is_some_and(hit)
            || self.employee_id.as_deref().is_some_and(hit)
            || self.department.as_deref().is_some_and(hit)
    }
}

impl From<&StaffMember> for EntityRef {
    fn from(member: &StaffMember) -> Self {
        EntityRef::new(&member.id, &member.name)
    }
}

/// One row of the student roster, as served by `GET /id-cards/students/list`.
#[derive(Debug, Clone, Deserialize)]
pub struct Student {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub father_name: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub section_name: Option<String>,
    #[serde(default)]
    pub roll_no: Option<String>,
    #[serde(default)]
    pub admission_no: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl Student {
    /// Case-insensitive match over name, father's name, roll and admission
    /// numbers.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        let hit = |field: &str| field.to_lowercase().contains(&term);
        hit(&self.name)
            || self.father_name.as_deref().is_some_and(hit)
            || self.roll_no.as_deref().is_some_and(hit)
            || self.admission_no.as_deref().is_some_and(hit)
    }
}

impl From<&Student> for EntityRef {
    fn from(student: &Student) -> Self {
        EntityRef::new(&student.id, &student.name)
    }
}

/// Server-side narrowing of the student roster.
#[derive(Debug, Clone, Default)]
pub struct StudentFilter {
    pub class_id: Option<String>,
    pub section_id: Option<String>,
}

impl StudentFilter {
    /// Endpoint path with query parameters, relative to the base URL.
    pub fn query_path(&self) -> String {
        let mut params = Vec::new();
        if let Some(class_id) = &self.class_id {
            params.push(format!("class_id={class_id}"));
        }
        if let Some(section_id) = &self.section_id {
            params.push(format!("section_id={section_id}"));
        }

        if params.is_empty() {
            "id-cards/students/list".to_string()
        } else {
            format!("id-cards/students/list?{}", params.join("&"))
        }
    }
}

/// Distinct departments in first-seen order, empty values dropped.
pub fn departments(staff: &[StaffMember]) -> Vec<String> {
    let mut seen = Vec::new();
    for member in staff {
        if let Some(dept) = member.department.as_deref()
            && !dept.is_empty()
            && !seen.iter().any(|d| d == dept)
        {
            seen.push(dept.to_string());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(name: &str, designation: &str, department: &str) -> StaffMember {
        StaffMember {
            id: format!("st-{name}"),
            name: name.to_string(),
            designation: Some(designation.to_string()),
            employee_id: Some("EMP-77".to_string()),
            department: Some(department.to_string()),
            photo_url: None,
        }
    }

    #[test]
    fn card_paths_point_at_the_id_card_endpoints() {
        assert_eq!(CardKind::Staff.card_path("st-9"), "id-cards/staff/st-9");
        assert_eq!(CardKind::Student.card_path("stu-4"), "id-cards/student/stu-4");
    }

    #[test]
    fn staff_search_covers_all_columns() {
        let m = member("Abdul Karim", "Lecturer", "Hifz");
        assert!(m.matches_search("karim"));
        assert!(m.matches_search("LECT"));
        assert!(m.matches_search("emp-77"));
        assert!(m.matches_search("hifz"));
        assert!(!m.matches_search("accounts"));
    }

    #[test]
    fn student_filter_builds_query_paths() {
        assert_eq!(StudentFilter::default().query_path(), "id-cards/students/list");
        let filter = StudentFilter {
            class_id: Some("c1".into()),
            section_id: Some("s2".into()),
        };
        assert_eq!(
            filter.query_path(),
            "id-cards/students/list?class_id=c1&section_id=s2"
        );
    }

    #[test]
    fn departments_are_unique_in_first_seen_order() {
        let staff = vec![
            member("A", "x", "Hifz"),
            member("B", "x", "Nazera"),
            member("C", "x", "Hifz"),
        ];
        assert_eq!(departments(&staff), ["Hifz", "Nazera"]);
    }

    #[test]
    fn roster_rows_deserialize_with_missing_optionals() {
        let raw = r#"[{"id": "st-1", "name": "Abdul Karim"}]"#;
        let staff: Vec<StaffMember> = serde_json::from_str(raw).unwrap();
        assert_eq!(staff[0].id, "st-1");
        assert!(staff[0].department.is_none());

        let raw = r#"[{"id": "stu-1", "name": "Rahim", "roll_no": "12"}]"#;
        let students: Vec<Student> = serde_json::from_str(raw).unwrap();
        assert_eq!(students[0].roll_no.as_deref(), Some("12"));
    }
}
