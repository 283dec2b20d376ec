use chrono::NaiveDate;

/// Replace every whitespace run with a single underscore.
///
/// Leading and trailing runs become underscores too; only the grouping of
/// consecutive whitespace is collapsed.
pub fn collapse_whitespace(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_run = false;
    for ch in name.chars() {
        if ch.is_whitespace() {
            if !in_run {
                out.push('_');
            }
            in_run = true;
        } else {
            out.push(ch);
            in_run = false;
        }
    }
    out
}

/// Archive member name for one card: `ID_<name>.pdf`, falling back to the
/// entity id when no display name is known.
pub fn member_name(display_name: &str, id: &str) -> String {
    if display_name.is_empty() {
        format!("ID_{id}.pdf")
    } else {
        format!("ID_{}.pdf", collapse_whitespace(display_name))
    }
}

/// Filename for a single-card download: `<prefix>ID-<name>.pdf`.
pub fn single_card_name(prefix: &str, display_name: &str, id: &str) -> String {
    if display_name.is_empty() {
        format!("{prefix}ID-{id}.pdf")
    } else {
        format!("{prefix}ID-{}.pdf", collapse_whitespace(display_name))
    }
}

/// Date-stamped archive filename: `<prefix>_ID_Cards_<YYYY-MM-DD>.zip`.
pub fn archive_name(prefix: &str, date: NaiveDate) -> String {
    format!("{prefix}_ID_Cards_{}.zip", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_runs_collapse_to_one_underscore() {
        assert_eq!(collapse_whitespace("Abdul  Karim"), "Abdul_Karim");
        assert_eq!(collapse_whitespace("A\tB \nC"), "A_B_C");
        assert_eq!(collapse_whitespace(" edge "), "_edge_");
        assert_eq!(collapse_whitespace("plain"), "plain");
    }

    #[test]
    fn member_name_uses_display_name() {
        assert_eq!(member_name("Abdul Karim", "st-1"), "ID_Abdul_Karim.pdf");
    }

    #[test]
    fn member_name_falls_back_to_id() {
        assert_eq!(member_name("", "st-1"), "ID_st-1.pdf");
    }

    #[test]
    fn single_card_name_matches_portal_convention() {
        assert_eq!(
            single_card_name("Staff", "Abdul Karim", "st-1"),
            "StaffID-Abdul_Karim.pdf"
        );
        assert_eq!(single_card_name("Student", "", "stu-9"), "StudentID-stu-9.pdf");
    }

    #[test]
    fn archive_name_is_date_stamped() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        assert_eq!(archive_name("Staff", date), "Staff_ID_Cards_2026-08-07.zip");
        assert_eq!(archive_name("Student", date), "Student_ID_Cards_2026-08-07.zip");
    }
}
