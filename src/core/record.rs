//! Complaint record assembly.

use chrono::{Local, NaiveDate};

use crate::domain::{ClassificationResult, ComplaintForm, ComplaintRecord, Role};

/// Build the record for a submission, dating it today when the form has no date
pub fn build_record(form: &ComplaintForm, results: &[ClassificationResult]) -> ComplaintRecord {
    build_record_on(form, results, Local::now().date_naive())
}

/// Build the record for a submission with an explicit fallback date
///
/// When the filer is the victim, victim fields are always blank regardless
/// of what the form carried.
pub fn build_record_on(
    form: &ComplaintForm,
    results: &[ClassificationResult],
    today: NaiveDate,
) -> ComplaintRecord {
    let (victim_name, victim_doc_id, victim_email) = match form.role {
        Role::Victim => (String::new(), String::new(), String::new()),
        Role::Complainant => (
            form.victim_name.clone(),
            form.victim_doc_id.clone(),
            form.victim_email.clone(),
        ),
    };

    let articles = results
        .iter()
        .map(|r| r.article.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    ComplaintRecord {
        date: form.date.unwrap_or(today),
        location: form.location.clone(),
        content: form.content.clone(),
        accused_name: form.accused_name.clone(),
        accused_doc_id: form.accused_doc_id.clone(),
        accused_email: form.accused_email.clone(),
        role: form.role,
        victim_name,
        victim_doc_id,
        victim_email,
        offense_labels: articles.clone(),
        article: articles,
        // Plain string fields and no maps: serde_json cannot fail on this input
        classification_dump: serde_json::to_string(results).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LegalEntry;

    fn results() -> Vec<ClassificationResult> {
        vec![
            ClassificationResult::matched("Robo", &LegalEntry::new("Hurto", "1-3 años", "10 SMLV")),
            ClassificationResult::not_found("Amenazas"),
        ]
    }

    fn form(role: Role) -> ComplaintForm {
        ComplaintForm {
            date: NaiveDate::from_ymd_opt(2024, 3, 15),
            location: "Bogotá".to_string(),
            content: "Me robaron y me amenazaron".to_string(),
            accused_name: "Juan Pérez".to_string(),
            accused_doc_id: "123".to_string(),
            accused_email: "juan@example.com".to_string(),
            role,
            victim_name: "X".to_string(),
            victim_doc_id: "456".to_string(),
            victim_email: "x@example.com".to_string(),
        }
    }

    #[test]
    fn test_victim_role_drops_victim_fields() {
        let record = build_record(&form(Role::Victim), &results());
        assert_eq!(record.victim_name, "");
        assert_eq!(record.victim_doc_id, "");
        assert_eq!(record.victim_email, "");
        assert_eq!(record.role, Role::Victim);
    }

    #[test]
    fn test_complainant_role_keeps_victim_fields() {
        let record = build_record(&form(Role::Complainant), &results());
        assert_eq!(record.victim_name, "X");
        assert_eq!(record.victim_doc_id, "456");
        assert_eq!(record.victim_email, "x@example.com");
    }

    #[test]
    fn test_joined_fields() {
        let record = build_record(&form(Role::Victim), &results());
        assert_eq!(record.offense_labels, "Hurto, No encontrado");
        assert_eq!(record.article, "Hurto, No encontrado");
    }

    #[test]
    fn test_dump_contains_full_classification() {
        let record = build_record(&form(Role::Victim), &results());
        let parsed: Vec<ClassificationResult> =
            serde_json::from_str(&record.classification_dump).unwrap();
        assert_eq!(parsed, results());
    }

    #[test]
    fn test_dump_survives_quotes_and_control_characters() {
        let odd = vec![ClassificationResult::not_found("\"Robo\"\n\t\u{0}ñ")];
        let record = build_record(&form(Role::Victim), &odd);

        assert!(!record.classification_dump.is_empty());
        let parsed: Vec<ClassificationResult> =
            serde_json::from_str(&record.classification_dump).unwrap();
        assert_eq!(parsed, odd);
    }

    #[test]
    fn test_missing_date_falls_back_to_today() {
        let mut input = form(Role::Victim);
        input.date = None;
        let today = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();

        let record = build_record_on(&input, &results(), today);
        assert_eq!(record.date, today);
    }

    #[test]
    fn test_no_results_yield_empty_joins() {
        let record = build_record(&form(Role::Victim), &[]);
        assert_eq!(record.offense_labels, "");
        assert_eq!(record.article, "");
        assert_eq!(record.classification_dump, "[]");
    }
}
