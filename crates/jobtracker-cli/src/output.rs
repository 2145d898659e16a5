//! Plain-text rendering for command output.

use jobtracker_core::models::{
    DashboardStats, Interview, JobApplication, JobApplicationSummary, Note, User,
};
use jobtracker_core::utils::{format_date, format_phone, format_salary_range, truncate};

// ============================================================================
// Column widths
// ============================================================================

const COMPANY_WIDTH: usize = 24;
const POSITION_WIDTH: usize = 28;
const STATUS_WIDTH: usize = 10;
const TITLE_WIDTH: usize = 32;
const CONTENT_WIDTH: usize = 60;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub fn user(user: &User) -> String {
    let mut out = format!("{} ({})", user.display_name(), user.username);
    if let Some(email) = user.email.as_deref().filter(|e| !e.is_empty()) {
        out.push_str(&format!("\n  {}", email));
    }
    out
}

pub fn application_rows(apps: &[JobApplicationSummary]) -> String {
    if apps.is_empty() {
        return "No applications yet.".to_string();
    }
    let mut out = format!(
        "{:>5}  {:<cw$}  {:<pw$}  {:<sw$}  {}\n",
        "ID",
        "COMPANY",
        "POSITION",
        "STATUS",
        "APPLIED",
        cw = COMPANY_WIDTH,
        pw = POSITION_WIDTH,
        sw = STATUS_WIDTH,
    );
    for app in apps {
        out.push_str(&format!(
            "{:>5}  {:<cw$}  {:<pw$}  {:<sw$}  {}\n",
            app.id,
            truncate(&app.company_name, COMPANY_WIDTH),
            truncate(&app.position_title, POSITION_WIDTH),
            app.status.to_string(),
            format_date(app.application_date),
            cw = COMPANY_WIDTH,
            pw = POSITION_WIDTH,
            sw = STATUS_WIDTH,
        ));
    }
    out.trim_end().to_string()
}

/// Search results come back as full records; show them in the list layout.
pub fn search_results(apps: &[JobApplication]) -> String {
    if apps.is_empty() {
        return "No matching applications.".to_string();
    }
    let rows: Vec<JobApplicationSummary> = apps
        .iter()
        .map(|a| JobApplicationSummary {
            id: a.id,
            company_name: a.company_name.clone(),
            position_title: a.position_title.clone(),
            application_date: a.application_date,
            status: a.status,
            location: a.location.clone(),
            salary_range: a.salary_range.clone(),
            interview_count: a.interviews.len() as u32,
            note_count: a.notes.len() as u32,
            created_at: a.created_at,
        })
        .collect();
    application_rows(&rows)
}

pub fn application_detail(app: &JobApplication) -> String {
    let mut lines = vec![
        app.title(),
        format!("  Status:   {}", app.status),
        format!("  Applied:  {}", format_date(app.application_date)),
    ];

    let salary = app.salary_range.clone().unwrap_or_else(|| {
        format_salary_range(app.salary_min.as_deref(), app.salary_max.as_deref())
    });
    lines.push(format!("  Salary:   {}", salary));

    let optional = [
        ("Location", app.location.clone()),
        ("Source", app.source.clone()),
        ("URL", app.job_url.clone()),
        ("Contact", app.contact_person.clone()),
        ("Email", app.contact_email.clone()),
        ("Phone", format_phone(&app.contact_phone)),
    ];
    for (label, value) in optional {
        if !value.is_empty() {
            lines.push(format!("  {:<9} {}", format!("{}:", label), value));
        }
    }

    if !app.general_notes.is_empty() {
        lines.push(String::new());
        lines.push(app.general_notes.clone());
    }

    if !app.interviews.is_empty() {
        lines.push(String::new());
        lines.push(format!("Interviews ({})", app.interviews.len()));
        lines.extend(app.interviews.iter().map(|i| format!("  {}", interview_line(i))));
    }

    if !app.notes.is_empty() {
        lines.push(String::new());
        lines.push(format!("Notes ({})", app.notes.len()));
        lines.extend(app.notes.iter().map(|n| format!("  {}", note_line(n))));
    }

    lines.join("\n")
}

fn interview_line(interview: &Interview) -> String {
    format!(
        "#{} {}  {} ({} min)  {}  [{}]",
        interview.id,
        interview.formatted_date(),
        interview.interview_type,
        interview.duration_minutes,
        interview.venue(),
        interview.status,
    )
}

pub fn interviews(interviews: &[Interview]) -> String {
    if interviews.is_empty() {
        return "No interviews.".to_string();
    }
    interviews
        .iter()
        .map(interview_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn note_line(note: &Note) -> String {
    let content = note.content.replace('\n', " ");
    format!(
        "#{} {:<tw$}  {}",
        note.id,
        truncate(&note.title, TITLE_WIDTH),
        truncate(&content, CONTENT_WIDTH),
        tw = TITLE_WIDTH,
    )
}

pub fn notes(notes: &[Note]) -> String {
    if notes.is_empty() {
        return "No notes.".to_string();
    }
    notes.iter().map(note_line).collect::<Vec<_>>().join("\n")
}

pub fn dashboard(stats: &DashboardStats, upcoming: &[Interview]) -> String {
    let mut lines = vec![
        format!("Total applications:  {}", stats.total_applications),
        format!("Last 30 days:        {}", stats.recent_applications),
        format!("Upcoming interviews: {}", stats.upcoming_interviews),
        String::new(),
        "By status".to_string(),
    ];
    for status in jobtracker_core::models::ApplicationStatus::ALL {
        lines.push(format!(
            "  {:<sw$} {}",
            status.to_string(),
            stats.count_for(status.code()),
            sw = STATUS_WIDTH,
        ));
    }

    let months: Vec<String> = stats
        .monthly_applications
        .iter()
        .filter_map(|m| {
            let name = MONTH_NAMES.get(m.month? as usize - 1)?;
            Some(format!("  {} {}", name, m.count))
        })
        .collect();
    if !months.is_empty() {
        lines.push(String::new());
        lines.push("By month".to_string());
        lines.extend(months);
    }

    if !upcoming.is_empty() {
        lines.push(String::new());
        lines.push("Next up".to_string());
        lines.extend(upcoming.iter().map(|i| format!("  {}", interview_line(i))));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_application_rows_truncate_long_names() {
        let apps: Vec<JobApplicationSummary> = serde_json::from_value(json!([{
            "id": 7,
            "company_name": "An Extremely Long Company Name Incorporated",
            "position_title": "Engineer",
            "application_date": "2024-05-01",
            "status": "offer"
        }]))
        .unwrap();

        let out = application_rows(&apps);

        assert!(out.contains("An Extremely Long Com..."));
        assert!(out.contains("Offer"));
        assert!(out.contains("May 01, 2024"));
    }

    #[test]
    fn test_empty_lists() {
        assert_eq!(application_rows(&[]), "No applications yet.");
        assert_eq!(notes(&[]), "No notes.");
        assert_eq!(interviews(&[]), "No interviews.");
    }

    #[test]
    fn test_detail_falls_back_to_computed_salary() {
        let app: JobApplication = serde_json::from_value(json!({
            "id": 3,
            "company_name": "Acme",
            "position_title": "Engineer",
            "application_date": null,
            "salary_min": "85000.00",
            "contact_phone": "555-123-4567"
        }))
        .unwrap();

        let out = application_detail(&app);

        assert!(out.starts_with("Engineer at Acme"));
        assert!(out.contains("Salary:   $85,000+"));
        assert!(out.contains("(555) 123-4567"));
        assert!(out.contains("Applied:  -"));
    }

    #[test]
    fn test_dashboard_skips_bad_months() {
        let stats: DashboardStats = serde_json::from_value(json!({
            "total_applications": 2,
            "status_counts": [{"status": "applied", "count": 2}],
            "monthly_applications": [{"month": 3, "count": 2}, {"month": null, "count": 1}]
        }))
        .unwrap();

        let out = dashboard(&stats, &[]);

        assert!(out.contains("Total applications:  2"));
        assert!(out.contains("Mar 2"));
        assert!(!out.contains("Next up"));
    }
}
