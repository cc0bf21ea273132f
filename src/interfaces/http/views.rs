//! Minimal server-rendered pages. Every interpolated value goes through `escape`.

use super::notice::Notice;
use crate::application::use_cases::reports::ReportSummary;
use crate::domain::inspection::{Answer, ComplianceEntry, Inspection, Question};
use std::fmt::Write;

const STATUS_CHOICES: [&str; 3] = ["Pending", "In Progress", "Closed"];
const ANSWER_CHOICES: [&str; 2] = ["हो", "नाही"];

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, notice: Option<&Notice>, body: &str) -> String {
    let banner = notice
        .map(|n| {
            format!(
                r#"<div class="notice notice-{}">{}</div>"#,
                n.level.as_str(),
                escape(&n.message)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="mr">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
body {{ font-family: sans-serif; margin: 1.5rem; }}
table {{ border-collapse: collapse; width: 100%; }}
th, td {{ border: 1px solid #ccc; padding: .35rem .5rem; text-align: left; vertical-align: top; }}
.notice {{ padding: .6rem 1rem; margin-bottom: 1rem; border-radius: 4px; }}
.notice-success {{ background: #e6f4ea; }}
.notice-danger {{ background: #fdecea; }}
.stats {{ display: flex; gap: 1rem; margin-bottom: 1rem; }}
.stats div {{ border: 1px solid #ccc; padding: .75rem 1rem; }}
</style>
</head>
<body>
<nav><a href="/">डॅशबोर्ड</a> | <a href="/inspect">नवीन तपासणी</a> | <a href="/compliance">अनुपालन</a> | <a href="/reports">अहवाल</a></nav>
<h1>{title}</h1>
{banner}
{body}
</body>
</html>"#,
        title = escape(title),
        banner = banner,
        body = body,
    )
}

fn inspection_table(inspections: &[Inspection], with_actions: bool) -> String {
    if inspections.is_empty() {
        return "<p>अद्याप कोणतीही तपासणी नाही.</p>".to_string();
    }

    let mut html = String::from(
        "<table><thead><tr><th>ID</th><th>सजा</th><th>नाव</th><th>नोंदणी दिनांक</th>\
         <th>तारीख</th><th>एकूण ग्रेड</th><th>फाईल लिंक</th>",
    );
    if with_actions {
        html.push_str("<th></th>");
    }
    html.push_str("</tr></thead><tbody>");

    for i in inspections {
        let link = if i.primary_file_link.is_empty() {
            String::new()
        } else {
            format!(r#"<a href="{0}" target="_blank">फाईल</a>"#, escape(&i.primary_file_link))
        };
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>",
            escape(&i.id),
            escape(&i.saja_name),
            escape(&i.officer_name),
            escape(&i.registration_date),
            escape(&i.submitted_at),
            escape(&i.status),
            link,
        );
        if with_actions {
            let id = escape(&i.id);
            let _ = write!(
                html,
                r#"<td><a href="/edit_inspection/{id}">संपादित करा</a> <a href="/export_pdf/{id}">PDF</a> <a href="/export_word/{id}">Word</a></td>"#,
                id = id
            );
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
    html
}

pub fn dashboard(inspections: &[Inspection], notice: Option<&Notice>) -> String {
    page(
        "डॅशबोर्ड - ग्रा.म.अ. दप्तर तपासणी",
        notice,
        &inspection_table(inspections, true),
    )
}

fn text_input(name: &str, label: &str, value: &str, input_type: &str) -> String {
    format!(
        r#"<p><label>{label}<br><input type="{input_type}" name="{name}" value="{value}"></label></p>"#,
        label = escape(label),
        input_type = input_type,
        name = name,
        value = escape(value),
    )
}

/// New inspection when `existing` is `None`, otherwise the edit form for it.
pub fn inspection_form(
    existing: Option<&Inspection>,
    questions: &[Question],
    answers: &[Answer],
    notice: Option<&Notice>,
) -> String {
    let (title, action) = match existing {
        Some(i) => ("तपासणी संपादित करा", format!("/edit_inspection/{}", escape(&i.id))),
        None => ("नवीन तपासणी", "/inspect".to_string()),
    };
    let saja = existing.map(|i| i.saja_name.as_str()).unwrap_or("");
    let officer = existing.map(|i| i.officer_name.as_str()).unwrap_or("");
    let registered = existing.map(|i| i.registration_date.as_str()).unwrap_or("");

    let mut body = format!(
        r#"<form method="post" action="{}" enctype="multipart/form-data">"#,
        action
    );
    body.push_str(&text_input("saja_name", "सजा", saja, "text"));
    body.push_str(&text_input("vro_name", "नाव", officer, "text"));
    body.push_str(&text_input("registration_date", "नोंदणी दिनांक", registered, "date"));
    if let Some(i) = existing {
        body.push_str(&text_input("grade", "एकूण ग्रेड", &i.status, "text"));
    }

    body.push_str("<table><thead><tr><th>विभाग</th><th>प्रश्न</th><th>उत्तर</th><th>शेरा</th><th>फाईल</th></tr></thead><tbody>");
    for q in questions {
        let previous = answers.iter().find(|a| a.question_id == q.id);
        let chosen = previous.map(|a| a.answer.as_str()).unwrap_or("");
        let remark = previous.map(|a| a.remark.as_str()).unwrap_or("");
        let id = escape(&q.id);

        let mut options = String::from(r#"<option value=""></option>"#);
        for choice in ANSWER_CHOICES {
            let selected = if choice == chosen { " selected" } else { "" };
            let _ = write!(options, r#"<option value="{0}"{1}>{0}</option>"#, choice, selected);
        }
        let required = if q.upload_required { " (आवश्यक)" } else { "" };

        let _ = write!(
            body,
            r#"<tr><td>{dept}</td><td>{text}</td><td><select name="q_{id}">{options}</select></td><td><textarea name="remark_{id}">{remark}</textarea></td><td><input type="file" name="file_{id}">{required}</td></tr>"#,
            dept = escape(&q.department),
            text = escape(&q.text),
            id = id,
            options = options,
            remark = escape(remark),
            required = required,
        );
    }
    body.push_str(r#"</tbody></table><p><button type="submit">जतन करा</button></p></form>"#);

    page(title, notice, &body)
}

pub fn compliance(entries: &[ComplianceEntry], notice: Option<&Notice>) -> String {
    if entries.is_empty() {
        return page("अनुपालन अहवाल", notice, "<p>कोणतेही शेरे नाहीत.</p>");
    }

    let mut body = String::from(
        "<table><thead><tr><th>Log_ID</th><th>अधिकारी शेरा</th><th>वरिष्ठ मत</th>\
         <th>स्पष्टीकरण</th><th>स्थिती</th><th></th></tr></thead><tbody>",
    );
    for (index, entry) in entries.iter().enumerate() {
        let form_id = format!("c{}", index);
        let mut options = String::new();
        let mut choices: Vec<&str> = STATUS_CHOICES.to_vec();
        if !entry.status.is_empty() && !choices.contains(&entry.status.as_str()) {
            choices.push(&entry.status);
        }
        for choice in choices {
            let selected = if choice == entry.status { " selected" } else { "" };
            let _ = write!(
                options,
                r#"<option value="{0}"{1}>{0}</option>"#,
                escape(choice),
                selected
            );
        }

        let _ = write!(
            body,
            r#"<tr><td>{log_id}</td><td>{remark}</td>
<td><textarea form="{form}" name="senior_remark">{senior}</textarea></td>
<td><textarea form="{form}" name="explanation">{explanation}</textarea></td>
<td><select form="{form}" name="status">{options}</select></td>
<td><form id="{form}" method="post" action="/compliance"><input type="hidden" name="log_id" value="{log_id}"><input type="hidden" name="remark" value="{remark}"><button type="submit">अपडेट</button></form></td></tr>"#,
            form = form_id,
            log_id = escape(&entry.log_id),
            remark = escape(&entry.officer_remark),
            senior = escape(&entry.senior_opinion),
            explanation = escape(&entry.explanation),
            options = options,
        );
    }
    body.push_str("</tbody></table>");

    page("अनुपालन अहवाल", notice, &body)
}

pub fn reports(summary: &ReportSummary, notice: Option<&Notice>) -> String {
    let stats = &summary.stats;
    let body = format!(
        r#"<div class="stats"><div>एकूण तपासण्या<br><strong>{}</strong></div><div>पूर्ण<br><strong>{}</strong></div><div>प्रलंबित अनुपालन<br><strong>{}</strong></div></div>{}"#,
        stats.total,
        stats.completed,
        stats.pending_compliance,
        inspection_table(&summary.inspections, false),
    );
    page("अहवाल आणि सांख्यिकी", notice, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::http::notice::Level;

    fn inspection() -> Inspection {
        Inspection {
            id: "ab12cd34".to_string(),
            saja_name: "<script>alert(1)</script>".to_string(),
            officer_name: "Patil".to_string(),
            registration_date: "2024-03-01".to_string(),
            submitted_at: "2024-03-02 10:00:00".to_string(),
            status: "Pending".to_string(),
            primary_file_link: "https://drive.google.com/uc?id=x&y".to_string(),
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
    }

    #[test]
    fn test_dashboard_escapes_values_and_links_exports() {
        let html = dashboard(&[inspection()], None);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains(r#"href="/export_pdf/ab12cd34""#));
        assert!(html.contains("uc?id=x&amp;y"));
    }

    #[test]
    fn test_notice_banner() {
        let notice = Notice {
            message: "saved".to_string(),
            level: Level::Success,
        };
        let html = dashboard(&[], Some(&notice));
        assert!(html.contains(r#"<div class="notice notice-success">saved</div>"#));
    }

    #[test]
    fn test_edit_form_prefills_answers_and_grade() {
        let answers = vec![Answer {
            inspection_id: "ab12cd34".to_string(),
            question_id: "1".to_string(),
            answer: "नाही".to_string(),
            remark: "torn".to_string(),
        }];
        let html = inspection_form(
            Some(&inspection()),
            &Question::fallback_questions(),
            &answers,
            None,
        );
        assert!(html.contains(r#"action="/edit_inspection/ab12cd34""#));
        assert!(html.contains(r#"name="grade" value="Pending""#));
        assert!(html.contains(r#"<option value="नाही" selected>"#));
        assert!(html.contains(r#"<textarea name="remark_1">torn</textarea>"#));
        assert!(html.contains(r#"name="file_2""#));
    }

    #[test]
    fn test_new_form_has_no_grade() {
        let html = inspection_form(None, &Question::fallback_questions(), &[], None);
        assert!(html.contains(r#"action="/inspect""#));
        assert!(!html.contains(r#"name="grade""#));
    }

    #[test]
    fn test_compliance_keeps_unknown_status_selected() {
        let mut entry = ComplianceEntry::pending("a1", "torn");
        entry.status = "Escalated".to_string();
        let html = compliance(&[entry], None);
        assert!(html.contains(r#"<option value="Escalated" selected>"#));
        assert!(html.contains(r#"name="log_id" value="a1""#));
    }
}
