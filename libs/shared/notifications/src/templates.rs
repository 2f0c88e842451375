use chrono::{Datelike, NaiveDate, Utc};

pub struct EmailContent {
    pub subject: String,
    pub html: String,
}

const BLUE: &str = "#2563eb 0%, #1d4ed8 100%";
const RED: &str = "#dc2626 0%, #b91c1c 100%";

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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

fn layout(title: &str, gradient: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <style>
    body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; margin: 0; padding: 0; }}
    .container {{ max-width: 600px; margin: 0 auto; padding: 0; }}
    .header {{ background: linear-gradient(135deg, {gradient}); color: white; padding: 20px; text-align: center; }}
    .content {{ padding: 20px; background: #ffffff; border: 1px solid #e5e7eb; border-top: none; }}
    .box {{ background: #f8fafc; padding: 16px; border-radius: 4px; margin: 16px 0; }}
    .footer {{ text-align: center; padding: 16px; font-size: 12px; color: #6b7280; background: #f8fafc; border-top: 1px solid #e5e7eb; }}
  </style>
</head>
<body>
  <div class="container">
    <div class="header"><h1 style="margin: 0; font-size: 24px;">{title}</h1></div>
    <div class="content">
{content}
    </div>
    <div class="footer"><p>&copy; {year} Healthcare Management System. All rights reserved.</p></div>
  </div>
</body>
</html>"#,
        gradient = gradient,
        title = title,
        content = content,
        year = Utc::now().year(),
    )
}

fn detail_list(items: &[(&str, String)]) -> String {
    let rows: String = items
        .iter()
        .map(|(label, value)| format!("<li><strong>{}:</strong> {}</li>", label, escape_html(value)))
        .collect();
    format!("<div class=\"box\"><ul style=\"margin: 0; padding-left: 20px;\">{}</ul></div>", rows)
}

pub fn appointment_requested_email(
    patient_name: &str,
    doctor_name: &str,
    department: &str,
    date: NaiveDate,
    time: &str,
) -> EmailContent {
    let body = format!(
        "<p>Dear {},</p>\n<p>Your appointment request has been submitted successfully.</p>\n{}\n\
<p>You will receive a confirmation email once the doctor approves your appointment request.</p>",
        escape_html(patient_name),
        detail_list(&[
            ("Doctor", format!("Dr. {}", doctor_name)),
            ("Department", department.to_string()),
            ("Date", date.to_string()),
            ("Time", time.to_string()),
        ]),
    );

    EmailContent {
        subject: "Appointment Request Submitted".to_string(),
        html: layout("Appointment Request Submitted", BLUE, &body),
    }
}

pub fn appointment_requested_sms(date: NaiveDate, time: &str) -> String {
    format!(
        "Appointment request received. Date: {}, Time: {}. Awaiting doctor confirmation.",
        date, time
    )
}

pub fn appointment_confirmed_email(
    patient_name: &str,
    doctor_name: &str,
    date: NaiveDate,
    time: &str,
) -> EmailContent {
    let body = format!(
        "<p>Dear {},</p>\n<p>Your appointment has been confirmed with the following details:</p>\n{}\n\
<p>Please arrive 10 minutes early for your appointment.</p>\n<p>Thank you for choosing our healthcare service.</p>",
        escape_html(patient_name),
        detail_list(&[
            ("Doctor", format!("Dr. {}", doctor_name)),
            ("Date", date.to_string()),
            ("Time", time.to_string()),
        ]),
    );

    EmailContent {
        subject: "Appointment Confirmed".to_string(),
        html: layout("Appointment Confirmed", BLUE, &body),
    }
}

pub fn appointment_confirmed_sms(doctor_name: &str, date: NaiveDate, time: &str) -> String {
    format!(
        "Your appointment with Dr. {} on {} at {} is CONFIRMED.",
        doctor_name, date, time
    )
}

pub fn appointment_cancelled_email(
    patient_name: &str,
    doctor_name: &str,
    date: NaiveDate,
    time: &str,
) -> EmailContent {
    let body = format!(
        "<p>Dear {},</p>\n<p>We regret to inform you that your appointment has been cancelled.</p>\n{}\n\
<p>Please contact us to reschedule your appointment at your earliest convenience.</p>",
        escape_html(patient_name),
        detail_list(&[
            ("Doctor", format!("Dr. {}", doctor_name)),
            ("Date", date.to_string()),
            ("Time", time.to_string()),
        ]),
    );

    EmailContent {
        subject: "Appointment Cancelled".to_string(),
        html: layout("Appointment Cancelled", RED, &body),
    }
}

pub fn appointment_cancelled_sms(doctor_name: &str) -> String {
    format!(
        "Your appointment with Dr. {} has been cancelled. Please contact us for rescheduling.",
        doctor_name
    )
}

pub fn doctor_registration_pending_email(
    name: &str,
    email: &str,
    specialization: &str,
    department: &str,
) -> EmailContent {
    let body = format!(
        "<p>Dear Dr. <strong>{}</strong>,</p>\n<p>Thank you for registering with our Healthcare Management System.</p>\n\
<div class=\"box\"><p style=\"margin: 0; font-weight: 600;\">Pending Admin Approval</p>\
<p style=\"margin: 8px 0 0 0;\">Your account is currently under review by our administrative team. \
You will receive an email notification once your account has been approved.</p></div>\n{}\n\
<p>Please wait for admin approval before attempting to log in.</p>",
        escape_html(name),
        detail_list(&[
            ("Name", format!("Dr. {}", name)),
            ("Email", email.to_string()),
            ("Specialization", specialization.to_string()),
            ("Department", department.to_string()),
        ]),
    );

    EmailContent {
        subject: "Registration Received - Pending Approval".to_string(),
        html: layout("Registration Received", BLUE, &body),
    }
}

pub fn patient_welcome_email(name: &str, email: &str, role: &str) -> EmailContent {
    let body = format!(
        "<p>Dear <strong>{}</strong>,</p>\n<p>Your account has been created successfully! \
You can now log in and access our services.</p>\n{}\n<p>You can now book appointments, view medical records, \
and communicate with our healthcare professionals.</p>",
        escape_html(name),
        detail_list(&[("Email", email.to_string()), ("Role", role.to_string())]),
    );

    EmailContent {
        subject: "Welcome to Healthcare System".to_string(),
        html: layout("Welcome to Healthcare System", BLUE, &body),
    }
}

pub fn doctor_approved_email(
    name: &str,
    email: &str,
    specialization: &str,
    department: &str,
    frontend_url: &str,
) -> EmailContent {
    let login_url = format!("{}/login", frontend_url.trim_end_matches('/'));
    let body = format!(
        "<p>Dear Dr. <strong>{}</strong>,</p>\n<div class=\"box\"><p style=\"margin: 0; font-weight: 600;\">Congratulations!</p>\
<p style=\"margin: 8px 0 0 0;\">Your doctor account has been approved by our administrative team. \
You can now login and start using the Healthcare Management System.</p></div>\n{}\n\
<div style=\"text-align: center; margin-top: 20px;\"><a href=\"{}\">Login to Dashboard</a></div>",
        escape_html(name),
        detail_list(&[
            ("Name", format!("Dr. {}", name)),
            ("Email", email.to_string()),
            ("Specialization", specialization.to_string()),
            ("Department", department.to_string()),
            ("Approval Date", Utc::now().date_naive().to_string()),
        ]),
        escape_html(&login_url),
    );

    EmailContent {
        subject: "Account Approved - Welcome to Healthcare System".to_string(),
        html: layout("Account Approved", BLUE, &body),
    }
}

pub fn doctor_rejected_email(name: &str, reason: &str) -> EmailContent {
    let body = format!(
        "<p>Dear Dr. <strong>{}</strong>,</p>\n<p>Thank you for your interest in joining our Healthcare Management System.</p>\n\
<p>After careful review, we regret to inform you that we are unable to approve your application at this time.</p>\n\
<p style=\"font-weight: 600;\">Reason:</p>\n<p class=\"box\">{}</p>\n\
<p>If you have any questions or would like to discuss this decision, please contact our administrative team.</p>",
        escape_html(name),
        escape_html(reason),
    );

    EmailContent {
        subject: "Application Status Update".to_string(),
        html: layout("Application Update", RED, &body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_supplied_values_are_escaped() {
        let email = doctor_rejected_email("<script>", "a & b");
        assert!(email.html.contains("&lt;script&gt;"));
        assert!(email.html.contains("a &amp; b"));
        assert!(!email.html.contains("<script>"));
    }

    #[test]
    fn test_confirmation_mentions_doctor_and_slot() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let email = appointment_confirmed_email("Pat", "House", date, "10:30 AM");
        assert_eq!(email.subject, "Appointment Confirmed");
        assert!(email.html.contains("Dr. House"));
        assert!(email.html.contains("2026-03-14"));
        assert!(email.html.contains("10:30 AM"));

        let sms = appointment_confirmed_sms("House", date, "10:30 AM");
        assert_eq!(sms, "Your appointment with Dr. House on 2026-03-14 at 10:30 AM is CONFIRMED.");
    }

    #[test]
    fn test_approval_email_links_to_frontend_login() {
        let email = doctor_approved_email("Grey", "grey@example.com", "Surgery", "Cardiology", "https://app.test/");
        assert!(email.html.contains("href=\"https://app.test/login\""));
    }
}
