use crate::api::schemas::RsvpForm;
use crate::domain::submission::{Attendance, Companion, Locale, Submission};
use crate::error::FieldError;
use regex::Regex;
use std::net::IpAddr;
use std::sync::LazyLock;
use time::OffsetDateTime;

/// Free-text fields are capped to bound storage and rendering risk.
const MAX_FIELD_LEN: usize = 100;

const MAX_EMAIL_LEN: usize = 254;

/// Domains of throwaway mailbox providers. Syntactically valid addresses on
/// these domains are rejected outright.
const DISPOSABLE_DOMAINS: &[&str] = &[
    "mailinator.com",
    "guerrillamail.com",
    "sharklasers.com",
    "10minutemail.com",
    "tempmail.com",
    "temp-mail.org",
    "trashmail.com",
    "yopmail.com",
    "getnada.com",
];

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}$").expect("email pattern is valid"));

fn sanitize_to(raw: &str, cap: usize) -> String {
    let stripped: String = raw.chars().filter(|c| !matches!(c, '<' | '>' | '"' | '\'')).collect();
    stripped.trim().chars().take(cap).collect()
}

/// Strips HTML-significant characters, trims, and caps the length. Runs before
/// any presence check, so a field that is empty after stripping reports as missing.
fn sanitize(raw: &str) -> String {
    sanitize_to(raw, MAX_FIELD_LEN)
}

fn sanitized(value: Option<&str>) -> String {
    value.map(sanitize).unwrap_or_default()
}

/// Form checkboxes arrive as `on` when ticked; JSON clients send `true`.
fn is_checked(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some("on" | "true" | "1"))
}

fn email_error(email: &str) -> Option<&'static str> {
    if email.len() > MAX_EMAIL_LEN {
        return Some("Email address is too long");
    }
    if email.contains("..")
        || email.starts_with('.')
        || email.ends_with('.')
        || email.contains("@.")
        || email.contains(".@")
        || !EMAIL_PATTERN.is_match(email)
    {
        return Some("Please enter a valid email address");
    }
    if let Some((_, domain)) = email.rsplit_once('@')
        && DISPOSABLE_DOMAINS.contains(&domain)
    {
        return Some("Disposable email addresses are not allowed");
    }
    None
}

/// Turns raw form fields into a validated, sanitized [`Submission`].
///
/// Collects every failure instead of short-circuiting, so the caller can report
/// all invalid fields at once.
///
/// # Errors
/// Returns the full list of field errors when any field is missing or malformed.
pub fn validate(
    form: &RsvpForm,
    submitted_at: OffsetDateTime,
    origin: IpAddr,
    user_agent: Option<String>,
) -> Result<Submission, Vec<FieldError>> {
    let mut errors = Vec::new();

    let first_name = sanitized(form.first_name.as_deref());
    if first_name.is_empty() {
        errors.push(FieldError::new("firstName", "First name is required".to_string()));
    }

    let last_name = sanitized(form.last_name.as_deref());
    if last_name.is_empty() {
        errors.push(FieldError::new("lastName", "Last name is required".to_string()));
    }

    // Addresses up to the 254-unit limit must survive intact; cap one past it
    // so the overlong rejection still fires.
    let email = sanitize_to(form.email.as_deref().unwrap_or_default(), MAX_EMAIL_LEN + 1).to_lowercase();
    if email.is_empty() {
        errors.push(FieldError::new("email", "Email is required".to_string()));
    } else if let Some(message) = email_error(&email) {
        errors.push(FieldError::new("email", message.to_string()));
    }

    let attendance_token = sanitized(form.attendance.as_deref()).to_lowercase();
    let attendance = match attendance_token.as_str() {
        "yes" => Some(Attendance::Attending),
        "no" => Some(Attendance::Declining),
        _ => {
            errors.push(FieldError::new("attendance", "Please select your attendance".to_string()));
            None
        }
    };

    let plus_one = if is_checked(form.plus_one.as_deref()) {
        let companion_first = sanitized(form.plus_one_first_name.as_deref());
        if companion_first.is_empty() {
            errors.push(FieldError::new("plusOneFirstName", "Plus one first name is required".to_string()));
        }
        let companion_last = sanitized(form.plus_one_last_name.as_deref());
        if companion_last.is_empty() {
            errors.push(FieldError::new("plusOneLastName", "Plus one last name is required".to_string()));
        }
        Some(Companion {
            first_name: companion_first,
            last_name: companion_last,
            vegetarian: is_checked(form.plus_one_vegetarian.as_deref()),
        })
    } else {
        None
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    let message = Some(sanitized(form.message.as_deref())).filter(|m| !m.is_empty());

    Ok(Submission {
        first_name,
        last_name,
        email,
        attendance: attendance.unwrap_or(Attendance::Declining),
        vegetarian: is_checked(form.vegetarian.as_deref()),
        plus_one,
        message,
        locale: Locale::from_tag(form.language.as_deref().unwrap_or("")),
        submitted_at,
        origin,
        user_agent,
    })
}
