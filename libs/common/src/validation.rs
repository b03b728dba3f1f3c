//! Field-local form validation
//!
//! Validation runs before any request is built; a form that fails here never
//! reaches the network. Each failing field maps to one message.

use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use crate::models::SessionForm;
use crate::status::parse_date;

/// Messages for every field that failed validation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the first failure for `field`
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_insert_with(|| message.into());
    }

    fn check(&mut self, field: &'static str, result: Result<(), String>) {
        if let Err(message) = result {
            self.add(field, message);
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.fields {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Validate that a text field is present
pub fn validate_required(value: &str, message: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(message.to_string());
    }
    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate a sign-up password
pub fn validate_password(password: &str, email: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Please enter your password".to_string());
    }

    if password.chars().count() < 6 {
        return Err("Password must contain at least 6 characters".to_string());
    }

    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    if !(has_lower && has_upper) {
        return Err("Password must contain both lower and upper case letters".to_string());
    }

    static DIGIT_OR_SYMBOL: OnceLock<Regex> = OnceLock::new();
    let regex = DIGIT_OR_SYMBOL.get_or_init(|| {
        Regex::new(r#"[0-9!@#$%^&*(),.?":{}|<>]"#).expect("Failed to compile symbol regex")
    });
    if !regex.is_match(password) {
        return Err("Password must contain at least one number or a symbol".to_string());
    }

    if !email.is_empty() && password.contains(email) {
        return Err("Password must not contain your email address".to_string());
    }

    Ok(())
}

/// Validate an http(s) resource link
pub fn validate_link(link: &str) -> Result<(), String> {
    validate_required(link, "Resource link is required")?;

    static LINK_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = LINK_REGEX
        .get_or_init(|| Regex::new(r"^https?://\S+$").expect("Failed to compile link regex"));

    if !regex.is_match(link.trim()) {
        return Err("Resource link must be an http(s) URL".to_string());
    }
    Ok(())
}

fn validate_date(field: &'static str, value: &str, required: &str) -> Result<(), String> {
    validate_required(value, required)?;
    parse_date(field, Some(value)).map(|_| ()).map_err(|e| e.to_string())
}

fn validate_order(
    errors: &mut ValidationErrors,
    (start_field, start): (&'static str, &str),
    (end_field, end): (&'static str, &str),
    message: &str,
) {
    if errors.get(start_field).is_some() || errors.get(end_field).is_some() {
        return;
    }
    if let (Ok(start), Ok(end)) = (
        parse_date(start_field, Some(start)),
        parse_date(end_field, Some(end)),
    ) {
        if start > end {
            errors.add(end_field, message);
        }
    }
}

/// Validate the tutor's session creation form
pub fn validate_session_form(form: &SessionForm) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    errors.check(
        "title",
        validate_required(&form.title, "Session title is required"),
    );
    errors.check(
        "description",
        validate_required(&form.description, "Description is required"),
    );
    errors.check(
        "registrationStart",
        validate_date(
            "registrationStart",
            &form.registration_start,
            "Registration start date is required",
        ),
    );
    errors.check(
        "registrationEnd",
        validate_date(
            "registrationEnd",
            &form.registration_end,
            "Registration end date is required",
        ),
    );
    errors.check(
        "classStart",
        validate_date("classStart", &form.class_start, "Class start date is required"),
    );
    errors.check(
        "classEnd",
        validate_date("classEnd", &form.class_end, "Class end date is required"),
    );
    errors.check(
        "duration",
        validate_required(&form.duration, "Session duration is required"),
    );

    validate_order(
        &mut errors,
        ("registrationStart", &form.registration_start),
        ("registrationEnd", &form.registration_end),
        "Registration must end after it starts",
    );
    validate_order(
        &mut errors,
        ("classStart", &form.class_start),
        ("classEnd", &form.class_end),
        "Class must end after it starts",
    );

    errors.into_result()
}

/// Validate a note's title and description
pub fn validate_note(title: &str, description: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.check("title", validate_required(title, "Title is required"));
    errors.check(
        "description",
        validate_required(description, "Description is required"),
    );
    errors.into_result()
}

/// Validate a material's title and link
pub fn validate_material(title: &str, resource_link: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.check("title", validate_required(title, "Title is required"));
    errors.check("resourceLink", validate_link(resource_link));
    errors.into_result()
}

/// Fields of the sign-up form
#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub has_photo: bool,
}

/// Validate the sign-up form
pub fn validate_sign_up(form: &SignUpForm) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.check("name", validate_required(&form.name, "Please enter your name"));
    if !form.has_photo {
        errors.add("photo", "Please select a photo");
    }
    errors.check("email", validate_email(&form.email));
    errors.check("password", validate_password(&form.password, &form.email));
    errors.into_result()
}
