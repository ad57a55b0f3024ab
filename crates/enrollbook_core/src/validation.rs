//! Field-level checks for inbound requests.
//!
//! # Responsibility
//! - Validate raw request payloads before they reach repositories/services.
//! - Convert validated payloads into the typed arguments the core expects.
//!
//! # Invariants
//! - Validation is pure: no repository access, no logging of field values.
//! - Checks run in field order and report the first failure.

use crate::error::ErrorKind;
use crate::model::entry::{EntryId, EntryStatus};
use crate::model::user::{NewUser, UserId, UserProfile};
use crate::model::RecordId;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

/// Calendar date format accepted for entries.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").expect("valid email regex"));
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9]{11}$").expect("valid phone regex"));

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is empty")]
    Empty(&'static str),
    #[error("invalid email address")]
    InvalidEmail,
    #[error("invalid phone number")]
    InvalidPhone,
    #[error("invalid date `{0}`; expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("invalid {0}; expected a positive integer")]
    InvalidId(&'static str),
    #[error("unknown status `{0}`")]
    UnknownStatus(String),
}

impl ValidationError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidInput
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RegisterUserRequest {
    pub login: String,
    pub password: String,
    pub name: String,
    pub surname: String,
    pub patronymic: String,
    pub phone: String,
    pub email: String,
}

impl RegisterUserRequest {
    pub fn validate(&self) -> ValidationResult<()> {
        require("login", &self.login)?;
        require("password", &self.password)?;
        require("name", &self.name)?;
        require("surname", &self.surname)?;
        require("patronymic", &self.patronymic)?;
        validate_phone(&self.phone)?;
        validate_email(&self.email)
    }

    /// Validates and converts into a non-admin registration candidate.
    pub fn into_candidate(self) -> ValidationResult<NewUser> {
        self.validate()?;
        let profile = UserProfile {
            name: self.name,
            surname: self.surname,
            patronymic: self.patronymic,
            phone: self.phone,
            email: self.email,
        };
        Ok(NewUser::new(self.login, self.password, profile))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> ValidationResult<()> {
        require("login", &self.login)?;
        require("password", &self.password)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CreateEntryRequest {
    pub course: String,
    pub date: String,
    pub user_id: i64,
    pub payment_method: String,
}

/// Typed arguments for `EntryRepository::create_entry`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDraft {
    pub course: String,
    pub date: NaiveDate,
    pub user_id: UserId,
    pub payment_method: String,
}

impl CreateEntryRequest {
    pub fn validate(&self) -> ValidationResult<EntryDraft> {
        require("course", &self.course)?;
        let date = parse_date(&self.date)?;
        let user_id = positive_id("user_id", self.user_id)?;
        require("payment_method", &self.payment_method)?;
        Ok(EntryDraft {
            course: self.course.clone(),
            date,
            user_id,
            payment_method: self.payment_method.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpdateEntryStatusRequest {
    pub id: i64,
    pub status: String,
}

impl UpdateEntryStatusRequest {
    pub fn validate(&self) -> ValidationResult<(EntryId, EntryStatus)> {
        let id = positive_id("id", self.id)?;
        let status = self
            .status
            .parse::<EntryStatus>()
            .map_err(|err| ValidationError::UnknownStatus(err.0))?;
        Ok((id, status))
    }
}

pub fn validate_email(email: &str) -> ValidationResult<()> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

/// Accepts 11 digits with an optional leading `+`.
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    if phone.is_empty() {
        return Err(ValidationError::Empty("phone"));
    }
    if PHONE_RE.is_match(phone) {
        Ok(())
    } else {
        Err(ValidationError::InvalidPhone)
    }
}

pub fn parse_date(value: &str) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(value.to_string()))
}

fn require(field: &'static str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        Err(ValidationError::Empty(field))
    } else {
        Ok(())
    }
}

fn positive_id(field: &'static str, value: i64) -> ValidationResult<RecordId> {
    RecordId::try_from(value)
        .ok()
        .filter(|id| *id > 0)
        .ok_or(ValidationError::InvalidId(field))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_request() -> RegisterUserRequest {
        RegisterUserRequest {
            login: "login123".to_string(),
            password: "pass123".to_string(),
            name: "Ivan".to_string(),
            surname: "Ivanov".to_string(),
            patronymic: "Ivanovich".to_string(),
            phone: "+79991234567".to_string(),
            email: "ivan@example.com".to_string(),
        }
    }

    #[test]
    fn phone_rules() {
        let cases = [
            ("13052858783", Ok(())),
            ("+79991234567", Ok(())),
            ("", Err(ValidationError::Empty("phone"))),
            ("83746", Err(ValidationError::InvalidPhone)),
            ("289374628479356238947563789", Err(ValidationError::InvalidPhone)),
            ("8-999-123-45", Err(ValidationError::InvalidPhone)),
        ];
        for (phone, expected) in cases {
            assert_eq!(validate_phone(phone), expected, "phone `{phone}`");
        }
    }

    #[test]
    fn email_rules() {
        assert!(validate_email("ivan@example.com").is_ok());
        assert!(validate_email("a.b+c@mail.example.org").is_ok());
        for bad in ["", "ivan", "ivan@", "@example.com", "ivan@example", "iv an@example.com"] {
            assert_eq!(validate_email(bad), Err(ValidationError::InvalidEmail), "{bad}");
        }
    }

    #[test]
    fn register_request_converts_to_candidate() {
        let candidate = register_request().into_candidate().unwrap();
        assert_eq!(candidate.login, "login123");
        assert_eq!(candidate.profile.patronymic, "Ivanovich");
        assert!(!candidate.is_admin);
    }

    #[test]
    fn register_request_reports_first_empty_field() {
        let request = RegisterUserRequest {
            surname: "  ".to_string(),
            patronymic: String::new(),
            ..register_request()
        };
        assert_eq!(request.validate(), Err(ValidationError::Empty("surname")));
    }

    #[test]
    fn login_request_requires_both_fields() {
        let request = LoginRequest {
            login: "ivan".to_string(),
            password: String::new(),
        };
        assert_eq!(request.validate(), Err(ValidationError::Empty("password")));
    }

    #[test]
    fn entry_request_parses_date_and_user() {
        let request = CreateEntryRequest {
            course: "rust".to_string(),
            date: "2025-09-01".to_string(),
            user_id: 3,
            payment_method: "card".to_string(),
        };
        let draft = request.validate().unwrap();
        assert_eq!(draft.date, NaiveDate::from_ymd_opt(2025, 9, 1).unwrap());
        assert_eq!(draft.user_id, 3);

        let bad_date = CreateEntryRequest {
            date: "01.09.2025".to_string(),
            ..request.clone()
        };
        assert!(matches!(
            bad_date.validate(),
            Err(ValidationError::InvalidDate(_))
        ));

        let bad_user = CreateEntryRequest {
            user_id: -1,
            ..request
        };
        assert_eq!(
            bad_user.validate(),
            Err(ValidationError::InvalidId("user_id"))
        );
    }

    #[test]
    fn status_request_accepts_known_statuses() {
        let request = UpdateEntryStatusRequest {
            id: 1,
            status: "processed".to_string(),
        };
        assert_eq!(request.validate(), Ok((1, EntryStatus::Processed)));

        let unknown = UpdateEntryStatusRequest {
            id: 1,
            status: "done".to_string(),
        };
        assert_eq!(
            unknown.validate(),
            Err(ValidationError::UnknownStatus("done".to_string()))
        );

        let zero = UpdateEntryStatusRequest {
            id: 0,
            status: "processed".to_string(),
        };
        assert_eq!(zero.validate(), Err(ValidationError::InvalidId("id")));
    }

    #[test]
    fn requests_deserialize_from_json() {
        let request: CreateEntryRequest = serde_json::from_str(
            r#"{"course":"go","date":"2025-01-02","user_id":5,"payment_method":"cash"}"#,
        )
        .unwrap();
        assert_eq!(request.user_id, 5);
    }
}
