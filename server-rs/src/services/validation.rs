use regex::Regex;
use std::sync::OnceLock;

use crate::config::DeploymentMode;
use crate::models::{FieldErrors, JoinApplication, JoinSubmission, TierCatalog, TierNotFound};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Fields(FieldErrors),
    UnknownTier(TierNotFound),
}

/// Loose structural check, not RFC 5322. Unanchored on purpose so it
/// accepts exactly what the join page accepts.
fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern compiles"))
}

pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email)
}

pub struct FormValidator<'a> {
    catalog: &'a TierCatalog,
    mode: DeploymentMode,
    require_country: bool,
}

impl<'a> FormValidator<'a> {
    pub fn new(catalog: &'a TierCatalog, mode: DeploymentMode, require_country: bool) -> Self {
        Self {
            catalog,
            mode,
            require_country,
        }
    }

    /// Reports every invalid field at once. The tier is only looked up once
    /// the form itself is complete.
    pub fn validate(&self, input: &JoinSubmission) -> Result<JoinApplication, ValidationError> {
        let mut errors = FieldErrors::new();

        let first_name = required(&input.first_name);
        if first_name.is_none() {
            errors.insert("firstName", "First name is required");
        }
        let last_name = required(&input.last_name);
        if last_name.is_none() {
            errors.insert("lastName", "Last name is required");
        }
        let email = required(&input.email);
        match email {
            None => errors.insert("email", "Email is required"),
            Some(e) if !is_valid_email(e) => errors.insert("email", "Please enter a valid email"),
            Some(_) => {}
        }
        let phone = required(&input.phone);
        if phone.is_none() {
            errors.insert("phone", "Phone number is required");
        }
        let tier = required(&input.tier);
        if tier.is_none() {
            errors.insert("tier", "Please select a membership tier");
        }
        let country = required(&input.country);
        if self.require_country && country.is_none() {
            errors.insert("country", "Country is required");
        }

        let (Some(first_name), Some(last_name), Some(email), Some(phone), Some(tier)) =
            (first_name, last_name, email, phone, tier)
        else {
            return Err(ValidationError::Fields(errors));
        };
        if !errors.is_empty() {
            return Err(ValidationError::Fields(errors));
        }

        let tier = self
            .catalog
            .resolve_for(tier, self.mode)
            .map_err(ValidationError::UnknownTier)?;

        Ok(JoinApplication {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            tier_id: tier.id.to_string(),
            company: optional(&input.company),
            linkedin: optional(&input.linkedin),
            message: optional(&input.message),
            country: country.map(str::to_string),
            order_id: optional(&input.order_id),
        })
    }
}

fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn optional(value: &Option<String>) -> Option<String> {
    required(value).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> JoinSubmission {
        JoinSubmission {
            first_name: Some("Jane".into()),
            last_name: Some("Doe".into()),
            email: Some("jane@x.com".into()),
            phone: Some("555".into()),
            tier: Some("pioneer".into()),
            ..JoinSubmission::default()
        }
    }

    fn validator(require_country: bool) -> FormValidator<'static> {
        FormValidator::new(
            TierCatalog::standard(),
            DeploymentMode::Sandbox,
            require_country,
        )
    }

    fn field_errors(result: Result<JoinApplication, ValidationError>) -> FieldErrors {
        match result {
            Err(ValidationError::Fields(errors)) => errors,
            other => panic!("expected field errors, got {other:?}"),
        }
    }

    #[test]
    fn accepts_a_complete_submission() {
        let mut input = complete();
        input.company = Some("  ".into());
        input.message = Some(" Building things ".into());
        let app = validator(false).validate(&input).unwrap();
        assert_eq!(app.first_name, "Jane");
        assert_eq!(app.tier_id, "pioneer");
        assert_eq!(app.company, None);
        assert_eq!(app.message.as_deref(), Some("Building things"));
    }

    #[test]
    fn reports_exactly_the_missing_required_fields() {
        let cases: &[(&str, fn(&mut JoinSubmission))] = &[
            ("firstName", |s| s.first_name = None),
            ("lastName", |s| s.last_name = Some("   ".into())),
            ("email", |s| s.email = Some(String::new())),
            ("phone", |s| s.phone = None),
        ];
        for (field, clear) in cases {
            let mut input = complete();
            clear(&mut input);
            let errors = field_errors(validator(false).validate(&input));
            assert_eq!(errors.fields().collect::<Vec<_>>(), [*field]);
        }

        let errors = field_errors(validator(false).validate(&JoinSubmission::default()));
        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            ["email", "firstName", "lastName", "phone", "tier"]
        );
    }

    #[test]
    fn blank_first_name_and_bad_email_reported_together() {
        let mut input = complete();
        input.first_name = Some(String::new());
        input.email = Some("not-an-email".into());
        let errors = field_errors(validator(false).validate(&input));
        assert_eq!(errors.len(), 2);
        assert!(errors.contains("firstName"));
        assert_eq!(errors.get("email"), Some("Please enter a valid email"));
    }

    #[test]
    fn email_shape_check_is_permissive() {
        for ok in ["a@b.c", "jane.doe+tag@mail.example.org", "x y@z.w"] {
            assert!(is_valid_email(ok), "{ok} should pass");
        }
        for bad in ["plainaddress", "jane@localhost", "@x.com", "jane@.", "jane.x.com"] {
            assert!(!is_valid_email(bad), "{bad} should fail");
        }
    }

    #[test]
    fn country_only_required_in_payment_variant() {
        assert!(validator(false).validate(&complete()).is_ok());
        let errors = field_errors(validator(true).validate(&complete()));
        assert_eq!(errors.fields().collect::<Vec<_>>(), ["country"]);

        let mut input = complete();
        input.country = Some("Kenya".into());
        let app = validator(true).validate(&input).unwrap();
        assert_eq!(app.country.as_deref(), Some("Kenya"));
    }

    #[test]
    fn unknown_tier_is_distinct_from_missing_tier() {
        let mut input = complete();
        input.tier = Some("bogus".into());
        assert_eq!(
            validator(false).validate(&input),
            Err(ValidationError::UnknownTier(TierNotFound("bogus".into())))
        );

        input.tier = None;
        let errors = field_errors(validator(false).validate(&input));
        assert!(errors.contains("tier"));
    }

    #[test]
    fn test_tier_rejected_in_live_mode() {
        let mut input = complete();
        input.tier = Some("test".into());
        let live = FormValidator::new(TierCatalog::standard(), DeploymentMode::Live, false);
        assert!(matches!(
            live.validate(&input),
            Err(ValidationError::UnknownTier(_))
        ));
        assert!(validator(false).validate(&input).is_ok());
    }
}
