// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User model for storage and API.

use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// User profile stored in the `users` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Google subject id (also used as document ID)
    pub google_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Profile picture URL
    pub profile_pic: Option<String>,

    // ─── Self-reported profile ───────────────────────────────────
    #[serde(default)]
    pub major: Option<String>,
    #[serde(default)]
    pub grade_level: Option<String>,
    #[serde(default)]
    pub graduation_year: Option<i32>,
    #[serde(default)]
    pub housing_type: Option<String>,
    #[serde(default)]
    pub preferred_parking_types: Option<Vec<String>>,

    /// When the user first signed in (ISO 8601)
    pub created_at: String,
    /// Most recent sign-in (ISO 8601)
    pub last_login: String,
}

fn is_filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

impl User {
    /// Whether the user has supplied enough of their profile to be onboarded.
    pub fn is_profile_complete(&self) -> bool {
        is_filled(&self.major) && is_filled(&self.grade_level) && is_filled(&self.housing_type)
    }

    /// Apply every field present in `patch`, leaving the others untouched.
    pub fn apply_patch(&mut self, patch: ProfilePatch) {
        if let Some(major) = patch.major {
            self.major = major;
        }
        if let Some(grade_level) = patch.grade_level {
            self.grade_level = grade_level;
        }
        if let Some(graduation_year) = patch.graduation_year {
            self.graduation_year = graduation_year;
        }
        if let Some(housing_type) = patch.housing_type {
            self.housing_type = housing_type;
        }
        if let Some(types) = patch.preferred_parking_types {
            self.preferred_parking_types = types;
        }
    }

    /// Preferred parking types, or an empty slice when none are recorded.
    pub fn preferred_types(&self) -> &[String] {
        self.preferred_parking_types.as_deref().unwrap_or(&[])
    }
}

/// Partial profile update.
///
/// The outer `Option` records whether the field was present in the request;
/// the inner one carries the new value, where `null` clears the field.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ProfilePatch {
    #[serde(default, deserialize_with = "present")]
    #[validate(length(max = 100))]
    pub major: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[validate(length(max = 100))]
    pub grade_level: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[validate(range(min = 1900, max = 2100))]
    pub graduation_year: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present")]
    #[validate(length(max = 100))]
    pub housing_type: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[validate(length(max = 10), custom(function = "validate_parking_types"))]
    pub preferred_parking_types: Option<Option<Vec<String>>>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.major.is_none()
            && self.grade_level.is_none()
            && self.graduation_year.is_none()
            && self.housing_type.is_none()
            && self.preferred_parking_types.is_none()
    }
}

/// Marks a field as present even when its value is `null`.
fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

const MAX_PARKING_TYPE_LEN: usize = 50;

fn validate_parking_types(types: &[String]) -> Result<(), validator::ValidationError> {
    if types
        .iter()
        .any(|t| t.trim().is_empty() || t.len() > MAX_PARKING_TYPE_LEN)
    {
        return Err(validator::ValidationError::new("parking_type_length"));
    }
    Ok(())
}

/// Flat user representation returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserDict {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub profile_pic: Option<String>,
    pub major: Option<String>,
    pub grade_level: Option<String>,
    pub graduation_year: Option<i32>,
    pub housing_type: Option<String>,
    pub preferred_parking_types: Vec<String>,
    pub profile_complete: bool,
    pub created_at: String,
    pub last_login: String,
}

impl From<&User> for UserDict {
    fn from(user: &User) -> Self {
        Self {
            id: user.google_id.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            profile_pic: user.profile_pic.clone(),
            major: user.major.clone(),
            grade_level: user.grade_level.clone(),
            graduation_year: user.graduation_year,
            housing_type: user.housing_type.clone(),
            preferred_parking_types: user.preferred_types().to_vec(),
            profile_complete: user.is_profile_complete(),
            created_at: user.created_at.clone(),
            last_login: user.last_login.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_user() -> User {
        User {
            google_id: "sub-1".to_string(),
            email: "student@example.edu".to_string(),
            first_name: "Test".to_string(),
            last_name: "Student".to_string(),
            profile_pic: None,
            major: None,
            grade_level: None,
            graduation_year: None,
            housing_type: None,
            preferred_parking_types: None,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            last_login: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_profile_completeness_is_derived() {
        let mut user = blank_user();
        assert!(!user.is_profile_complete());

        user.major = Some("Physics".to_string());
        user.grade_level = Some("Junior".to_string());
        assert!(!user.is_profile_complete());

        user.housing_type = Some("   ".to_string());
        assert!(!user.is_profile_complete());

        user.housing_type = Some("Off-campus".to_string());
        assert!(user.is_profile_complete());
    }

    #[test]
    fn test_patch_distinguishes_absent_from_null() {
        let patch: ProfilePatch =
            serde_json::from_str(r#"{"major": null, "graduation_year": 2027}"#).unwrap();

        assert_eq!(patch.major, Some(None));
        assert_eq!(patch.graduation_year, Some(Some(2027)));
        assert_eq!(patch.grade_level, None);
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_apply_patch_only_touches_present_fields() {
        let mut user = blank_user();
        user.major = Some("History".to_string());
        user.housing_type = Some("Dorm".to_string());

        let patch: ProfilePatch =
            serde_json::from_str(r#"{"major": "Math", "housing_type": null}"#).unwrap();
        user.apply_patch(patch);

        assert_eq!(user.major.as_deref(), Some("Math"));
        assert_eq!(user.housing_type, None);
        assert_eq!(user.grade_level, None);
        assert_eq!(user.email, "student@example.edu");
    }

    #[test]
    fn test_patch_rejects_unknown_fields() {
        let result: Result<ProfilePatch, _> = serde_json::from_str(r#"{"email": "x@y.z"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_patch_validation() {
        let patch: ProfilePatch = serde_json::from_str(r#"{"graduation_year": 1800}"#).unwrap();
        assert!(patch.validate().is_err());

        let patch: ProfilePatch =
            serde_json::from_str(r#"{"preferred_parking_types": ["lot", ""]}"#).unwrap();
        assert!(patch.validate().is_err());

        let patch: ProfilePatch =
            serde_json::from_str(r#"{"preferred_parking_types": null, "major": "Art"}"#).unwrap();
        assert!(patch.validate().is_ok());
    }
}
