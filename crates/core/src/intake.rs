//! Multi-step symptom intake wizard
//!
//! The intake form is filled in four steps. Moving forward only validates the
//! fields of the active step; finishing validates everything and produces the
//! record the backend accepts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::IntakeSubmission;
use crate::validation::{ValidationErrors, fields};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntakeStep {
    PersonalDetails,
    Symptoms,
    Location,
    Insurance,
}

impl IntakeStep {
    pub const ALL: [IntakeStep; 4] = [
        IntakeStep::PersonalDetails,
        IntakeStep::Symptoms,
        IntakeStep::Location,
        IntakeStep::Insurance,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::PersonalDetails => "Personal Details",
            Self::Symptoms => "Symptoms & Concerns",
            Self::Location => "Location Information",
            Self::Insurance => "Insurance Information",
        }
    }

    /// Form fields owned by this step, using the form's field names
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            Self::PersonalDetails => &["name", "phoneNumber", "age", "email"],
            Self::Symptoms => &[
                "primarySymptoms",
                "duration",
                "urgencyLevel",
                "severity",
                "detailedDescription",
            ],
            Self::Location => &["address", "city", "state", "pincode"],
            Self::Insurance => &["insuranceProvider", "insurancePlan", "memberId"],
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn previous(self) -> Option<Self> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }
}

impl fmt::Display for IntakeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl Urgency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl FromStr for Urgency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err("Urgency level must be Low, Medium or High".into()),
        }
    }
}

/// Symptom severity on the 1 (barely noticeable) to 10 (worst possible) scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Severity(u8);

impl Severity {
    pub fn new(value: u8) -> Option<Self> {
        (1..=10).contains(&value).then_some(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .ok()
            .and_then(Severity::new)
            .ok_or_else(|| "Severity must be a number from 1 to 10".to_string())
    }
}

/// Everything the patient has typed so far
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntakeDraft {
    pub name: String,
    pub phone_number: String,
    pub age: String,
    pub email: String,
    pub primary_symptoms: Vec<String>,
    pub duration: String,
    pub urgency_level: String,
    pub severity: String,
    pub detailed_description: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub insurance_provider: String,
    pub insurance_plan: String,
    pub member_id: String,
}

impl IntakeDraft {
    /// Add a symptom unless it is blank or already listed
    pub fn add_symptom(&mut self, symptom: &str) -> bool {
        let symptom = symptom.trim();
        if symptom.is_empty() || self.primary_symptoms.iter().any(|s| s == symptom) {
            return false;
        }
        self.primary_symptoms.push(symptom.to_string());
        true
    }

    pub fn remove_symptom(&mut self, symptom: &str) {
        self.primary_symptoms.retain(|s| s != symptom);
    }

    /// Check a single field by its form name
    pub fn validate_field(&self, field: &str) -> Result<(), String> {
        match field {
            "name" => fields::name(&self.name),
            "phoneNumber" => fields::phone(&self.phone_number),
            "age" => fields::age(&self.age),
            "email" => fields::email(&self.email),
            "primarySymptoms" => fields::symptoms(&self.primary_symptoms),
            "duration" => fields::required(&self.duration, "Duration is required"),
            "urgencyLevel" => {
                fields::required(&self.urgency_level, "Urgency level is required")?;
                self.urgency_level.parse::<Urgency>().map(|_| ())
            }
            "severity" => {
                fields::required(&self.severity, "Severity level is required")?;
                self.severity.parse::<Severity>().map(|_| ())
            }
            "detailedDescription" => fields::description(&self.detailed_description),
            "address" => fields::address(&self.address),
            "city" => fields::city(&self.city),
            "state" => fields::state(&self.state),
            "pincode" => fields::pincode(&self.pincode),
            "insuranceProvider" => {
                fields::required(&self.insurance_provider, "Insurance provider is required")
            }
            "insurancePlan" => {
                fields::required(&self.insurance_plan, "Please select your insurance plan")
            }
            "memberId" => fields::required(&self.member_id, "Member ID is required"),
            _ => Ok(()),
        }
    }

    pub fn validate_step(&self, step: IntakeStep) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        for field in step.fields() {
            errors.check(field, self.validate_field(field));
        }
        errors
    }

    pub fn validate_all(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        for step in IntakeStep::ALL {
            errors.merge(self.validate_step(step));
        }
        errors
    }

    /// Build the backend record without validating
    pub fn to_submission(&self, user_id: &str) -> IntakeSubmission {
        let member_id = self.member_id.trim();
        IntakeSubmission {
            user_id: user_id.to_string(),
            primary_symptoms: self.primary_symptoms.join(", "),
            duration: self.duration.clone(),
            urgency_level: self.urgency_level.clone(),
            severity: self.severity.clone(),
            detailed_description: self.detailed_description.clone(),
            address: self.address.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            pincode: self.pincode.clone(),
            insurance_provider: self.insurance_provider.clone(),
            insurance_plan: self.insurance_plan.clone(),
            member_id: (!member_id.is_empty()).then(|| member_id.to_string()),
        }
    }
}

/// Step-by-step driver over an [`IntakeDraft`]
#[derive(Debug, Clone)]
pub struct IntakeWizard {
    draft: IntakeDraft,
    step: IntakeStep,
}

impl Default for IntakeWizard {
    fn default() -> Self {
        Self::new(IntakeDraft::default())
    }
}

impl IntakeWizard {
    pub fn new(draft: IntakeDraft) -> Self {
        Self {
            draft,
            step: IntakeStep::PersonalDetails,
        }
    }

    pub fn step(&self) -> IntakeStep {
        self.step
    }

    pub fn draft(&self) -> &IntakeDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut IntakeDraft {
        &mut self.draft
    }

    pub fn is_last_step(&self) -> bool {
        self.step.next().is_none()
    }

    /// Validate the active step and move forward.
    ///
    /// On the last step a valid form stays where it is.
    pub fn next(&mut self) -> Result<IntakeStep, ValidationErrors> {
        self.draft.validate_step(self.step).into_result()?;
        if let Some(next) = self.step.next() {
            self.step = next;
        }
        Ok(self.step)
    }

    pub fn back(&mut self) -> IntakeStep {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
        self.step
    }

    /// Validate every step and produce the submission for `user_id`
    pub fn finish(&self, user_id: &str) -> Result<IntakeSubmission, ValidationErrors> {
        self.draft.validate_all().into_result()?;
        Ok(self.draft.to_submission(user_id))
    }
}
