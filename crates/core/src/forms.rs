//! Login and registration forms

use serde::{Deserialize, Serialize};

use crate::types::{LoginRequest, RegisterRequest};
use crate::validation::{ValidationErrors, fields};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<LoginRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check("email", fields::email(&self.email));
        errors.check("password", fields::password_present(&self.password));
        errors.into_result()?;

        Ok(LoginRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<RegisterRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check("name", fields::name(&self.name));
        errors.check("email", fields::email(&self.email));
        errors.check("password", fields::password(&self.password));
        if self.password != self.confirm_password {
            errors.add("confirmPassword", "Passwords do not match");
        }
        errors.check("phone", fields::optional_phone(&self.phone));
        errors.into_result()?;

        let phone = self.phone.trim();
        Ok(RegisterRequest {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            phone: (!phone.is_empty()).then(|| phone.to_string()),
        })
    }
}
