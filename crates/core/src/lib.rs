//! carelink core types and utilities

pub mod credentials;
pub mod error;
pub mod file_store;
pub mod forms;
pub mod intake;
pub mod types;
pub mod validation;

pub use credentials::{
    ACCESS_TOKEN_KEY, CredentialPair, CredentialStore, MemoryCredentialStore, REFRESH_TOKEN_KEY,
    StoredSession, USER_KEY,
};
pub use error::{CoreError, CoreResult};
pub use file_store::FileCredentialStore;
pub use forms::{LoginForm, RegistrationForm};
pub use intake::{IntakeDraft, IntakeStep, IntakeWizard, Severity, Urgency};
pub use types::{
    AppointmentSlot, Booking, BookingAck, BookingConfirmation, BookingStatus, CareSummary,
    CareTipsRequest, CareTipsResponse, IntakeSubmission, LoginRequest, Provider,
    ProviderMatchQuery, RefreshRequest, RegisterRequest, TokenResponse, UserProfile,
};
pub use validation::{ValidateConfig, ValidationErrors, validators};
