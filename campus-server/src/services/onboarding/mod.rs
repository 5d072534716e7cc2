pub mod onboarding_schema;
pub mod onboarding_service;

pub use onboarding_schema::SignUpForm;
pub use onboarding_service::{OnboardingService, Registered};
