//! Built-in ETL steps

pub mod adms_validation;
pub mod convert_to_adms2;
pub mod manual_upload;
pub mod remove_unsupported_data;

pub use adms_validation::AdmsValidation;
pub use convert_to_adms2::ConvertToAdms2;
pub use manual_upload::ManualUpload;
pub use remove_unsupported_data::RemoveUnsupportedData;

use crate::core::StepRegistry;

/// Registry holding every built-in step
pub fn builtin_registry() -> StepRegistry {
    let mut registry = StepRegistry::new();
    registry.register(manual_upload::ID, |configuration, services| {
        Box::new(ManualUpload::new(configuration, services))
    });
    registry.register(convert_to_adms2::ID, |configuration, services| {
        Box::new(ConvertToAdms2::new(configuration, services))
    });
    registry.register(remove_unsupported_data::ID, |configuration, services| {
        Box::new(RemoveUnsupportedData::new(configuration, services))
    });
    registry.register(adms_validation::ID, |configuration, services| {
        Box::new(AdmsValidation::new(configuration, services))
    });
    registry
}
