use thiserror::Error;

use crate::checkout::CheckoutError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid country code `{0}` (expected two ASCII letters)")]
    InvalidCountryCode(String),
    #[error("malformed plan record `{identifier}`: {reason}")]
    MalformedRecord { identifier: String, reason: String },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Checkout(#[from] CheckoutError),
    #[error("plan not found: {0}")]
    PlanNotFound(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("not found: {message}")]
    NotFound { message: String, correlation_id: String },
    #[error("unprocessable: {message}")]
    Unprocessable { message: String, user_message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::NotFound { .. } => "The requested plan could not be found.",
            Self::Unprocessable { user_message, .. } => user_message,
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::NotFound { correlation_id, .. }
            | Self::Unprocessable { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::NotFound { correlation_id: id, .. }
            | InterfaceError::Unprocessable { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        match value {
            ApplicationError::Domain(error) => Self::BadRequest {
                message: error.to_string(),
                correlation_id: "unassigned".to_owned(),
            },
            ApplicationError::Checkout(error) => Self::Unprocessable {
                message: error.to_string(),
                user_message: error.user_message().to_owned(),
                correlation_id: "unassigned".to_owned(),
            },
            ApplicationError::PlanNotFound(plan_id) => Self::NotFound {
                message: format!("no plan with id `{plan_id}`"),
                correlation_id: "unassigned".to_owned(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::checkout::CheckoutError;
    use crate::domain::plan::PlanId;
    use crate::errors::{ApplicationError, DomainError, InterfaceError};

    #[test]
    fn domain_error_maps_to_bad_request_interface_error() {
        let interface =
            ApplicationError::from(DomainError::InvalidCountryCode("USA".to_owned()))
                .into_interface("req-1");

        assert!(matches!(
            interface,
            InterfaceError::BadRequest {
                ref correlation_id,
                ..
            } if correlation_id == "req-1"
        ));
        assert_eq!(
            interface.user_message(),
            "The request could not be processed. Check inputs and try again."
        );
    }

    #[test]
    fn missing_price_identifier_keeps_checkout_user_message() {
        let interface = ApplicationError::from(CheckoutError::MissingPriceIdentifier {
            plan_id: PlanId("partner-us-5gb-30d-abcdef12".to_owned()),
        })
        .into_interface("req-2");

        assert!(matches!(interface, InterfaceError::Unprocessable { .. }));
        assert_eq!(
            interface.user_message(),
            "No plan identifier is available for this plan. Please choose a plan again."
        );
        assert_eq!(interface.correlation_id(), "req-2");
    }

    #[test]
    fn unknown_plan_maps_to_not_found() {
        let interface =
            ApplicationError::PlanNotFound("missing".to_owned()).into_interface("req-3");

        assert!(matches!(interface, InterfaceError::NotFound { .. }));
        assert_eq!(interface.user_message(), "The requested plan could not be found.");
    }
}
