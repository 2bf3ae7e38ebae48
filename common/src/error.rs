use thiserror::Error;

/// Failures raised while turning CIDR text into a target list.
///
/// Enumeration is all-or-nothing: no partial address list is ever returned
/// alongside one of these.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("invalid CIDR notation '{cidr}': {reason}")]
    InvalidRange { cidr: String, reason: String },

    #[error("CIDR block '{cidr}' spans {size} addresses, more than the limit of {limit}")]
    TooLarge { cidr: String, size: u128, limit: u128 },
}

impl RangeError {
    pub(crate) fn invalid(cidr: &str, reason: impl ToString) -> Self {
        Self::InvalidRange {
            cidr: cidr.to_string(),
            reason: reason.to_string(),
        }
    }
}
