//! Response validators
//!
//! A validator is a plain function that inspects a response and either accepts it or
//! returns the error that turns the request into a failed outcome. Chains run in the
//! order given and stop at the first rejection.

use crate::error::{Error, Result};
use crate::types::HttpResponse;

/// Predicate applied to every response the transport returns
pub type Validator = fn(&HttpResponse) -> Result<()>;

/// Run `validators` in order, returning the first rejection.
pub fn run_validators(response: &HttpResponse, validators: &[Validator]) -> Result<()> {
    for validate in validators {
        validate(response)?;
    }
    Ok(())
}

/// Accept only `200 OK`
pub fn validate_status_ok(response: &HttpResponse) -> Result<()> {
    if response.status != 200 {
        return Err(Error::InvalidStatus {
            status: response.status,
        });
    }
    Ok(())
}

/// Accept any 2xx status
pub fn validate_status_success(response: &HttpResponse) -> Result<()> {
    if !response.is_success() {
        return Err(Error::InvalidStatus {
            status: response.status,
        });
    }
    Ok(())
}

/// Reject responses with an empty body
pub fn validate_non_empty_body(response: &HttpResponse) -> Result<()> {
    if response.body.is_empty() {
        return Err(Error::Validation(format!(
            "empty body (status {})",
            response.status
        )));
    }
    Ok(())
}
