use crate::server::response::ApiError;

const MAX_NAME_LEN: usize = 120;
const MAX_EMAIL_LEN: usize = 254;
const MIN_PASSWORD_LEN: usize = 8;
const MAX_PASSWORD_LEN: usize = 128;

pub fn validate_display_name(name: &str) -> Result<(), ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("Name cannot be empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(ApiError::bad_request(format!(
            "Name cannot exceed {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ApiError> {
    if email.is_empty() {
        return Err(ApiError::bad_request("Email cannot be empty"));
    }
    if email.len() > MAX_EMAIL_LEN {
        return Err(ApiError::bad_request(format!(
            "Email cannot exceed {MAX_EMAIL_LEN} characters"
        )));
    }
    // Deliverability is the mail server's problem; this only rejects values
    // that cannot be an address at all.
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ApiError::bad_request("Email is not a valid address"));
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(ApiError::bad_request("Email is not a valid address"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if password.len() > MAX_PASSWORD_LEN {
        return Err(ApiError::bad_request(format!(
            "Password cannot exceed {MAX_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_add_quantity(quantity: i64) -> Result<(), ApiError> {
    if quantity < 1 {
        return Err(ApiError::bad_request("Quantity must be at least 1"));
    }
    Ok(())
}
