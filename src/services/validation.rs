use crate::models::SignupForm;

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 6;

/// Checks a signup form before anything is sent
///
/// Returns the first failing rule's message.
pub fn validate_signup(form: &SignupForm) -> Result<(), String> {
    let username = form.username.trim();
    let email = form.email.trim();

    if username.is_empty()
        || email.is_empty()
        || form.password.is_empty()
        || form.confirm_password.is_empty()
    {
        return Err("All fields are required".to_string());
    }

    if form.password != form.confirm_password {
        return Err("Passwords do not match".to_string());
    }

    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        ));
    }

    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(format!(
            "Username must be at least {} characters long",
            MIN_USERNAME_LEN
        ));
    }

    if !is_plausible_email(email) {
        return Err("Please enter a valid email address".to_string());
    }

    Ok(())
}

/// Login only requires both fields to be present
pub fn validate_login(username: &str, password: &str) -> Result<(), String> {
    if username.trim().is_empty() || password.is_empty() {
        return Err("Please enter both username and password".to_string());
    }
    Ok(())
}

/// `local@domain.tld`: one `@`, a dotted domain with no empty labels
fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}
