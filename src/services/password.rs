// Password strength rules for registration, password update and password set.

const SPECIAL_CHARS: &str = r#"!@#$%^&*()_+-={}[]|\:";'<>?,./"#;

pub fn validate_strength(password: &str) -> Result<(), String> {
    if password.chars().count() < 7 {
        return Err("Password is too short".to_string());
    }

    if password.chars().count() > 64 {
        return Err("Password is too long".to_string());
    }

    let has_lower = password.chars().any(|c| c.is_lowercase());
    let has_upper = password.chars().any(|c| c.is_uppercase());

    if !has_lower || !has_upper {
        return Err("Password must contain lower and upper case letters".to_string());
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one digit".to_string());
    }

    if !password.chars().any(|c| SPECIAL_CHARS.contains(c)) {
        return Err(format!(
            "Password must contain a special character {}",
            SPECIAL_CHARS
        ));
    }

    Ok(())
}
