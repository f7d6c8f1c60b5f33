use crate::error::AppError;

pub const MISSING_FIELDS: &str = "Please provide all required fields";
pub const INVALID_EMAIL: &str = "Please enter a valid email";

/// Trimmed, lowercased address in the `local@domain.tld` shape.
pub fn normalize_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err(AppError::bad_request("Email is required"));
    }
    if !looks_like_email(&email) {
        return Err(AppError::bad_request(INVALID_EMAIL));
    }
    Ok(email)
}

pub fn normalize_name(raw: &str) -> Result<String, AppError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("Name is required"));
    }
    Ok(name.to_string())
}

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

// Word runs joined by single '.', '-' or '+' separators.
fn valid_segment(segment: &str, separators: &[char]) -> bool {
    !segment.is_empty()
        && segment.split(|c| separators.contains(&c)).all(|run| {
            !run.is_empty() && run.chars().all(is_word)
        })
}

fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if domain.contains('@') || !valid_segment(local, &['.', '-', '+']) {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    valid_segment(host, &['.', '-'])
        && tld.len() >= 2
        && tld.chars().all(|c| c.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::{INVALID_EMAIL, normalize_email, normalize_name};

    #[test]
    fn email_is_trimmed_and_lowercased() {
        assert_eq!(
            normalize_email("  Bob.Smith@Example.COM ").expect("valid"),
            "bob.smith@example.com"
        );
    }

    #[test]
    fn accepts_common_shapes() {
        for email in ["a@b.io", "first-last@mail.example.org", "x_y+tag@host.net"] {
            assert!(normalize_email(email).is_ok(), "{email}");
        }
    }

    #[test]
    fn rejects_malformed_addresses() {
        for email in [
            "plainaddress",
            "@example.com",
            "a@",
            "a@b",
            "a@b.c",
            "a..b@example.com",
            "a@b@example.com",
            "a b@example.com",
            "a@example.c0m",
        ] {
            let err = normalize_email(email).expect_err(email);
            assert_eq!(err.message(), INVALID_EMAIL, "{email}");
        }
    }

    #[test]
    fn blank_values_are_required() {
        assert_eq!(normalize_email("  ").expect_err("blank").message(), "Email is required");
        assert_eq!(normalize_name("\t").expect_err("blank").message(), "Name is required");
        assert_eq!(normalize_name(" Bob ").expect("valid"), "Bob");
    }
}
