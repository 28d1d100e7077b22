// Display-name guessing for the public viewer. Product glue, kept out of
// the history core: unknown ids always fall back to a generic label.

/// Derives a human-readable label for a user id by matching its first 8
/// characters against the configured admin emails. On a match the email's
/// local part is title-cased (split on `.`, `_` and `-`) and the email is
/// returned alongside; otherwise the label is `Admin <short-id>` and no
/// email is reported.
pub fn display_name(user_id: &str, allowed_admins: &[String]) -> (String, Option<String>) {
    let short_id: String = user_id.chars().take(8).collect::<String>().to_lowercase();

    let matched = allowed_admins.iter().find(|email| {
        let email_lower = email.to_lowercase();
        let email_prefix: String = email_lower.chars().take(8).collect();
        email_lower.contains(&short_id) || short_id.contains(&email_prefix)
    });

    match matched {
        Some(email) => {
            let local_part = email.split('@').next().unwrap_or(email);
            let label = local_part
                .split(['.', '_', '-'])
                .filter(|part| !part.is_empty())
                .map(title_case)
                .collect::<Vec<_>>()
                .join(" ");
            (label, Some(email.clone()))
        }
        None => (format!("Admin {}", short_id), None),
    }
}

fn title_case(part: &str) -> String {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}
