//! Environment helpers shared by configuration loaders

/// Read an environment variable, treating empty or whitespace-only values as unset
pub fn env_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Read a boolean flag (`1`, `true`, `yes`, `on`; case-insensitive)
pub fn env_flag(key: &str) -> Option<bool> {
    env_var(key).map(|value| parse_flag(&value))
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
