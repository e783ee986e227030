use std::env;

const DEFAULT_SERVICE_CATEGORIES: &str = "Cleaning,Plumbing,Electrical,HVAC,Handyman";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub service_categories: Vec<String>,
    pub session_max_age_hours: i64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let service_categories = env::var("SERVICE_CATEGORIES")
            .ok()
            .map(|v| parse_categories(&v))
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| parse_categories(DEFAULT_SERVICE_CATEGORIES));

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "servicebot.db".to_string()),
            service_categories,
            session_max_age_hours: env::var("SESSION_MAX_AGE_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|h: &i64| *h > 0)
                .unwrap_or(24),
        }
    }

    pub fn session_max_age(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_max_age_hours)
    }
}

/// Comma-separated catalog, trimmed, first occurrence wins.
pub fn parse_categories(raw: &str) -> Vec<String> {
    let mut categories: Vec<String> = vec![];
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !categories.iter().any(|c| c == name) {
            categories.push(name.to_string());
        }
    }
    categories
}
