/// Base URL of the REST backend. Empty means same origin as the app.
const DEFAULT_API_BASE: &str = "";

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub api_base_url: String,
    pub dashboard_refresh_secs: u32,
    pub practice_tick_ms: u32,
    pub kata_pdf_prefix: String,
    pub google_client_id: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE.to_string(),
            dashboard_refresh_secs: 30,
            practice_tick_ms: 1000,
            kata_pdf_prefix: "/katas".to_string(),
            google_client_id: None,
        }
    }
}

impl Config {
    /// Build-time overrides: `KIAI_API_BASE`, `KIAI_REFRESH_SECS` and
    /// `KIAI_GOOGLE_CLIENT_ID` (enables the Google sign-in button).
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(base) = option_env!("KIAI_API_BASE") {
            config.api_base_url = base.trim_end_matches('/').to_string();
        }
        if let Some(secs) = option_env!("KIAI_REFRESH_SECS").and_then(|s| s.parse().ok()) {
            config.dashboard_refresh_secs = secs;
        }
        config.google_client_id = option_env!("KIAI_GOOGLE_CLIENT_ID")
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        config
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url, path)
    }
}
