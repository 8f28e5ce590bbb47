use serde::{Deserialize, Serialize};

/// Viewer process configuration, read from a TOML file
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ViewerConfig {
    pub viewer: ViewerSettings,
    pub dashboard: DashboardServer,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ViewerSettings {
    pub log_path: String,
    pub log_level: String,
    /// Seconds between fleet summary log lines
    pub summary_interval: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DashboardServer {
    pub address: String,
    pub port: u16,
    /// Use TLS schemes (wss/https) when the server is served securely
    pub secure: bool,
}

impl ViewerConfig {
    /// Push feed URL for the live update channel
    pub fn dashboard_url(&self) -> String {
        let scheme = if self.dashboard.secure { "wss" } else { "ws" };
        format!(
            "{scheme}://{}:{}/ws/dashboard",
            self.dashboard.address, self.dashboard.port
        )
    }

    /// One-shot fleet listing URL for the bootstrap fetch
    pub fn agents_url(&self) -> String {
        let scheme = if self.dashboard.secure { "https" } else { "http" };
        format!(
            "{scheme}://{}:{}/api/public/agents",
            self.dashboard.address, self.dashboard.port
        )
    }
}
