use serde::{Deserialize, Serialize};

/// Custom events wired into the generated site when analytics is enabled.
pub const ANALYTICS_EVENTS: &[&str] = &[
    "contact_click",
    "project_view",
    "resume_download",
    "social_link_click",
];

/// Outcome of a completed job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub portfolio_id: String,
    /// Default URL assigned by the hosting provider.
    pub url: String,
    /// Custom domain URL, only when a custom domain was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_url: Option<String>,
    pub deployment_id: String,
    /// CDN the request asked to be served from.
    #[serde(default)]
    pub cdn_provider: String,
    pub performance: PerformanceMetrics,
    pub analytics: AnalyticsDescriptor,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub page_speed_score: u8,
    pub load_time_ms: u64,
    pub bundle_size_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsDescriptor {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_id: Option<String>,
    #[serde(default)]
    pub custom_events: Vec<String>,
}

impl AnalyticsDescriptor {
    pub fn for_portfolio(portfolio_id: &str, enabled: bool) -> Self {
        if !enabled {
            return Self::disabled();
        }
        Self {
            enabled: true,
            tracking_id: Some(format!("folio-{}", portfolio_id)),
            custom_events: ANALYTICS_EVENTS.iter().map(|e| e.to_string()).collect(),
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            tracking_id: None,
            custom_events: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analytics_enabled_has_tracking_id_and_events() {
        let analytics = AnalyticsDescriptor::for_portfolio("ada-1234abcd", true);
        assert!(analytics.enabled);
        assert_eq!(analytics.tracking_id.as_deref(), Some("folio-ada-1234abcd"));
        assert_eq!(analytics.custom_events.len(), ANALYTICS_EVENTS.len());
    }

    #[test]
    fn test_analytics_disabled_is_empty() {
        let analytics = AnalyticsDescriptor::for_portfolio("ada-1234abcd", false);
        assert_eq!(analytics, AnalyticsDescriptor::disabled());
    }

    #[test]
    fn test_result_omits_custom_url_when_absent() {
        let result = GenerationResult {
            portfolio_id: "p".to_string(),
            url: "https://p.vercel.app".to_string(),
            custom_url: None,
            deployment_id: "dpl_1".to_string(),
            cdn_provider: "vercel".to_string(),
            performance: PerformanceMetrics {
                page_speed_score: 97,
                load_time_ms: 420,
                bundle_size_bytes: 18_000,
            },
            analytics: AnalyticsDescriptor::disabled(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("customUrl").is_none());
        assert_eq!(json["performance"]["pageSpeedScore"], 97);
        assert_eq!(json["cdnProvider"], "vercel");
    }
}
