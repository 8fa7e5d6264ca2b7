use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::filter_options::FilterOptionsSettings;
use crate::domain::pagination::{Budgets, Thresholds};
use crate::domain::service::ServiceConfig;

/// Configuration for the sales module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SalesConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
    /// Deepest offset still served by a plain skip/limit find.
    #[serde(default = "default_direct_offset_limit")]
    pub direct_offset_limit: u64,
    /// Deepest offset served by the anchor-range strategy on the standard path.
    #[serde(default = "default_anchor_offset_limit")]
    pub anchor_offset_limit: u64,
    #[serde(default = "default_count_budget_ms")]
    pub count_budget_ms: u64,
    #[serde(default = "default_page_budget_ms")]
    pub page_budget_ms: u64,
    #[serde(default = "default_window_budget_ms")]
    pub window_budget_ms: u64,
    #[serde(default = "default_range_budget_ms")]
    pub range_budget_ms: u64,
    #[serde(default = "default_anchor_budget_ms")]
    pub anchor_budget_ms: u64,
    #[serde(default)]
    pub filter_options: FilterOptionsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterOptionsConfig {
    #[serde(default = "default_ttl_sec")]
    pub ttl_sec: u64,
    #[serde(default = "default_scan_budget_ms")]
    pub scan_budget_ms: u64,
    #[serde(default = "default_tag_sample_size")]
    pub tag_sample_size: u64,
    #[serde(default = "default_tag_limit")]
    pub tag_limit: usize,
}

impl Default for SalesConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            direct_offset_limit: default_direct_offset_limit(),
            anchor_offset_limit: default_anchor_offset_limit(),
            count_budget_ms: default_count_budget_ms(),
            page_budget_ms: default_page_budget_ms(),
            window_budget_ms: default_window_budget_ms(),
            range_budget_ms: default_range_budget_ms(),
            anchor_budget_ms: default_anchor_budget_ms(),
            filter_options: FilterOptionsConfig::default(),
        }
    }
}

impl Default for FilterOptionsConfig {
    fn default() -> Self {
        Self {
            ttl_sec: default_ttl_sec(),
            scan_budget_ms: default_scan_budget_ms(),
            tag_sample_size: default_tag_sample_size(),
            tag_limit: default_tag_limit(),
        }
    }
}

impl SalesConfig {
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            default_page_size: self.default_page_size.max(1),
            max_page_size: self.max_page_size.max(1),
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            direct_offset_limit: self.direct_offset_limit,
            // an anchor tier below the direct tier would never be chosen
            anchor_offset_limit: self.anchor_offset_limit.max(self.direct_offset_limit),
        }
    }

    pub fn budgets(&self) -> Budgets {
        Budgets {
            count: Duration::from_millis(self.count_budget_ms),
            page: Duration::from_millis(self.page_budget_ms),
            window: Duration::from_millis(self.window_budget_ms),
            range: Duration::from_millis(self.range_budget_ms),
            anchor: Duration::from_millis(self.anchor_budget_ms),
        }
    }

    pub fn filter_options_settings(&self) -> FilterOptionsSettings {
        FilterOptionsSettings {
            ttl: Duration::from_secs(self.filter_options.ttl_sec),
            scan_budget: Duration::from_millis(self.filter_options.scan_budget_ms),
            tag_sample_size: self.filter_options.tag_sample_size,
            tag_limit: self.filter_options.tag_limit,
        }
    }
}

fn default_page_size() -> u64 {
    10
}

fn default_max_page_size() -> u64 {
    1000
}

fn default_direct_offset_limit() -> u64 {
    100_000
}

fn default_anchor_offset_limit() -> u64 {
    500_000
}

fn default_count_budget_ms() -> u64 {
    15_000
}

fn default_page_budget_ms() -> u64 {
    60_000
}

fn default_window_budget_ms() -> u64 {
    90_000
}

fn default_range_budget_ms() -> u64 {
    30_000
}

fn default_anchor_budget_ms() -> u64 {
    30_000
}

fn default_ttl_sec() -> u64 {
    300
}

fn default_scan_budget_ms() -> u64 {
    30_000
}

fn default_tag_sample_size() -> u64 {
    10_000
}

fn default_tag_limit() -> usize {
    100
}
