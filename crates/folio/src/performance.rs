//! Synthetic performance estimate for a built bundle.
//!
//! No page is fetched. Load time is modelled from the bundle size over a
//! slow mobile link, and the score is the template's own expectation minus a
//! penalty for weight above a lean-page budget.

use crate::assets::AssetBundle;
use crate::job::PerformanceMetrics;
use crate::template::Template;

/// Round-trip and parse overhead every page pays.
const BASE_LATENCY_MS: u64 = 300;
/// Roughly 1.6 Mbit/s.
const BYTES_PER_MS: u64 = 200;
/// Weight above this starts costing score.
const LEAN_BUDGET_BYTES: u64 = 100 * 1024;
/// One point per this many bytes over budget.
const PENALTY_BYTES_PER_POINT: u64 = 10 * 1024;

pub fn measure(bundle: &AssetBundle, template: &Template) -> PerformanceMetrics {
    let bundle_size_bytes = bundle.total_size();
    let load_time_ms = BASE_LATENCY_MS + bundle_size_bytes / BYTES_PER_MS;

    let penalty = bundle_size_bytes.saturating_sub(LEAN_BUDGET_BYTES) / PENALTY_BYTES_PER_POINT;
    let score = u64::from(template.performance_score.min(100)).saturating_sub(penalty);

    PerformanceMetrics {
        page_speed_score: score.min(100) as u8,
        load_time_ms,
        bundle_size_bytes,
    }
}
