//! Text rendering of a [`DashboardView`]

use std::fmt::Write;

use chrono::Local;

use super::DashboardView;
use crate::constants::APP_NAME;
use crate::logic::config::FleetConfig;
use crate::logic::status::ClassificationResult;

pub const WAITING_MESSAGE: &str = "Waiting for simulator data...";

pub fn render(view: &DashboardView, fleet: &FleetConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} Dashboard @ {}", APP_NAME, Local::now().format("%H:%M:%S"));

    match view {
        DashboardView::Waiting => {
            out.push_str(WAITING_MESSAGE);
        }
        DashboardView::Unreachable(reason) => {
            let _ = write!(out, "Backend not reachable: {}", reason);
        }
        DashboardView::ServiceError(reason) => {
            let _ = write!(out, "Backend error: {}", reason);
        }
        DashboardView::Live { batch, counts, repeated } => {
            let _ = writeln!(
                out,
                "GOOD: {} | WARNING: {} | CRITICAL: {}",
                counts.healthy, counts.warning, counts.critical
            );
            if *repeated {
                out.push_str("(no new batch since last poll)\n");
            }
            for result in &batch.results {
                out.push_str(&card(result, fleet));
                out.push('\n');
            }
            out.pop();
        }
    }

    out
}

/// One status card line
fn card(result: &ClassificationResult, fleet: &FleetConfig) -> String {
    let mut line = format!(
        "{} {:8} {:9} | Prob: {:.4} | {}",
        result.health_tier.marker(),
        result.atm_id,
        result.health_tier.as_str(),
        result.failure_probability,
        result.recommended_action
    );

    if let Some(location) = fleet.location(&result.atm_id) {
        match &location.label {
            Some(label) => {
                let _ = write!(line, " | {} ({:.4}, {:.4})", label, location.lat, location.lon);
            }
            None => {
                let _ = write!(line, " | ({:.4}, {:.4})", location.lat, location.lon);
            }
        }
    }

    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::logic::status::{HealthTier, ResultBatch};

    fn live(repeated: bool) -> DashboardView {
        let batch = ResultBatch::new(vec![
            ClassificationResult {
                atm_id: "ATM-003".to_string(),
                failure_probability: 0.9,
                health_tier: HealthTier::Critical,
                recommended_action: HealthTier::Critical.default_action().to_string(),
            },
            ClassificationResult {
                atm_id: "ATM-999".to_string(),
                failure_probability: 0.05,
                health_tier: HealthTier::Healthy,
                recommended_action: HealthTier::Healthy.default_action().to_string(),
            },
        ]);
        DashboardView::Live { counts: batch.summary(), batch: Arc::new(batch), repeated }
    }

    #[test]
    fn test_render_waiting_and_unreachable() {
        let fleet = FleetConfig::reference();
        assert!(render(&DashboardView::Waiting, &fleet).ends_with(WAITING_MESSAGE));

        let text = render(&DashboardView::Unreachable("connection refused".into()), &fleet);
        assert!(text.contains("Backend not reachable: connection refused"));

        let text = render(&DashboardView::ServiceError("status service error 500: boom".into()), &fleet);
        assert!(text.contains("Backend error: status service error 500: boom"));
        assert!(!text.contains("not reachable"));
    }

    #[test]
    fn test_render_live_cards() {
        let fleet = FleetConfig::reference();
        let text = render(&live(false), &fleet);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "GOOD: 1 | WARNING: 0 | CRITICAL: 1");
        assert!(lines[2].starts_with("🔴 ATM-003"));
        assert!(lines[2].contains("Prob: 0.9000"));
        assert!(lines[2].contains("Guindy"));
        // unknown to the fleet file: no location
        assert!(lines[3].starts_with("🟢 ATM-999"));
        assert!(!lines[3].contains('('));
    }

    #[test]
    fn test_render_notes_repeated_batch() {
        let fleet = FleetConfig::reference();
        assert!(render(&live(true), &fleet).contains("no new batch"));
        assert!(!render(&live(false), &fleet).contains("no new batch"));
    }
}
