// self
use crate::obs::{FlowKind, FlowOutcome};

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"sql_practice_client_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn request_outcomes_are_recorded_under_stable_labels() {
		let outcomes = [FlowOutcome::Attempt, FlowOutcome::Success, FlowOutcome::Failure];

		for outcome in outcomes {
			record_flow_outcome(FlowKind::Request, outcome);
		}

		assert_eq!(FlowKind::Request.as_str(), "request");
		assert_eq!(outcomes.map(FlowOutcome::as_str), ["attempt", "success", "failure"]);
	}
}
