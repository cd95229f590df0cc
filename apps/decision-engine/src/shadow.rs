//! Shadow run: build, validate and settle a plan in one pass.
//!
//! The end-to-end dry-run pipeline. Nothing here touches a venue; the
//! market snapshot is supplied by the caller so the whole run stays a
//! pure function of its inputs.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::models::market::MarketSnapshot;
use crate::models::plan::{PlanDocument, PlanInputs};
use crate::models::posture::Posture;
use crate::models::settlement::{ExecutionMode, PortfolioState, SettlementReport};
use crate::planner::ExecutionPlanBuilder;
use crate::settlement::SettlementSimulator;
use crate::validate::validate_plan_document;

/// Paths the shadow run was fed, echoed for audit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShadowInputs {
    /// Facts pack path.
    pub facts_path: String,
    /// Decision packet path.
    pub decision_path: String,
    /// Portfolio state path.
    pub portfolio_state_path: String,
}

/// Combined output of one shadow run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShadowReport {
    /// Input provenance.
    pub inputs: ShadowInputs,
    /// The built and validated plan.
    pub execution_plan: PlanDocument,
    /// What settlement would do with it.
    pub simulation_report: SettlementReport,
}

/// Run the full pipeline: build a plan from the posture and snapshot,
/// validate it, then settle it against the balance snapshot.
///
/// # Errors
///
/// [`EngineError::PlanInvalid`] when the built plan violates its own
/// invariants, [`EngineError::Settlement`] on a hard settlement error.
pub fn shadow_run(
    config: &EngineConfig,
    posture: &Posture,
    snapshot: &MarketSnapshot,
    state: &PortfolioState,
    inputs: ShadowInputs,
    budget_override: Option<&str>,
) -> Result<ShadowReport, EngineError> {
    let plan_inputs = PlanInputs {
        facts_pack_path: inputs.facts_path.clone(),
        decision_packet_path: inputs.decision_path.clone(),
    };

    let builder = ExecutionPlanBuilder::new(config.clone());
    let plan = builder.build(posture, snapshot, plan_inputs, budget_override);
    validate_plan_document(&plan)?;

    let simulator = SettlementSimulator::new(ExecutionMode::AllOrNothing);
    let report = simulator.simulate(&plan, state)?;

    tracing::info!(
        plan_action = ?plan.plan.action,
        settled_action = ?report.action,
        accepted = report.accepted_orders.len(),
        "shadow run complete"
    );

    Ok(ShadowReport {
        inputs,
        execution_plan: plan,
        simulation_report: report,
    })
}
