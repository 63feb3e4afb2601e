//! Deposit Flow Orchestrator
//!
//! Runs validate → register → prepare → execute, once each, stopping at
//! the first failure. Every failure is tagged with its step so the caller
//! knows whether to start over (`validation`, `create_deposit`) or resume
//! with the deposit ID it already has (`prepare_transaction`,
//! `execute_transaction`). Nothing is retried here.
//!
//! Each invocation owns its own state; concurrent flows share nothing but
//! the bridge client.

use tracing::Instrument;

use super::executor::execute_transaction;
use super::preparer::{fetch_fee_estimates, prepare_transaction};
use super::registrar::create_deposit;
use super::validator::validate_intent;
use crate::bridge::sdk::{BridgeSdk, BroadcastReceipt};
use crate::logging::{generate_correlation_id, log_flow_failure, log_flow_step};
use crate::types::deposit::{AmountLimits, DepositId, DepositIntent, FeeEstimates};
use crate::types::flow::{
    CompletedDeposit, ErrorKind, FailedDeposit, FlowError, FlowState, FlowStep,
};
use crate::types::units::btc_to_sats;

/// Outcome of one flow invocation against `S`
pub type FlowResult<S> = Result<
    CompletedDeposit<<S as BridgeSdk>::Prepared, <S as BridgeSdk>::Execution>,
    FailedDeposit<<S as BridgeSdk>::Prepared>,
>;

/// Deposit flow over a bridge client
pub struct DepositFlow<S> {
    sdk: S,
    limits: AmountLimits,
}

impl<S: BridgeSdk> DepositFlow<S> {
    /// Create a flow with the default amount limits
    pub fn new(sdk: S) -> Self {
        Self {
            sdk,
            limits: AmountLimits::default(),
        }
    }

    /// Override the amount limits
    pub fn with_limits(mut self, limits: AmountLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Current fee tiers. Not part of the deposit critical path.
    pub async fn fee_estimates(&self) -> Result<FeeEstimates, FlowError> {
        fetch_fee_estimates(&self.sdk).await
    }

    /// Run a deposit from validation through broadcast
    pub async fn complete_deposit_flow(&self, intent: &DepositIntent) -> FlowResult<S> {
        let correlation_id = generate_correlation_id();
        let span = tracing::info_span!(
            "deposit_flow",
            correlation_id = %correlation_id,
            wallet = %intent.wallet_provider,
        );

        async {
            let amount_sats = btc_to_sats(intent.btc_amount);
            let mut state = FlowState::Validating;
            log_flow_step(&correlation_id, state, None, amount_sats);

            if let Err(error) = validate_intent(intent, &self.limits) {
                log_flow_failure(&correlation_id, state.fail(), &error, None);
                return Err(FailedDeposit::new(error));
            }

            state = state.next();
            log_flow_step(&correlation_id, state, None, amount_sats);

            let registration = match create_deposit(&self.sdk, intent).await {
                Ok(registration) => registration,
                Err(error) => {
                    log_flow_failure(&correlation_id, state.fail(), &error, None);
                    return Err(FailedDeposit::new(error));
                }
            };

            self.prepare_and_execute(intent, registration.deposit_id, &correlation_id)
                .await
        }
        .instrument(span)
        .await
    }

    /// Retry prepare and execute for a deposit that is already registered.
    ///
    /// The intent is validated again but never re-registered; `deposit_id`
    /// is used as-is. A fresh transaction is always prepared.
    pub async fn resume_deposit_flow(
        &self,
        intent: &DepositIntent,
        deposit_id: DepositId,
    ) -> FlowResult<S> {
        let correlation_id = generate_correlation_id();
        let span = tracing::info_span!(
            "deposit_flow_resume",
            correlation_id = %correlation_id,
            deposit_id = %deposit_id,
        );

        async {
            let amount_sats = btc_to_sats(intent.btc_amount);
            let state = FlowState::Validating;
            log_flow_step(&correlation_id, state, Some(&deposit_id), amount_sats);

            if let Err(error) = validate_intent(intent, &self.limits) {
                log_flow_failure(&correlation_id, state.fail(), &error, Some(&deposit_id));
                return Err(FailedDeposit {
                    error,
                    deposit_id: Some(deposit_id),
                    prepared: None,
                });
            }

            self.prepare_and_execute(intent, deposit_id, &correlation_id)
                .await
        }
        .instrument(span)
        .await
    }

    async fn prepare_and_execute(
        &self,
        intent: &DepositIntent,
        deposit_id: DepositId,
        correlation_id: &str,
    ) -> FlowResult<S> {
        // Same btc_amount that was registered; converted exactly once
        let amount_sats = btc_to_sats(intent.btc_amount);

        let mut state = FlowState::Preparing;
        log_flow_step(correlation_id, state, Some(&deposit_id), amount_sats);

        let prepared = match prepare_transaction(
            &self.sdk,
            amount_sats,
            &intent.stx_receiver,
            &intent.btc_sender,
            intent.fee_priority,
            intent.wallet_provider,
        )
        .await
        {
            Ok(prepared) => prepared,
            Err(error) => {
                log_flow_failure(correlation_id, state.fail(), &error, Some(&deposit_id));
                return Err(FailedDeposit {
                    error,
                    deposit_id: Some(deposit_id),
                    prepared: None,
                });
            }
        };

        state = state.next();
        log_flow_step(correlation_id, state, Some(&deposit_id), amount_sats);

        let execution = match execute_transaction(
            &self.sdk,
            &deposit_id,
            &prepared,
            intent.wallet_provider,
            &intent.btc_sender,
        )
        .await
        {
            Ok(execution) => execution,
            Err(error) => {
                log_flow_failure(correlation_id, state.fail(), &error, Some(&deposit_id));
                return Err(FailedDeposit {
                    error,
                    deposit_id: Some(deposit_id),
                    prepared: Some(prepared),
                });
            }
        };

        state = state.next();
        if execution.txid().is_empty() {
            let error = FlowError {
                step: FlowStep::CompleteFlow,
                kind: ErrorKind::Unknown,
                message: "Bridge reported success without a broadcast transaction ID".to_string(),
                cause: None,
                details: None,
                is_inscription_error: false,
            };
            log_flow_failure(correlation_id, state.fail(), &error, Some(&deposit_id));
            return Err(FailedDeposit {
                error,
                deposit_id: Some(deposit_id),
                prepared: Some(prepared),
            });
        }

        log_flow_step(correlation_id, state, Some(&deposit_id), amount_sats);
        tracing::info!(
            target: "bridge_deposit::flow",
            deposit_id = %deposit_id,
            txid = execution.txid(),
            "Deposit transaction broadcast"
        );

        Ok(CompletedDeposit {
            deposit_id,
            prepared,
            execution,
        })
    }
}
