//! Deposit Flow
//!
//! One module per stage of a BTC → sBTC deposit:
//!
//! 1. `validator` - address and amount checks, no I/O
//! 2. `registrar` - register the intent with the bridge
//! 3. `preparer` - UTXO selection and fee computation (bridge side)
//! 4. `executor` - wallet signature and broadcast (bridge side)
//!
//! `classifier` turns raw bridge errors into [`FlowError`]s and
//! `orchestrator` runs the stages in order.
//!
//! [`FlowError`]: crate::types::flow::FlowError

pub mod classifier;
pub mod executor;
pub mod orchestrator;
pub mod preparer;
pub mod registrar;
pub mod validator;

pub use classifier::{classify, is_inscription_error};
pub use executor::execute_transaction;
pub use orchestrator::{DepositFlow, FlowResult};
pub use preparer::{fetch_fee_estimates, prepare_transaction};
pub use registrar::create_deposit;
pub use validator::{validate_addresses, validate_amount, validate_intent};
