//! End-to-end deposit flow against a recording bridge fake.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use bridge_deposit::bridge::sdk::{CreateDepositRequest, PrepareTransactionRequest};
use bridge_deposit::storage::{MemoryResumeStore, ResumeStore};
use bridge_deposit::types::FeeEstimates;
use bridge_deposit::{
    BridgeError, BridgeSdk, BroadcastReceipt, DepositFlow, DepositId, DepositIntent, ErrorKind,
    FeePriority, FlowStep, WalletProvider,
};

const STX_RECEIVER: &str = "SP2FW2AQXTBKYY8DXP18PCXZGWQT4S2RH7HC6WA4H";
const BTC_SENDER: &str = "bc1qexampleaddress";

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Fees,
    Create(CreateDepositRequest),
    Prepare(PrepareTransactionRequest),
    Execute { deposit_id: String, template: u32 },
}

/// Bridge-owned template; only the fake looks inside
#[derive(Debug, Clone, PartialEq)]
struct Template {
    id: u32,
    fee_sats: u64,
}

#[derive(Debug)]
struct Broadcast {
    txid: String,
}

impl BroadcastReceipt for Broadcast {
    fn txid(&self) -> &str {
        &self.txid
    }
}

#[derive(Default)]
struct Script {
    fail_create: Option<BridgeError>,
    empty_deposit_id: bool,
    fail_prepare: Option<BridgeError>,
    fail_execute: Option<BridgeError>,
}

#[derive(Clone, Default)]
struct RecordingBridge {
    calls: Arc<Mutex<Vec<Call>>>,
    script: Arc<Script>,
}

impl RecordingBridge {
    fn scripted(script: Script) -> Self {
        Self {
            calls: Arc::default(),
            script: Arc::new(script),
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }
}

#[async_trait]
impl BridgeSdk for RecordingBridge {
    type Prepared = Template;
    type Execution = Broadcast;

    async fn fee_estimates(&self) -> Result<FeeEstimates, BridgeError> {
        self.record(Call::Fees);
        Ok(FeeEstimates {
            low: 2,
            medium: 6,
            high: 14,
        })
    }

    async fn create_deposit(
        &self,
        request: &CreateDepositRequest,
    ) -> Result<DepositId, BridgeError> {
        self.record(Call::Create(request.clone()));
        match &self.script.fail_create {
            Some(err) => Err(err.clone()),
            None if self.script.empty_deposit_id => Ok(DepositId::new("")),
            None => Ok(DepositId::new("dep_e2e")),
        }
    }

    async fn prepare_transaction(
        &self,
        request: &PrepareTransactionRequest,
    ) -> Result<Template, BridgeError> {
        self.record(Call::Prepare(request.clone()));
        match &self.script.fail_prepare {
            Some(err) => Err(err.clone()),
            None => Ok(Template {
                id: 7,
                fee_sats: 1_410,
            }),
        }
    }

    async fn execute_transaction(
        &self,
        deposit_id: &DepositId,
        prepared: &Template,
        _wallet_provider: WalletProvider,
        _btc_address: &str,
    ) -> Result<Broadcast, BridgeError> {
        self.record(Call::Execute {
            deposit_id: deposit_id.to_string(),
            template: prepared.id,
        });
        match &self.script.fail_execute {
            Some(err) => Err(err.clone()),
            None => Ok(Broadcast {
                txid: "9f2c4e0b7d1a".to_string(),
            }),
        }
    }
}

fn intent(btc_amount: f64) -> DepositIntent {
    DepositIntent::new(
        btc_amount,
        STX_RECEIVER,
        BTC_SENDER,
        FeePriority::Medium,
        WalletProvider::Leather,
    )
}

fn inscription_error() -> BridgeError {
    BridgeError::Http {
        status: 400,
        message: "Bad Request".to_string(),
        body: Some(
            r#"{"error":"Insufficient funds after filtering out UTXOs with inscriptions","available":0}"#
                .to_string(),
        ),
    }
}

#[tokio::test]
async fn deposit_completes_end_to_end() {
    let bridge = RecordingBridge::default();
    let flow = DepositFlow::new(bridge.clone());

    let done = flow.complete_deposit_flow(&intent(0.0005)).await.unwrap();

    assert_eq!(done.deposit_id.as_str(), "dep_e2e");
    assert_eq!(done.prepared.fee_sats, 1_410);
    assert!(!done.execution.txid().is_empty());

    let calls = bridge.calls();
    assert_eq!(calls.len(), 3);
    match &calls[0] {
        Call::Create(req) => {
            assert_eq!(req.btc_amount, 0.0005);
            assert_eq!(req.stx_receiver, STX_RECEIVER);
            assert_eq!(req.btc_sender, BTC_SENDER);
        }
        other => panic!("expected create, got {:?}", other),
    }
    match &calls[1] {
        Call::Prepare(req) => {
            assert_eq!(req.amount, "50000");
            assert_eq!(req.user_address, STX_RECEIVER);
            assert_eq!(req.btc_address, BTC_SENDER);
            assert_eq!(req.fee_priority, FeePriority::Medium);
            assert_eq!(req.wallet_provider, WalletProvider::Leather);
        }
        other => panic!("expected prepare, got {:?}", other),
    }
    assert_eq!(
        calls[2],
        Call::Execute {
            deposit_id: "dep_e2e".to_string(),
            template: 7
        }
    );
}

#[tokio::test]
async fn rejected_addresses_never_reach_the_bridge() {
    let bridge = RecordingBridge::default();
    let flow = DepositFlow::new(bridge.clone());

    let mut testnet_receiver = intent(0.0005);
    testnet_receiver.stx_receiver = "ST2FW2AQXTBKYY8DXP18PCXZGWQT4S2RH7HC6WA4H".to_string();
    let mut testnet_sender = intent(0.0005);
    testnet_sender.btc_sender = "tb1qexampleaddress".to_string();

    for bad in [testnet_receiver, testnet_sender] {
        let failed = flow.complete_deposit_flow(&bad).await.unwrap_err();
        assert_eq!(failed.step(), FlowStep::Validation);
        assert_eq!(failed.error.kind, ErrorKind::Validation);
    }

    assert!(bridge.calls().is_empty());
}

#[tokio::test]
async fn out_of_range_amounts_name_the_bound() {
    let bridge = RecordingBridge::default();
    let flow = DepositFlow::new(bridge.clone());

    for amount in [0.0, 0.00009999, 0.00005] {
        let failed = flow.complete_deposit_flow(&intent(amount)).await.unwrap_err();
        assert!(failed.error.message.contains("10,000"), "{}", failed.error.message);
    }
    for amount in [0.00200001, 0.01, 1.0] {
        let failed = flow.complete_deposit_flow(&intent(amount)).await.unwrap_err();
        assert!(failed.error.message.contains("200,000"), "{}", failed.error.message);
    }

    assert!(bridge.calls().is_empty());
}

#[tokio::test]
async fn registration_failure_blocks_later_steps() {
    let bridge = RecordingBridge::scripted(Script {
        fail_create: Some(BridgeError::Http {
            status: 500,
            message: "Internal Server Error".to_string(),
            body: None,
        }),
        ..Script::default()
    });

    let failed = DepositFlow::new(bridge.clone())
        .complete_deposit_flow(&intent(0.0005))
        .await
        .unwrap_err();

    assert_eq!(failed.step(), FlowStep::CreateDeposit);
    assert_eq!(failed.error.kind, ErrorKind::Network);
    assert_eq!(bridge.count(|c| matches!(c, Call::Prepare(_))), 0);
    assert_eq!(bridge.count(|c| matches!(c, Call::Execute { .. })), 0);
}

#[tokio::test]
async fn empty_deposit_id_stops_before_prepare() {
    let bridge = RecordingBridge::scripted(Script {
        empty_deposit_id: true,
        ..Script::default()
    });

    let deposit = intent(0.0005);
    let failed = DepositFlow::new(bridge.clone())
        .complete_deposit_flow(&deposit)
        .await
        .unwrap_err();

    assert_eq!(failed.step(), FlowStep::CreateDeposit);
    assert_eq!(failed.error.kind, ErrorKind::Unknown);
    assert!(failed.resume_point(&deposit).is_none());
    assert_eq!(bridge.count(|c| matches!(c, Call::Prepare(_))), 0);
}

#[tokio::test]
async fn inscription_failure_is_flagged_at_prepare() {
    let bridge = RecordingBridge::scripted(Script {
        fail_prepare: Some(inscription_error()),
        ..Script::default()
    });

    let failed = DepositFlow::new(bridge.clone())
        .complete_deposit_flow(&intent(0.0005))
        .await
        .unwrap_err();

    assert_eq!(failed.step(), FlowStep::PrepareTransaction);
    assert!(failed.error.is_inscription_error);
    assert_eq!(failed.error.kind, ErrorKind::InscriptionProtected);
    let details = failed.error.details.as_ref().unwrap();
    assert_eq!(details["available"], 0);
    assert!(failed.error.cause.is_some());
    assert_eq!(bridge.count(|c| matches!(c, Call::Execute { .. })), 0);
}

#[tokio::test]
async fn execute_failure_keeps_prepared_template() {
    let bridge = RecordingBridge::scripted(Script {
        fail_execute: Some(BridgeError::Other("User rejected the request".to_string())),
        ..Script::default()
    });

    let failed = DepositFlow::new(bridge.clone())
        .complete_deposit_flow(&intent(0.0005))
        .await
        .unwrap_err();

    assert_eq!(failed.step(), FlowStep::ExecuteTransaction);
    assert_eq!(failed.error.message, "User rejected the request");
    assert_eq!(
        failed.prepared,
        Some(Template {
            id: 7,
            fee_sats: 1_410
        })
    );
    assert_eq!(failed.deposit_id, Some(DepositId::new("dep_e2e")));
}

#[tokio::test]
async fn failed_execute_resumes_without_reregistering() {
    let store = MemoryResumeStore::new();
    let deposit = intent(0.0015);

    let first = RecordingBridge::scripted(Script {
        fail_execute: Some(BridgeError::Transport("connection reset".to_string())),
        ..Script::default()
    });
    let failed = DepositFlow::new(first.clone())
        .complete_deposit_flow(&deposit)
        .await
        .unwrap_err();

    let point = failed.resume_point(&deposit).unwrap();
    store.save(&point).await.unwrap();
    assert_eq!(first.count(|c| matches!(c, Call::Create(_))), 1);

    let saved = store.get(&DepositId::new("dep_e2e")).await.unwrap().unwrap();
    assert_eq!(saved.step, FlowStep::ExecuteTransaction);

    let second = RecordingBridge::default();
    let done = DepositFlow::new(second.clone())
        .resume_deposit_flow(&saved.intent, saved.deposit_id.clone())
        .await
        .unwrap();
    store.remove(&done.deposit_id).await.unwrap();

    assert_eq!(second.count(|c| matches!(c, Call::Create(_))), 0);
    assert_eq!(second.count(|c| matches!(c, Call::Prepare(_))), 1);
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn concurrent_flows_share_nothing() {
    let bridge = RecordingBridge::default();
    let flow = Arc::new(DepositFlow::new(bridge.clone()));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let flow = Arc::clone(&flow);
            tokio::spawn(async move { flow.complete_deposit_flow(&intent(0.0005)).await.is_ok() })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap());
    }
    assert_eq!(bridge.calls().len(), 12);
}

#[tokio::test]
async fn fee_estimates_are_off_the_critical_path() {
    let bridge = RecordingBridge::default();
    let flow = DepositFlow::new(bridge.clone());

    let fees = flow.fee_estimates().await.unwrap();
    assert_eq!(fees.rate_for(FeePriority::High), 14);

    flow.complete_deposit_flow(&intent(0.0005)).await.unwrap();
    assert_eq!(bridge.count(|c| matches!(c, Call::Fees)), 1);
}
