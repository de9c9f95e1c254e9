//! 测试辅助模块
//! 内存版的钱包 SDK、链客户端、跨链引擎和设置存储，以及组装好的应用状态

#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use ethers::types::U256;
use serde_json::{json, Value};
use wandcore::{
    app_state::AppState,
    config::Config,
    domain::staking::{DelegationRecord, IncentiveRecord, StakerRecord},
    error::{AppError, AppResult},
    ipc::{Dispatcher, EndpointRegistry},
    service::{
        chain_client::ChainClient,
        cross_chain::{CrossChainEngine, DelegateOutInput, NormalTransferInput},
        key_service::{AddressRange, DerivedAddress, KeyService, Signature},
        settings_store::SettingsStore,
    },
};
use zeroize::Zeroizing;

pub const TEST_PASSWORD: &str = "correct horse";
pub const TEST_MNEMONIC: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

/// 1 个币（18 位小数）
pub fn coins(n: u64) -> U256 {
    U256::from(n) * U256::exp10(18)
}

// ============ 钱包 SDK ============

#[derive(Default)]
pub struct MockKeys {
    /// lock 时 delete_hd_wallet 返回的错误
    pub lock_error: Option<AppError>,
    pub ledger_error: Option<AppError>,
    pub keystore_count: u64,
    pub unlocked: Mutex<bool>,
    pub imported_keystores: Mutex<Vec<String>>,
}

#[async_trait]
impl KeyService for MockKeys {
    async fn generate_mnemonic(&self, _pwd: &str) -> AppResult<Zeroizing<String>> {
        Ok(Zeroizing::new(TEST_MNEMONIC.to_string()))
    }

    async fn has_mnemonic(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn reveal_mnemonic(&self, pwd: &str) -> AppResult<Zeroizing<String>> {
        if pwd != TEST_PASSWORD {
            return Err(AppError::invalid_password("Wrong password").with_errno(Some(-1)));
        }
        Ok(Zeroizing::new(TEST_MNEMONIC.to_string()))
    }

    async fn import_mnemonic(&self, _phrase: &str, _pwd: &str) -> AppResult<bool> {
        Ok(true)
    }

    async fn initialize_hd_wallet(&self, _phrase: &str) -> AppResult<()> {
        *self.unlocked.lock().unwrap() = true;
        Ok(())
    }

    async fn new_keystore_wallet(&self, _phrase: &str) -> AppResult<()> {
        Ok(())
    }

    async fn delete_hd_wallet(&self) -> AppResult<()> {
        if let Some(e) = &self.lock_error {
            return Err(e.clone());
        }
        *self.unlocked.lock().unwrap() = false;
        Ok(())
    }

    async fn delete_keystore_wallet(&self) -> AppResult<()> {
        Ok(())
    }

    async fn connect_to_ledger(&self) -> AppResult<()> {
        match &self.ledger_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    async fn is_connected(&self, wallet_id: u32) -> bool {
        wallet_id == 1 && *self.unlocked.lock().unwrap()
    }

    async fn import_keystore(
        &self,
        path: &str,
        _content: &str,
        _key_file_pwd: &str,
        _hd_wallet_pwd: &str,
    ) -> AppResult<()> {
        self.imported_keystores.lock().unwrap().push(path.to_string());
        Ok(())
    }

    async fn keystore_count(&self, _chain_id: u64) -> AppResult<u64> {
        Ok(self.keystore_count)
    }

    async fn get_addresses(
        &self,
        _wallet_id: u32,
        _chain_type: &str,
        start: u32,
        end: u32,
    ) -> AppResult<AddressRange> {
        let addresses = (start..end)
            .map(|i| DerivedAddress {
                path: format!("m/44'/5718350'/0'/0/{}", i),
                address: format!("{:040x}", i + 1),
            })
            .collect();
        Ok(AddressRange { start, addresses })
    }

    async fn get_address(
        &self,
        _wallet_id: u32,
        _chain_type: &str,
        path: &str,
    ) -> AppResult<DerivedAddress> {
        Ok(DerivedAddress {
            path: path.to_string(),
            address: "aa".repeat(20),
        })
    }

    async fn get_public_key(
        &self,
        _wallet_id: u32,
        _path: &str,
        chain_id_form: bool,
    ) -> AppResult<String> {
        Ok(if chain_id_form { "02ab" } else { "04ab" }.to_string())
    }

    async fn sign_transaction(
        &self,
        _wallet_id: u32,
        _path: &str,
        _raw_tx: &Value,
    ) -> AppResult<Signature> {
        Ok(Signature {
            r: vec![0x11; 32],
            s: vec![0x22; 32],
            v: vec![0x1c],
        })
    }

    async fn create_user_account(&self, wallet_id: u32, path: &str, meta: Value) -> AppResult<Value> {
        Ok(json!({ "walletID": wallet_id, "path": path, "meta": meta }))
    }

    async fn get_user_account(&self, wallet_id: u32, path: &str) -> AppResult<Value> {
        Ok(json!({ "walletID": wallet_id, "path": path }))
    }

    async fn get_user_accounts_for_chain(&self, chain_id: u64) -> AppResult<Value> {
        Ok(json!({ "chainID": chain_id, "accounts": {} }))
    }

    async fn update_user_account(&self, wallet_id: u32, path: &str, meta: Value) -> AppResult<Value> {
        Ok(json!({ "walletID": wallet_id, "path": path, "meta": meta }))
    }

    async fn delete_user_account(&self, _wallet_id: u32, _path: &str) -> AppResult<Value> {
        Ok(json!(true))
    }
}

// ============ 链客户端 ============

#[derive(Default)]
pub struct MockChain {
    pub epoch: u64,
    pub block: u64,
    pub gas_price: U256,
    pub balances: HashMap<String, U256>,
    pub stakes: HashMap<String, Vec<DelegationRecord>>,
    pub incentives: HashMap<String, Vec<IncentiveRecord>>,
    pub stakers: Vec<StakerRecord>,
    /// 设置后 get_staker_info 返回该错误
    pub staker_error: Option<AppError>,
    pub records: Mutex<Vec<Value>>,
}

#[async_trait]
impl ChainClient for MockChain {
    async fn get_balance(&self, address: &str) -> AppResult<U256> {
        Ok(self.balances.get(address).copied().unwrap_or_default())
    }

    async fn get_nonce(&self, _address: &str, _chain_type: &str, include_pending: bool) -> AppResult<u64> {
        Ok(if include_pending { 8 } else { 7 })
    }

    async fn get_gas_price(&self, _chain_type: &str) -> AppResult<U256> {
        Ok(self.gas_price)
    }

    async fn estimate_gas(&self, _chain_type: &str, _tx: &Value) -> AppResult<u64> {
        Ok(21_000)
    }

    async fn send_raw_transaction(&self, _raw: &str, _chain_type: &str) -> AppResult<String> {
        Ok(format!("0x{}", "ab".repeat(32)))
    }

    async fn is_address(&self, address: &str) -> AppResult<bool> {
        Ok(address.len() == 42)
    }

    async fn get_epoch_id(&self, _chain: &str) -> AppResult<u64> {
        Ok(self.epoch)
    }

    async fn get_block_number(&self, _chain: &str) -> AppResult<u64> {
        Ok(self.block)
    }

    async fn get_staker_info(&self, _chain: &str, _block_number: u64) -> AppResult<Vec<StakerRecord>> {
        match &self.staker_error {
            Some(e) => Err(e.clone()),
            None => Ok(self.stakers.clone()),
        }
    }

    async fn get_delegator_stake_info(&self, _chain: &str, address: &str) -> AppResult<Vec<DelegationRecord>> {
        Ok(self.stakes.get(address).cloned().unwrap_or_default())
    }

    async fn get_delegator_incentive(&self, _chain: &str, address: &str) -> AppResult<Vec<IncentiveRecord>> {
        Ok(self.incentives.get(address).cloned().unwrap_or_default())
    }

    async fn normal_records(&self) -> AppResult<Vec<Value>> {
        Ok(self.records.lock().unwrap().clone())
    }

    async fn insert_normal_record(&self, record: Value) -> AppResult<()> {
        self.records.lock().unwrap().push(record);
        Ok(())
    }
}

// ============ 跨链引擎 ============

#[derive(Default)]
pub struct MockCrossChain {
    pub delegate_in: Mutex<Vec<Value>>,
    pub delegate_out: Mutex<Vec<DelegateOutInput>>,
    pub transfers: Mutex<Vec<NormalTransferInput>>,
}

#[async_trait]
impl CrossChainEngine for MockCrossChain {
    async fn src_chain_name(&self, symbol: &str, _chain_type: &str) -> AppResult<String> {
        Ok(symbol.to_string())
    }

    async fn invoke_normal_transfer(&self, _src_chain: &str, input: NormalTransferInput) -> AppResult<Value> {
        self.transfers.lock().unwrap().push(input);
        Ok(json!({ "code": true, "result": "0xhash" }))
    }

    async fn pos_delegate_in(&self, tx: Value) -> AppResult<Value> {
        self.delegate_in.lock().unwrap().push(tx);
        Ok(json!({ "code": true }))
    }

    async fn pos_delegate_out(&self, input: DelegateOutInput) -> AppResult<Value> {
        self.delegate_out.lock().unwrap().push(input);
        Ok(json!({ "code": true }))
    }
}

// ============ 设置存储 ============

#[derive(Default)]
pub struct MockSettings {
    pub values: Mutex<HashMap<String, Value>>,
}

#[async_trait]
impl SettingsStore for MockSettings {
    async fn get(&self, key: &str) -> AppResult<Option<Value>> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> AppResult<()> {
        self.values.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }

    async fn switch_network(&self) -> AppResult<String> {
        Ok("testnet".into())
    }
}

// ============ 组装 ============

pub struct Harness {
    pub state: AppState,
    pub keys: Arc<MockKeys>,
    pub chain: Arc<MockChain>,
    pub cross_chain: Arc<MockCrossChain>,
    pub settings: Arc<MockSettings>,
}

impl Harness {
    pub fn new(keys: MockKeys, chain: MockChain) -> Self {
        Self::with_config(Config::default(), keys, chain)
    }

    pub fn with_config(config: Config, keys: MockKeys, chain: MockChain) -> Self {
        let keys = Arc::new(keys);
        let chain = Arc::new(chain);
        let cross_chain = Arc::new(MockCrossChain::default());
        let settings = Arc::new(MockSettings::default());

        let state = AppState::new(
            Arc::new(config),
            keys.clone(),
            chain.clone(),
            cross_chain.clone(),
            settings.clone(),
            Arc::new(EndpointRegistry::new()),
        );

        Self {
            state,
            keys,
            chain,
            cross_chain,
            settings,
        }
    }

    pub fn dispatcher(&self) -> Dispatcher {
        wandcore::build_dispatcher(&self.state).expect("routes register")
    }
}
