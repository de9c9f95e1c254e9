// 未接入的外部协作方
// 进程没有链接钱包 SDK / 跨链引擎时使用，所有调用都返回 service_unavailable

use async_trait::async_trait;
use serde_json::Value;
use zeroize::Zeroizing;

use super::{
    cross_chain::{CrossChainEngine, DelegateOutInput, NormalTransferInput},
    key_service::{AddressRange, DerivedAddress, KeyService, Signature},
};
use crate::error::{AppError, AppResult};

fn unavailable<T>(what: &str) -> AppResult<T> {
    Err(AppError::service_unavailable(format!(
        "{} is not linked into this process",
        what
    )))
}

/// 未接入的钱包 SDK
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedKeyService;

const KEY_SERVICE: &str = "Wallet SDK";

#[async_trait]
impl KeyService for DetachedKeyService {
    async fn generate_mnemonic(&self, _pwd: &str) -> AppResult<Zeroizing<String>> {
        unavailable(KEY_SERVICE)
    }

    async fn has_mnemonic(&self) -> AppResult<bool> {
        unavailable(KEY_SERVICE)
    }

    async fn reveal_mnemonic(&self, _pwd: &str) -> AppResult<Zeroizing<String>> {
        unavailable(KEY_SERVICE)
    }

    async fn import_mnemonic(&self, _phrase: &str, _pwd: &str) -> AppResult<bool> {
        unavailable(KEY_SERVICE)
    }

    async fn initialize_hd_wallet(&self, _phrase: &str) -> AppResult<()> {
        unavailable(KEY_SERVICE)
    }

    async fn new_keystore_wallet(&self, _phrase: &str) -> AppResult<()> {
        unavailable(KEY_SERVICE)
    }

    async fn delete_hd_wallet(&self) -> AppResult<()> {
        unavailable(KEY_SERVICE)
    }

    async fn delete_keystore_wallet(&self) -> AppResult<()> {
        unavailable(KEY_SERVICE)
    }

    async fn connect_to_ledger(&self) -> AppResult<()> {
        unavailable("Ledger transport")
    }

    async fn is_connected(&self, _wallet_id: u32) -> bool {
        false
    }

    async fn import_keystore(
        &self,
        _path: &str,
        _content: &str,
        _key_file_pwd: &str,
        _hd_wallet_pwd: &str,
    ) -> AppResult<()> {
        unavailable(KEY_SERVICE)
    }

    async fn keystore_count(&self, _chain_id: u64) -> AppResult<u64> {
        unavailable(KEY_SERVICE)
    }

    async fn get_addresses(
        &self,
        _wallet_id: u32,
        _chain_type: &str,
        _start: u32,
        _end: u32,
    ) -> AppResult<AddressRange> {
        unavailable(KEY_SERVICE)
    }

    async fn get_address(
        &self,
        _wallet_id: u32,
        _chain_type: &str,
        _path: &str,
    ) -> AppResult<DerivedAddress> {
        unavailable(KEY_SERVICE)
    }

    async fn get_public_key(
        &self,
        _wallet_id: u32,
        _path: &str,
        _chain_id_form: bool,
    ) -> AppResult<String> {
        unavailable(KEY_SERVICE)
    }

    async fn sign_transaction(
        &self,
        _wallet_id: u32,
        _path: &str,
        _raw_tx: &Value,
    ) -> AppResult<Signature> {
        unavailable(KEY_SERVICE)
    }

    async fn create_user_account(
        &self,
        _wallet_id: u32,
        _path: &str,
        _meta: Value,
    ) -> AppResult<Value> {
        unavailable(KEY_SERVICE)
    }

    async fn get_user_account(&self, _wallet_id: u32, _path: &str) -> AppResult<Value> {
        unavailable(KEY_SERVICE)
    }

    async fn get_user_accounts_for_chain(&self, _chain_id: u64) -> AppResult<Value> {
        unavailable(KEY_SERVICE)
    }

    async fn update_user_account(
        &self,
        _wallet_id: u32,
        _path: &str,
        _meta: Value,
    ) -> AppResult<Value> {
        unavailable(KEY_SERVICE)
    }

    async fn delete_user_account(&self, _wallet_id: u32, _path: &str) -> AppResult<Value> {
        unavailable(KEY_SERVICE)
    }
}

/// 未接入的跨链引擎
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedCrossChain;

const CROSS_CHAIN: &str = "Cross-chain engine";

#[async_trait]
impl CrossChainEngine for DetachedCrossChain {
    async fn src_chain_name(&self, _symbol: &str, _chain_type: &str) -> AppResult<String> {
        unavailable(CROSS_CHAIN)
    }

    async fn invoke_normal_transfer(
        &self,
        _src_chain: &str,
        _input: NormalTransferInput,
    ) -> AppResult<Value> {
        unavailable(CROSS_CHAIN)
    }

    async fn pos_delegate_in(&self, _tx: Value) -> AppResult<Value> {
        unavailable(CROSS_CHAIN)
    }

    async fn pos_delegate_out(&self, _input: DelegateOutInput) -> AppResult<Value> {
        unavailable(CROSS_CHAIN)
    }
}
