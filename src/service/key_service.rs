//! 钱包 SDK 的密钥/签名接口
//!
//! 本进程从不直接接触私钥：助记词管理、HD 派生、secp256k1 签名都由外部 SDK 完成，
//! 这里只定义分发层需要的能力。SDK 抛出的错误以 [`AppError`] 原样透传，
//! 保留其 category 与 errno。
//!
//! [`AppError`]: crate::error::AppError

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::AppResult;

/// 派生出的地址（不带 `0x` 前缀，与 SDK 一致）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedAddress {
    pub path: String,
    pub address: String,
}

/// 一段连续索引的派生结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRange {
    pub start: u32,
    pub addresses: Vec<DerivedAddress>,
}

/// secp256k1 签名分量（原始字节）
#[derive(Debug, Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Signature {
    pub r: Vec<u8>,
    pub s: Vec<u8>,
    pub v: Vec<u8>,
}

impl Signature {
    /// 转成 UI 需要的 `{r, s, v}`，每个分量都是 `0x` 开头的十六进制
    pub fn to_hex_json(&self) -> Value {
        serde_json::json!({
            "r": format!("0x{}", hex::encode(&self.r)),
            "s": format!("0x{}", hex::encode(&self.s)),
            "v": format!("0x{}", hex::encode(&self.v)),
        })
    }
}

/// 外部钱包 SDK
#[async_trait]
pub trait KeyService: Send + Sync {
    // ---- 助记词 ----
    async fn generate_mnemonic(&self, pwd: &str) -> AppResult<Zeroizing<String>>;
    async fn has_mnemonic(&self) -> AppResult<bool>;
    async fn reveal_mnemonic(&self, pwd: &str) -> AppResult<Zeroizing<String>>;
    async fn import_mnemonic(&self, phrase: &str, pwd: &str) -> AppResult<bool>;

    // ---- 钱包会话 ----
    async fn initialize_hd_wallet(&self, phrase: &str) -> AppResult<()>;
    async fn new_keystore_wallet(&self, phrase: &str) -> AppResult<()>;
    async fn delete_hd_wallet(&self) -> AppResult<()>;
    async fn delete_keystore_wallet(&self) -> AppResult<()>;
    async fn connect_to_ledger(&self) -> AppResult<()>;
    /// walletID 对应的钱包当前是否可用
    async fn is_connected(&self, wallet_id: u32) -> bool;

    // ---- keystore 导入 ----
    async fn import_keystore(
        &self,
        path: &str,
        content: &str,
        key_file_pwd: &str,
        hd_wallet_pwd: &str,
    ) -> AppResult<()>;
    async fn keystore_count(&self, chain_id: u64) -> AppResult<u64>;

    // ---- 派生与签名 ----
    async fn get_addresses(
        &self,
        wallet_id: u32,
        chain_type: &str,
        start: u32,
        end: u32,
    ) -> AppResult<AddressRange>;
    async fn get_address(
        &self,
        wallet_id: u32,
        chain_type: &str,
        path: &str,
    ) -> AppResult<DerivedAddress>;
    /// `chain_id_form` 为 true 时返回压缩格式公钥
    async fn get_public_key(
        &self,
        wallet_id: u32,
        path: &str,
        chain_id_form: bool,
    ) -> AppResult<String>;
    async fn sign_transaction(
        &self,
        wallet_id: u32,
        path: &str,
        raw_tx: &Value,
    ) -> AppResult<Signature>;

    // ---- 用户账户 ----
    async fn create_user_account(&self, wallet_id: u32, path: &str, meta: Value)
        -> AppResult<Value>;
    async fn get_user_account(&self, wallet_id: u32, path: &str) -> AppResult<Value>;
    async fn get_user_accounts_for_chain(&self, chain_id: u64) -> AppResult<Value>;
    async fn update_user_account(&self, wallet_id: u32, path: &str, meta: Value)
        -> AppResult<Value>;
    async fn delete_user_account(&self, wallet_id: u32, path: &str) -> AppResult<Value>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_hex_format() {
        let sig = Signature {
            r: vec![0xab, 0x01],
            s: vec![0x00, 0xff],
            v: vec![0x1c],
        };
        let v = sig.to_hex_json();
        assert_eq!(v["r"], "0xab01");
        assert_eq!(v["s"], "0x00ff");
        assert_eq!(v["v"], "0x1c");
    }
}
