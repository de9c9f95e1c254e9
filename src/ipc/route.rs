//! 路由与 action 的类型化定义
//!
//! 线上仍然是字符串，进入分发器后立即解析成枚举，handler 内部的 `match` 由编译器检查穷尽性。

/// 线上字符串 <-> 枚举
pub trait WireAction: Sized + Copy + Send + Sync + 'static {
    fn from_wire(s: &str) -> Option<Self>;
    fn as_wire(&self) -> &'static str;
}

macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
        }

        impl WireAction for $name {
            fn from_wire(s: &str) -> Option<Self> {
                match s {
                    $($wire => Some($name::$variant),)+
                    _ => None,
                }
            }

            fn as_wire(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_wire())
            }
        }
    };
}

wire_enum! {
    /// 功能分区
    Route {
        Phrase => "phrase",
        Wallet => "wallet",
        Address => "address",
        Account => "account",
        Transaction => "transaction",
        Query => "query",
        Staking => "staking",
    }
}

wire_enum! {
    /// 助记词
    PhraseAction {
        Generate => "generate",
        Has => "has",
        Reveal => "reveal",
        Import => "import",
        Reset => "reset",
    }
}

wire_enum! {
    /// 钱包会话与签名
    WalletAction {
        Lock => "lock",
        Unlock => "unlock",
        GetPubKey => "getPubKey",
        GetPubKeyChainId => "getPubKeyChainId",
        IsConnected => "isConnected",
        SignTransaction => "signTransaction",
        ConnectToLedger => "connectToLedger",
    }
}

wire_enum! {
    /// 地址派生与查询
    AddressAction {
        Get => "get",
        GetOne => "getOne",
        GetNonce => "getNonce",
        Balance => "balance",
        IsWanAddress => "isWanAddress",
        FromKeyFile => "fromKeyFile",
    }
}

wire_enum! {
    /// 用户账户
    AccountAction {
        Create => "create",
        Get => "get",
        GetAll => "getAll",
        Update => "update",
        Delete => "delete",
    }
}

wire_enum! {
    /// 交易提交与记录
    TransactionAction {
        Normal => "normal",
        Raw => "raw",
        EstimateGas => "estimateGas",
        ShowRecords => "showRecords",
        InsertTransToDb => "insertTransToDB",
    }
}

wire_enum! {
    /// 配置与链上参数查询
    QueryAction {
        Config => "config",
        GetGasPrice => "getGasPrice",
    }
}

wire_enum! {
    /// PoS 委托
    StakingAction {
        Info => "info",
        TxHistory => "txHistory",
        DelegateIn => "delegateIn",
        DelegateOut => "delegateOut",
        TxDetail => "txDetail",
    }
}
