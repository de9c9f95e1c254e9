pub mod error_codes;
pub mod units; // ✅ U256 精确金额与显示格式

pub use error_codes::ErrorCode;
