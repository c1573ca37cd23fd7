pub mod account;
pub mod amount;
pub mod asset;

pub use account::{AccountPosition, PriceSample, RawAccountData, RoundData};
pub use amount::Amount;
pub use asset::Asset;
