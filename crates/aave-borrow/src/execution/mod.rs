pub mod aave_client;
pub mod account;
pub mod approval;
pub mod contracts;
pub mod market;
pub mod oracle;
pub mod pool_locator;
pub mod revert;
pub mod wrap;

#[cfg(test)]
pub(crate) mod mock;
