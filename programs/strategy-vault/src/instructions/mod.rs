pub mod deposit;
pub mod emergency_withdraw;
pub mod harvest;
pub mod initialize;
pub mod rebalance;
pub mod set_pause;
pub mod set_weights;
pub mod set_withdrawal_fee;
pub mod views;
pub mod whitelist_strategy;
pub mod withdraw;

pub use deposit::*;
pub use initialize::*;
pub use rebalance::*;
pub use set_pause::*;
pub use set_weights::*;
pub use set_withdrawal_fee::*;
pub use views::*;
pub use whitelist_strategy::*;
pub use withdraw::*;
