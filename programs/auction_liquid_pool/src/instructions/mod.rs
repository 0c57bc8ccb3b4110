pub mod admin;
pub mod auction;
pub mod deposit;
pub mod lifecycle;
pub mod oracle;
pub mod redeem;
pub mod shared;
