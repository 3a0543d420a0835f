pub mod deploy;
pub mod mint;
pub mod redeem;
pub mod proposal;
pub mod auction;
pub mod accept_bid;
pub mod external_call;
pub mod admin;
pub mod views;

pub use deploy::*;
pub use mint::*;
pub use redeem::*;
pub use proposal::*;
pub use auction::*;
pub use accept_bid::*;
pub use external_call::*;
pub use admin::*;
pub use views::*;
