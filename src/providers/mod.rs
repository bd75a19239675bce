pub mod coinmarketcap;
pub mod transport;

pub use coinmarketcap::CoinMarketCapClient;
pub use transport::{HttpExecutor, ReqwestExecutor};
