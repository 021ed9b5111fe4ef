// Host module - THE NETWORK
// Abstract ledger host plus the development chain and JSON-RPC backends

mod devnet;
mod rpc;
mod traits;
mod tx;

pub use devnet::{ChainState, DevNetwork, DevNetworkConfig, MiningMode, DEV_CHAIN_ID, TX_BASE_GAS};
pub use rpc::{RpcHost, RpcHostConfig};
pub use traits::{CallRequest, HostError, LedgerHost, Receipt, ReceiptStatus};
pub use tx::{SignedTransaction, TransactionRequest, TxError, TxHash, MAX_CHAIN_ID};
