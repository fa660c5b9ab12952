//! 百度网盘分享转存模块

pub mod client;
pub mod error;
pub mod parser;
pub mod share;
pub mod transfer;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use client::ShareClient;
pub use error::{ShareError, TransportError};
pub use parser::{classify_share_page, extract_metajson, extract_share_code, SharePage};
pub use transport::{HttpTransport, PanRequest, Transport};
pub use types::{
    QueryMode, RequestOutcome, ShareMetadata, ShareReference, TransferErrorCode, TransferOptions,
    TransferReceipt,
};
