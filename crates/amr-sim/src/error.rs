use amr_auction::AuctionError;
use amr_order::OrderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("duplicate subscription to topic {0}")]
    DuplicateSubscription(String),

    #[error("message addressed to unknown connection {0}")]
    UnknownConnection(String),

    #[error("event limit of {0} exceeded — the protocol is not converging")]
    EventLimitExceeded(usize),

    #[error(transparent)]
    Auction(#[from] AuctionError),

    #[error(transparent)]
    Order(#[from] OrderError),
}

pub type SimResult<T> = Result<T, SimError>;
