mod auth;
mod search;

pub use auth::CredentialProvider;
pub use search::{
    Notice, SearchOrchestrator, SearchOutcome, SearchResult, SearchState, SearchTicket,
};
