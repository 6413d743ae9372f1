pub mod db;
pub mod deck_llm;
pub mod session_exchange;

pub use db::DbAdapter;
pub use deck_llm::OpenAiDeckAdapter;
pub use session_exchange::HttpSessionExchangeAdapter;
