//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use sales_deck_core::{
    ports::{DatabaseService, SessionExchangeService, TextGenerationService},
    AssetService, AuthService, ClientService, DeckService, LeadService,
};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
/// Every service holds the same storage handle.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth: AuthService,
    pub clients: ClientService,
    pub assets: AssetService,
    pub leads: LeadService,
    pub decks: DeckService,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        db: Arc<dyn DatabaseService>,
        session_exchange: Arc<dyn SessionExchangeService>,
        text_generator: Arc<dyn TextGenerationService>,
    ) -> Self {
        Self {
            config,
            auth: AuthService::new(db.clone(), session_exchange),
            clients: ClientService::new(db.clone()),
            assets: AssetService::new(db.clone()),
            leads: LeadService::new(db.clone()),
            decks: DeckService::new(db, text_generator),
        }
    }
}
