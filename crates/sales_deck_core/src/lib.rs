pub mod auth;
pub mod deck;
pub mod domain;
pub mod error;
pub mod memory;
pub mod ports;
pub mod resources;

pub use auth::{AuthService, LoginOutcome};
pub use deck::{DeckOutcome, DeckService, GeneratedDeck};
pub use domain::{
    Asset, AssetType, AuthSession, Client, ClientPatch, DeckContent, ExternalIdentity, Lead,
    LeadChanges, LeadPatch, LeadStatus, SalesDeck, Slide, User,
};
pub use error::{ServiceError, ServiceResult};
pub use memory::InMemoryDatabase;
pub use ports::{
    DatabaseService, PortError, PortResult, SessionExchangeService, TextGenerationService,
};
pub use resources::{AssetService, ClientService, LeadService};
