//! crates/sales_deck_core/src/deck.rs
//!
//! Deck generation: gathers the lead, its client and the owner's assets into a
//! prompt, asks the text generation provider for a JSON deck, and stores the
//! result. Unparsable provider output degrades to a one-slide fallback deck.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{Asset, AssetType, Client, DeckContent, Lead, SalesDeck, Slide};
use crate::error::{ServiceError, ServiceResult};
use crate::ports::{DatabaseService, TextGenerationService};
use crate::resources::LIST_LIMIT;

const SYSTEM_PROMPT: &str = "You are an expert sales presentation creator. Generate compelling, professional sales deck content in JSON format.";

const DECK_SCHEMA: &str = r#"{
    "title": "Presentation title",
    "slides": [
        {
            "type": "title",
            "title": "Main title",
            "subtitle": "Tagline"
        },
        {
            "type": "problem",
            "title": "The Challenge",
            "points": ["point 1", "point 2", "point 3"]
        },
        {
            "type": "solution",
            "title": "Our Solution",
            "description": "Solution overview",
            "points": ["benefit 1", "benefit 2", "benefit 3"]
        },
        {
            "type": "features",
            "title": "Key Features",
            "features": [
                {"name": "Feature 1", "description": "Description"},
                {"name": "Feature 2", "description": "Description"}
            ]
        },
        {
            "type": "use_case",
            "title": "Industry Application",
            "description": "How it applies to their industry"
        },
        {
            "type": "roi",
            "title": "Value Proposition",
            "metrics": [
                {"label": "Time Saved", "value": "10-15 hours/week"},
                {"label": "Efficiency", "value": "300% increase"}
            ]
        },
        {
            "type": "cta",
            "title": "Next Steps",
            "description": "Call to action",
            "action": "Schedule a demo"
        }
    ]
}"#;

const NOT_PROVIDED: &str = "Not provided";

/// How the stored content was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeckOutcome {
    /// The provider's answer parsed into a valid deck.
    Generated,
    /// The provider's answer was unusable; the fallback deck was stored instead.
    Fallback { reason: String },
}

impl DeckOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self, DeckOutcome::Fallback { .. })
    }
}

#[derive(Debug, Clone)]
pub struct GeneratedDeck {
    pub deck: SalesDeck,
    pub outcome: DeckOutcome,
}

/// Joins the content of each asset group, newline separated.
pub struct AssetDigest {
    pub product_descriptions: String,
    pub use_cases: String,
}

impl AssetDigest {
    pub fn from_assets<'a>(assets: impl IntoIterator<Item = &'a Asset>) -> Self {
        let mut products = Vec::new();
        let mut use_cases = Vec::new();
        for asset in assets {
            match asset.asset_type {
                AssetType::ProductDescription => products.push(asset.content.as_str()),
                AssetType::UseCase => use_cases.push(asset.content.as_str()),
                AssetType::General => {}
            }
        }
        let join = |parts: Vec<&str>| {
            if parts.is_empty() {
                NOT_PROVIDED.to_string()
            } else {
                parts.join("\n")
            }
        };
        Self {
            product_descriptions: join(products),
            use_cases: join(use_cases),
        }
    }
}

pub fn build_context(client: &Client, lead: &Lead, digest: &AssetDigest) -> String {
    format!(
        "Client Information:\n\
         - Name: {}\n\
         - Industry: {}\n\
         - Description: {}\n\
         \n\
         Lead Information:\n\
         - Project Scope: {}\n\
         - Notes: {}\n\
         \n\
         Product Information:\n\
         {}\n\
         \n\
         Industry Use Cases:\n\
         {}\n",
        client.name,
        client.industry,
        client.description,
        lead.project_scope,
        lead.notes,
        digest.product_descriptions,
        digest.use_cases,
    )
}

pub fn build_prompt(context: &str) -> String {
    format!(
        "Based on the following context, create a comprehensive B2B SaaS sales presentation with 8-10 slides.\n\n\
         {}\n\
         Return ONLY a JSON object with this exact structure (no markdown, no code blocks):\n{}\n",
        context, DECK_SCHEMA
    )
}

/// Removes a markdown code fence around the provider's answer: the opening
/// fence line, and the last line when it is a closing fence.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    let Some((_, body)) = trimmed.split_once('\n') else {
        return "";
    };
    if body.ends_with("```") {
        return match body.rsplit_once('\n') {
            Some((inner, _)) => inner,
            None => "",
        };
    }
    body
}

pub fn parse_deck(raw: &str) -> Result<DeckContent, serde_json::Error> {
    serde_json::from_str(strip_code_fence(raw))
}

pub fn fallback_deck(client_name: &str) -> DeckContent {
    DeckContent {
        title: format!("Sales Presentation for {}", client_name),
        slides: vec![Slide::Title {
            title: format!("Partnership Proposal for {}", client_name),
            subtitle: "Transform Your Business".to_string(),
        }],
    }
}

#[derive(Clone)]
pub struct DeckService {
    db: Arc<dyn DatabaseService>,
    generator: Arc<dyn TextGenerationService>,
}

impl DeckService {
    pub fn new(db: Arc<dyn DatabaseService>, generator: Arc<dyn TextGenerationService>) -> Self {
        Self { db, generator }
    }

    /// Generates and stores a new deck for an owned lead. Every call appends a deck.
    pub async fn generate(&self, owner_id: &str, lead_id: Uuid) -> ServiceResult<GeneratedDeck> {
        let lead = self
            .db
            .find_lead(owner_id, lead_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Lead"))?;
        let client = self
            .db
            .find_client(owner_id, lead.client_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Client"))?;
        let assets = self.db.list_assets(owner_id, None, LIST_LIMIT).await?;

        let digest = AssetDigest::from_assets(&assets);
        let prompt = build_prompt(&build_context(&client, &lead, &digest));

        info!(%lead_id, assets = assets.len(), "Requesting deck generation");
        let raw = self
            .generator
            .generate_text(SYSTEM_PROMPT, &prompt)
            .await
            .map_err(|e| ServiceError::Upstream(e.to_string()))?;

        let (content, outcome) = match parse_deck(&raw) {
            Ok(content) => (content, DeckOutcome::Generated),
            Err(e) => {
                warn!(%lead_id, error = %e, "Provider output unusable, storing fallback deck");
                (
                    fallback_deck(&client.name),
                    DeckOutcome::Fallback {
                        reason: e.to_string(),
                    },
                )
            }
        };

        let deck = SalesDeck {
            id: Uuid::new_v4(),
            user_id: owner_id.to_string(),
            lead_id,
            lead_name: lead.client_name,
            content,
            created_at: Utc::now(),
        };
        self.db.insert_deck(&deck).await?;
        Ok(GeneratedDeck { deck, outcome })
    }

    pub async fn get(&self, owner_id: &str, deck_id: Uuid) -> ServiceResult<SalesDeck> {
        self.db
            .find_deck(owner_id, deck_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Deck"))
    }

    pub async fn list(&self, owner_id: &str) -> ServiceResult<Vec<SalesDeck>> {
        Ok(self.db.list_decks(owner_id, LIST_LIMIT).await?)
    }
}
