//! Intent routing: decides, per user message, whether to geocode or to ask the
//! language model, and turns the outcome into an assistant reply.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::completion::CompletionClient;
use crate::constants::MAP_ZOOM;
use crate::geocoder::{GeoPoint, Geocoder};
use crate::intent;
use crate::transcript::{Transcript, TranscriptError};

pub const FALLBACK_BANNER: &str = "❌ Could not locate on map. Here's what I found instead:\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    /// The geocoder found the place; a map accompanies the reply.
    Located,
    /// Location intent, but geocoding failed and the model answered instead.
    Fallback,
    /// Not a location request; the model's answer verbatim.
    Chat,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub position: GeoPoint,
    pub label: String,
}

/// Map to render alongside a reply: centered on a place, with one labeled marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: GeoPoint,
    pub zoom: u8,
    pub marker: Marker,
}

impl MapView {
    pub fn centered_on(point: GeoPoint, label: impl Into<String>) -> Self {
        Self {
            center: point,
            zoom: MAP_ZOOM,
            marker: Marker {
                position: point,
                label: label.into(),
            },
        }
    }

    /// Link to the same view on openstreetmap.org, for surfaces that can't draw a map.
    pub fn openstreetmap_url(&self) -> String {
        format!(
            "https://www.openstreetmap.org/?mlat={lat:.4}&mlon={lon:.4}#map={zoom}/{lat:.4}/{lon:.4}",
            lat = self.center.latitude,
            lon = self.center.longitude,
            zoom = self.zoom,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssistantReply {
    pub kind: ReplyKind,
    /// Text recorded in the transcript.
    pub content: String,
    /// Shown above `content` for this turn only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map: Option<MapView>,
}

impl AssistantReply {
    fn located(place: &str, point: GeoPoint) -> Self {
        let content = format!(
            "📍 **{place}** is at:\n- Latitude: {:.4}\n- Longitude: {:.4}",
            point.latitude, point.longitude
        );
        Self {
            kind: ReplyKind::Located,
            content,
            banner: None,
            map: Some(MapView::centered_on(point, place)),
        }
    }

    fn fallback(text: String) -> Self {
        Self {
            kind: ReplyKind::Fallback,
            content: text,
            banner: Some(FALLBACK_BANNER),
            map: None,
        }
    }

    fn chat(text: String) -> Self {
        Self {
            kind: ReplyKind::Chat,
            content: text,
            banner: None,
            map: None,
        }
    }

    /// The text to render for this turn.
    pub fn display(&self) -> String {
        match self.banner {
            Some(banner) => format!("{banner}{}", self.content),
            None => self.content.clone(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouterError {
    #[error("no API key supplied")]
    MissingCredential,
    #[error(transparent)]
    Transcript(#[from] TranscriptError),
}

#[derive(Clone)]
pub struct IntentRouter {
    geocoder: Arc<dyn Geocoder>,
    completion: Arc<dyn CompletionClient>,
}

impl IntentRouter {
    pub fn new(geocoder: Arc<dyn Geocoder>, completion: Arc<dyn CompletionClient>) -> Self {
        Self {
            geocoder,
            completion,
        }
    }

    /// Answer one user message. Never fails: lookup problems fall back to the
    /// model and model errors become the reply text.
    #[instrument(skip(self, credential))]
    pub async fn route(&self, message: &str, credential: &str) -> AssistantReply {
        if !intent::is_location_intent(message) {
            debug!("No location keywords, forwarding message to completion");
            return AssistantReply::chat(self.ask(message, credential).await);
        }

        let query = intent::derive_location_query(message);
        debug!(%query, "Location intent detected");

        match self.geocoder.geocode(&query).await {
            Ok(Some(point)) => {
                info!(%query, lat = point.latitude, lon = point.longitude, "Location found");
                AssistantReply::located(&intent::title_case(&query), point)
            }
            Ok(None) => {
                info!(%query, "No geocoding match, falling back to completion");
                self.fallback(&query, credential).await
            }
            Err(e) => {
                warn!(%query, error = %e, "Geocoding failed, falling back to completion");
                self.fallback(&query, credential).await
            }
        }
    }

    /// Run one full turn against a caller-owned transcript: record the user
    /// message, route it, and record the reply.
    ///
    /// Nothing is appended and no request is made if the credential is empty
    /// or the transcript is still waiting on a reply.
    pub async fn handle_turn(
        &self,
        transcript: &mut Transcript,
        message: &str,
        credential: &str,
    ) -> Result<AssistantReply, RouterError> {
        if credential.is_empty() {
            return Err(RouterError::MissingCredential);
        }
        transcript.push_user(message)?;
        let reply = self.route(message, credential).await;
        transcript.push_assistant(reply.content.clone())?;
        Ok(reply)
    }

    async fn fallback(&self, query: &str, credential: &str) -> AssistantReply {
        let prompt = format!("Where is {query}?");
        AssistantReply::fallback(self.ask(&prompt, credential).await)
    }

    async fn ask(&self, prompt: &str, credential: &str) -> String {
        match self.completion.complete(prompt, credential).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Completion call failed");
                e.to_string()
            }
        }
    }
}
