use std::sync::Arc;

use crate::completion::GroqClient;
use crate::constants;
use crate::geocoder::NominatimGeocoder;
use crate::router::IntentRouter;

/// Endpoints and identity used for the two outbound services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub geocoder_url: String,
    pub user_agent: String,
    pub completion_url: String,
    pub model: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            geocoder_url: constants::DEFAULT_GEOCODER_URL.to_string(),
            user_agent: constants::DEFAULT_USER_AGENT.to_string(),
            completion_url: constants::DEFAULT_COMPLETION_URL.to_string(),
            model: constants::DEFAULT_MODEL.to_string(),
        }
    }
}

impl Settings {
    /// Wire the Nominatim and Groq clients into a router.
    pub fn build_router(&self) -> IntentRouter {
        let geocoder = NominatimGeocoder::new(&self.geocoder_url, &self.user_agent);
        let completion = GroqClient::new(&self.completion_url, &self.model);
        IntentRouter::new(Arc::new(geocoder), Arc::new(completion))
    }
}
