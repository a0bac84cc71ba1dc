// Defaults for the external collaborators. Each one can be overridden from the
// command line or the environment (see `config.rs`).

pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_USER_AGENT: &str = "streamlit-app";

pub const DEFAULT_COMPLETION_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama3-8b-8192";

pub const DEFAULT_PORT: u16 = 9900;

pub const APP_TITLE: &str = "🗺️ GIS Mapping Chatbot (Groq + Nominatim)";
pub const CREDENTIAL_PROMPT: &str = "Enter your Groq API Key";
pub const MISSING_CREDENTIAL_INFO: &str = "Please enter your Groq API key to continue.";
pub const CHAT_PLACEHOLDER: &str = "Ask a location (e.g., 'Show me Shailer Park') or anything else";

/// Zoom level used for every rendered location map.
pub const MAP_ZOOM: u8 = 13;
