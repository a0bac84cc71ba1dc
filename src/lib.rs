pub mod chat;
pub mod completion;
pub mod config;
pub mod constants;
pub mod geocoder;
pub mod intent;
pub mod router;
pub mod transcript;
pub mod web_server;

pub use completion::{CompletionClient, CompletionError, GroqClient};
pub use config::Settings;
pub use geocoder::{GeoPoint, GeocodeError, Geocoder, NominatimGeocoder};
pub use router::{AssistantReply, IntentRouter, MapView, Marker, ReplyKind, RouterError};
pub use transcript::{ChatMessage, Role, Transcript, TranscriptError};
