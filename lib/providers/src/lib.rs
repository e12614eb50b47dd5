//! HTTP implementations of the askschema collaborator traits.

pub mod honeycomb;
pub mod openai;

pub use honeycomb::HoneycombClient;
pub use openai::{OpenAiClient, OpenAiConfig};
