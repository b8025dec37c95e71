// CV validation: extract PDF text, ask the model whether the declared fields agree
// with it, and normalize the reply. All provider calls go through llm_client.

pub mod extractor;
pub mod handlers;
pub mod models;
pub mod normalizer;
pub mod pipeline;
pub mod prompts;
