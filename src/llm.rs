//! Optional text-generation capability.
//!
//! Absence is an expected state: [`Offline`] and `None` report themselves unavailable and
//! return nothing, which sends every caller down its deterministic path.

use serde_json::Value;
use std::future::Future;

pub trait TextGenerator: Send + Sync {
    fn is_available(&self) -> bool;

    fn generate_text(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
    ) -> impl Future<Output = Option<String>> + Send;

    fn generate_json(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
    ) -> impl Future<Output = Option<Value>> + Send;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Offline;

impl TextGenerator for Offline {
    fn is_available(&self) -> bool {
        false
    }

    async fn generate_text(&self, _system: &str, _user: &str, _max_tokens: u32) -> Option<String> {
        None
    }

    async fn generate_json(&self, _system: &str, _user: &str, _max_tokens: u32) -> Option<Value> {
        None
    }
}

impl<G: TextGenerator> TextGenerator for Option<G> {
    fn is_available(&self) -> bool {
        self.as_ref().map(TextGenerator::is_available).unwrap_or(false)
    }

    async fn generate_text(&self, system: &str, user: &str, max_tokens: u32) -> Option<String> {
        match self {
            Some(generator) => generator.generate_text(system, user, max_tokens).await,
            None => None,
        }
    }

    async fn generate_json(&self, system: &str, user: &str, max_tokens: u32) -> Option<Value> {
        match self {
            Some(generator) => generator.generate_json(system, user, max_tokens).await,
            None => None,
        }
    }
}

/// Outermost `{...}` span of a model reply, for replies that wrap JSON in prose or fences.
pub fn extract_json(text: &str) -> Option<String> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if start >= end {
        return None;
    }
    Some(text[start..=end].to_string())
}

/// Trimmed text, or `None` when nothing usable came back.
pub fn usable_text(text: Option<String>) -> Option<String> {
    text.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
