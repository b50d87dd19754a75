//! Span conventions for calls to external providers.
//!
//! Speech calls and room token signing run inside a `provider.call` span
//! carrying the provider and operation names.

use tracing::Span;

/// Name of the span wrapping an outbound provider call.
pub const PROVIDER_CALL_SPAN: &str = "provider.call";

// --- Provider names ---

pub const PROVIDER_DEEPGRAM: &str = "deepgram";
pub const PROVIDER_LIVEKIT: &str = "livekit";

// --- Operation names ---

/// Temporary transcription credential.
pub const OP_GRANT_TOKEN: &str = "grant_token";

/// Text-to-speech synthesis.
pub const OP_SYNTHESIZE: &str = "synthesize";

/// Room access token signing (local, no network).
pub const OP_ISSUE_ROOM_TOKEN: &str = "issue_room_token";

/// Span for one outbound provider call.
pub fn provider_span(provider: &'static str, operation: &'static str) -> Span {
    tracing::info_span!(
        "provider.call",
        provider.name = provider,
        provider.operation = operation,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_span_name() {
        let span = provider_span(PROVIDER_DEEPGRAM, OP_GRANT_TOKEN);
        // Disabled without a subscriber, but the metadata is static.
        if let Some(meta) = span.metadata() {
            assert_eq!(meta.name(), PROVIDER_CALL_SPAN);
        }
    }
}
