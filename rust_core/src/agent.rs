//! Agent facade
//!
//! `MomentumAgent::assist` classifies a query, dispatches it to exactly one
//! handler and returns a lazy stream of response chunks. Handler failures of
//! any kind, panics included, end the stream with a rendered error chunk.

use crate::classifier::{classify, Intent};
use crate::clients::NbaStatsClient;
use crate::config::AgentConfig;
use crate::handlers::{info::welcome_chunk, HandlerContext, HandlerRegistry};
use crate::models::ResponseChunk;
use crate::providers::StatsDataSource;
use crate::roster::PropRoster;
use crate::season::{Clock, SystemClock};
use anyhow::Result;
use futures_util::stream::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// Chunk emitted when a handler dies without producing a result
pub const UNEXPECTED_ERROR_TEXT: &str = "❌ Something went wrong. Try again.";

pub struct MomentumAgent {
    registry: Arc<HandlerRegistry>,
    ctx: HandlerContext,
    chunk_delay: Duration,
}

impl MomentumAgent {
    /// Agent over `source` with the wall clock, the built-in roster and no pacing
    pub fn new(source: Arc<dyn StatsDataSource>) -> Self {
        Self {
            registry: Arc::new(HandlerRegistry::with_defaults()),
            ctx: HandlerContext::new(source, Arc::new(SystemClock), Arc::new(PropRoster::default())),
            chunk_delay: Duration::ZERO,
        }
    }

    /// Live agent backed by the NBA stats API
    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let client = NbaStatsClient::with_config(
            &config.stats_base_url,
            config.stats_timeout,
            config.circuit_breaker(),
        )?
        .with_clock(clock.clone());

        let roster = match &config.prop_roster_path {
            Some(path) => {
                let roster = PropRoster::load(path)?;
                info!("Loaded {} prop candidates from {}", roster.len(), path.display());
                roster
            }
            None => PropRoster::default(),
        };

        Ok(Self::new(Arc::new(client))
            .with_clock(clock)
            .with_roster(roster)
            .with_chunk_delay(config.chunk_delay))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.ctx.clock = clock;
        self
    }

    pub fn with_roster(mut self, roster: PropRoster) -> Self {
        self.ctx.roster = Arc::new(roster);
        self
    }

    pub fn with_registry(mut self, registry: HandlerRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = delay;
        self
    }

    /// Answer one query.
    ///
    /// `context` is accepted for forward compatibility and currently unused.
    /// Outside a Tokio runtime, queries that need a handler yield a single
    /// error chunk instead of dispatching.
    pub fn assist(&self, text: &str, _context: &serde_json::Value) -> ResponseStream {
        let (sender, receiver) = mpsc::unbounded_channel();

        let command = match classify(text) {
            Ok(command) => command,
            Err(err) => {
                debug!("Rejected query '{}': {}", text.trim(), err);
                let _ = sender.send(ResponseChunk::new(err.render()));
                return ResponseStream::new(receiver);
            }
        };

        // Welcome is terminal: the sender is dropped here, nothing is dispatched
        if command.intent == Intent::Welcome {
            let _ = sender.send(welcome_chunk());
            return ResponseStream::new(receiver);
        }

        let intent = command.intent;
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(err) => {
                error!("Cannot dispatch {} outside a Tokio runtime: {}", intent, err);
                let _ = sender.send(ResponseChunk::new(UNEXPECTED_ERROR_TEXT));
                return ResponseStream::new(receiver);
            }
        };
        let handler = self.registry.get_or_fallback(intent);
        let ctx = self.ctx.clone();
        let delay = self.chunk_delay;
        info!("Dispatching {} via {}", intent, ctx.source.provider_name());

        let worker = runtime.clone();
        runtime.spawn(async move {
            // Separate task so a panicking handler surfaces as a JoinError
            let outcome = worker
                .spawn(async move { handler.handle(&ctx, &command).await })
                .await;

            let chunk = match outcome {
                Ok(Ok(chunk)) => chunk,
                Ok(Err(err)) => ResponseChunk::new(err.render()),
                Err(join_err) => {
                    error!("Handler for {} aborted: {}", intent, join_err);
                    ResponseChunk::new(UNEXPECTED_ERROR_TEXT)
                }
            };

            if sender.send(chunk).is_err() {
                debug!("Consumer dropped {} response", intent);
                return;
            }
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        });

        ResponseStream::new(receiver)
    }
}

impl std::fmt::Debug for MomentumAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MomentumAgent")
            .field("ctx", &self.ctx)
            .field("handlers", &self.registry.len())
            .field("chunk_delay", &self.chunk_delay)
            .finish()
    }
}

/// Lazy sequence of response chunks; ends when the producer is done
pub struct ResponseStream {
    receiver: mpsc::UnboundedReceiver<ResponseChunk>,
}

impl ResponseStream {
    fn new(receiver: mpsc::UnboundedReceiver<ResponseChunk>) -> Self {
        Self { receiver }
    }
}

impl Stream for ResponseStream {
    type Item = ResponseChunk;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.receiver).poll_recv(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Command;
    use crate::error::HandlerResult;
    use crate::handlers::IntentHandler;
    use crate::providers::InMemoryStatsSource;
    use async_trait::async_trait;
    use futures_util::StreamExt;
    use serde_json::json;

    struct PanickingHandler;

    #[async_trait]
    impl IntentHandler for PanickingHandler {
        fn intent(&self) -> Intent {
            Intent::GamePace
        }

        async fn handle(&self, _ctx: &HandlerContext, _cmd: &Command) -> HandlerResult<ResponseChunk> {
            panic!("pace table exploded");
        }
    }

    fn agent(source: Arc<InMemoryStatsSource>) -> MomentumAgent {
        MomentumAgent::new(source)
    }

    #[tokio::test]
    async fn test_empty_input_single_welcome() {
        let source = Arc::new(InMemoryStatsSource::new());
        let mut stream = agent(source.clone()).assist("   ", &json!({}));

        let first = stream.next().await.unwrap();
        assert!(first.text.starts_with("👋 Welcome"));
        for _ in 0..3 {
            assert!(stream.next().await.is_none());
        }
        assert_eq!(source.call_count(), 0);
    }

    #[tokio::test]
    async fn test_usage_error_skips_fetch() {
        let source = Arc::new(InMemoryStatsSource::new());
        let chunks: Vec<ResponseChunk> = agent(source.clone())
            .assist("trend player LeBron James STL 1.5", &json!({}))
            .collect()
            .await;
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "⚠️ Stat must be one of: PTS, AST, REB, 3PM.");
        assert_eq!(source.call_count(), 0);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_rendered() {
        let source = Arc::new(InMemoryStatsSource::new());
        source.set_failing(true);
        let chunks: Vec<ResponseChunk> = agent(source)
            .assist("search player LeBron James", &json!({}))
            .collect()
            .await;
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "❌ Error searching player. Try again.");
    }

    #[tokio::test]
    async fn test_panicking_handler_still_terminates() {
        let mut registry = HandlerRegistry::with_defaults();
        registry.register(Arc::new(PanickingHandler));
        let agent = agent(Arc::new(InMemoryStatsSource::new())).with_registry(registry);

        let chunks: Vec<ResponseChunk> = agent.assist("game pace", &json!(null)).collect().await;
        assert_eq!(chunks, vec![ResponseChunk::new(UNEXPECTED_ERROR_TEXT)]);
    }

    #[test]
    fn test_assist_outside_runtime_yields_error_chunk() {
        let source = Arc::new(InMemoryStatsSource::new());
        let agent = agent(source.clone());
        let stream = agent.assist("search player LeBron James", &json!({}));
        let welcome = agent.assist("", &json!({}));

        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let chunks: Vec<ResponseChunk> = rt.block_on(stream.collect());
        assert_eq!(chunks, vec![ResponseChunk::new(UNEXPECTED_ERROR_TEXT)]);
        assert_eq!(rt.block_on(welcome.collect::<Vec<_>>()).len(), 1);
        assert_eq!(source.call_count(), 0);
    }

    #[tokio::test]
    async fn test_chunk_delay_does_not_block_first_chunk() {
        let agent = agent(Arc::new(InMemoryStatsSource::new()))
            .with_chunk_delay(Duration::from_millis(5));
        let chunks: Vec<ResponseChunk> = agent.assist("help", &json!({})).collect().await;
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].text.starts_with("📚"));
    }
}
