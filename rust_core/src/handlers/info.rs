//! Static responses that never touch the data source.

use super::{HandlerContext, IntentHandler};
use crate::classifier::{command_syntax, Command, Intent};
use crate::error::HandlerResult;
use crate::models::ResponseChunk;
use async_trait::async_trait;

pub const WELCOME_TEXT: &str = "👋 Welcome to Momentum! Ask `search player <Name>`, `trend player <Name> <Stat> <PropLine>`, `hot streaks`, `risk index <Name>`, `game pace`, or `help`.";

pub const FALLBACK_TEXT: &str = "🤔 Try `search player <Name>`, `hot streaks`, `risk index <Name>`, `game pace`, or `help`.";

pub fn welcome_chunk() -> ResponseChunk {
    ResponseChunk::new(WELCOME_TEXT)
}

pub struct HelpHandler;

#[async_trait]
impl IntentHandler for HelpHandler {
    fn intent(&self) -> Intent {
        Intent::Help
    }

    async fn handle(&self, _ctx: &HandlerContext, _cmd: &Command) -> HandlerResult<ResponseChunk> {
        let commands: Vec<&str> = command_syntax().collect();
        Ok(ResponseChunk::new(format!(
            "📚 Available Commands:\n{}",
            commands.join("\n")
        )))
    }
}

pub struct InjuryReportHandler;

#[async_trait]
impl IntentHandler for InjuryReportHandler {
    fn intent(&self) -> Intent {
        Intent::InjuryReport
    }

    async fn handle(&self, _ctx: &HandlerContext, _cmd: &Command) -> HandlerResult<ResponseChunk> {
        Ok(ResponseChunk::new("🩼 Injury report coming soon!"))
    }
}

pub struct FallbackHandler;

#[async_trait]
impl IntentHandler for FallbackHandler {
    fn intent(&self) -> Intent {
        Intent::Fallback
    }

    async fn handle(&self, _ctx: &HandlerContext, _cmd: &Command) -> HandlerResult<ResponseChunk> {
        Ok(ResponseChunk::new(FALLBACK_TEXT))
    }
}
