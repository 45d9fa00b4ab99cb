//! NBA Stats API Integration Tests
//!
//! These tests require network access and should be run with `cargo test --ignored`.

use chrono::Local;
use momentum_rust_core::clients::NbaStatsClient;
use momentum_rust_core::season::current_season;
use momentum_rust_core::StatsDataSource;

#[tokio::test]
#[ignore] // Requires network
async fn test_player_lookup_and_game_log() {
    let client = NbaStatsClient::new().unwrap();

    match client.find_player("LeBron James").await {
        Ok(Some(player)) => {
            println!("Resolved {} -> {}", player.full_name, player.id);
            let season = current_season(Local::now().date_naive());
            match client.player_game_log(player.id, &season).await {
                Ok(games) => println!("{} games in {}", games.len(), season.label),
                Err(e) => println!("Warning: Could not fetch game log: {:#}", e),
            }
        }
        Ok(None) => println!("Warning: player not found in all-players table"),
        Err(e) => println!("Warning: Could not reach stats API: {:#}", e),
    }
}

#[tokio::test]
#[ignore] // Requires network
async fn test_today_scoreboard() {
    let client = NbaStatsClient::new().unwrap();
    match client.day_scoreboard(Local::now().date_naive()).await {
        Ok(board) => {
            println!("{} games today", board.headers.len());
            for header in &board.headers {
                println!("  - {} {}", header.game_id, header.status_text);
            }
        }
        Err(e) => println!("Warning: Could not fetch scoreboard: {:#}", e),
    }
}
