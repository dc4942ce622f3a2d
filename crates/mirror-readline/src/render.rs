//! Terminal rendering of sessions, history and the catalog.

use colored::Colorize;
use mirror_core::calibration::CalibrationResult;
use mirror_core::catalog::{CatalogIndex, Recommendation};
use mirror_core::history::HistoryItem;
use mirror_core::playback::{ActiveSource, PlaybackState};
use mirror_core::session::SessionState;
use std::sync::Arc;

pub fn state(state: &SessionState) {
    match state {
        SessionState::Ready {
            result,
            recommendation,
        } => {
            self::result(result);
            self::recommendation(recommendation);
            println!("{}", "Type /back to return, /play to hear the track.".bright_black());
        }
        SessionState::Failed { error } => {
            println!("{}", error.user_message().red());
        }
        SessionState::Loading { .. } => {
            println!("{}", "Calibrating...".bright_black());
        }
        SessionState::Idle => {}
    }
}

pub fn result(result: &CalibrationResult) {
    println!();
    section("Frequency scan", &result.frequency_scan);
    section("Illusion stripping", &result.illusion_stripping);
    println!("{}", "Five steps".bright_magenta().bold());
    for (i, step) in result.five_steps.iter().enumerate() {
        println!("  {} {}", format!("{}.", i + 1).bright_magenta(), step.bright_blue());
    }
    println!();
    section("Action anchor", &result.action_anchor);
}

fn section(title: &str, body: &str) {
    println!("{}", title.bright_magenta().bold());
    for line in body.lines() {
        println!("  {}", line.bright_blue());
    }
    println!();
}

pub fn recommendation(recommendation: &Recommendation) {
    let book = &recommendation.book;
    let track = &recommendation.track;
    println!("{} {} {}", "📖".bold(), book.title.yellow(), format!("({})", book.author).bright_black());
    if !book.description.is_empty() {
        println!("   {}", book.description.bright_black());
    }
    println!("{} {}", "🎵".bold(), track.title.yellow());
    println!();
}

pub fn history(items: &[Arc<HistoryItem>]) {
    if items.is_empty() {
        println!("{}", "No calibrations yet.".bright_black());
        return;
    }
    for (i, item) in items.iter().enumerate() {
        let local = item.created_at.with_timezone(&chrono::Local);
        println!(
            "  {} {} {}",
            format!("{:>2}.", i + 1).bright_magenta(),
            local.format("%m-%d %H:%M").to_string().bright_black(),
            item.input_text
        );
    }
    println!("{}", "Type /history <n> to read an entry.".bright_black());
}

pub fn history_item(item: &HistoryItem) {
    println!("{}", format!("> {}", item.input_text).green());
    result(&item.result);
    println!(
        "{} {}   {} {}",
        "📖".bold(),
        item.result.recommended_book_title.yellow(),
        "🎵".bold(),
        item.result.recommended_music_title.yellow()
    );
}

pub fn books(catalog: &CatalogIndex) {
    for (i, book) in catalog.books().iter().enumerate() {
        println!(
            "  {} {} {}",
            format!("{:>2}.", i + 1).bright_magenta(),
            book.title,
            book.author.bright_black()
        );
    }
}

pub fn tracks(catalog: &CatalogIndex, playback: &PlaybackState) {
    for (i, track) in catalog.tracks().iter().enumerate() {
        let playing = playback
            .catalog_track()
            .is_some_and(|current| current.title == track.title);
        let marker = if playing { "▶".green().to_string() } else { " ".to_string() };
        println!(
            "{} {} {} {}",
            marker,
            format!("{:>2}.", i + 1).bright_magenta(),
            track.title,
            track.category.bright_black()
        );
    }
}

pub fn playback(playback: &PlaybackState) {
    let line = match &playback.active_source {
        ActiveSource::None => "Silence.".to_string(),
        ActiveSource::Ambient => "Ambient loop playing.".to_string(),
        ActiveSource::Catalog(track) => format!("Playing {}.", track.title),
    };
    println!("{}", line.bright_black());
}

pub fn help() {
    let rows = [
        ("<text>", "Describe a concern and calibrate"),
        ("/back", "Leave the result or error screen"),
        ("/history [n]", "List past calibrations, or show entry n"),
        ("/books", "List the book catalog"),
        ("/tracks", "List the track catalog"),
        ("/play [n]", "Play track n, or the recommended track"),
        ("/ambient", "Toggle the ambient loop"),
        ("/stop", "Stop all audio"),
        ("quit", "Exit"),
    ];
    for (command, description) in rows {
        println!("  {} {}", format!("{command:<14}").bright_cyan(), description.bright_black());
    }
}
