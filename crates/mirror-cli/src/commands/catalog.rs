use super::utils;
use anyhow::Result;
use mirror_infrastructure::ConfigService;

pub fn list(config_service: &ConfigService) -> Result<()> {
    let app = utils::app(config_service)?;
    let catalog = app.usecase.catalog();

    println!("📚 Books (catalog v{})", catalog.version());
    for (i, book) in catalog.books().iter().enumerate() {
        println!("  {:>2}. {} - {}", i + 1, book.title, book.author);
        if !book.description.is_empty() {
            println!("      {}", book.description);
        }
    }

    println!("\n🎵 Tracks");
    for (i, track) in catalog.tracks().iter().enumerate() {
        if track.category.is_empty() {
            println!("  {:>2}. {}", i + 1, track.title);
        } else {
            println!("  {:>2}. {} [{}]", i + 1, track.title, track.category);
        }
    }

    Ok(())
}
