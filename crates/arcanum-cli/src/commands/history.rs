use colored::Colorize;

use arcanum_session::ProfileStore;

use crate::StoreArgs;

pub fn run(args: &StoreArgs, limit: usize, json: bool) -> Result<(), String> {
    let store = super::open_store(args);
    let history =
        super::block_on(store.load_history(&args.user, limit))?.map_err(|e| e.to_string())?;

    if json {
        let out = serde_json::to_string_pretty(&history).map_err(|e| e.to_string())?;
        println!("{out}");
        return Ok(());
    }

    if history.is_empty() {
        println!("  No readings yet.");
        return Ok(());
    }

    for log in &history {
        println!(
            "  {}  {}",
            log.date.format("%Y-%m-%d %H:%M").to_string().dimmed(),
            log.spread_name.bold()
        );
        println!("  \"{}\"", log.question);
        let cards = log
            .cards
            .iter()
            .map(|c| {
                let reversed = if c.is_reversed { " (reversed)" } else { "" };
                format!("{}: {}{reversed}", c.position, c.name)
            })
            .collect::<Vec<_>>()
            .join(" | ");
        println!("    {cards}");
        println!("    {}", super::truncate(&log.summary, 120).dimmed());
        println!();
    }
    println!("  {} readings", history.len());
    Ok(())
}
