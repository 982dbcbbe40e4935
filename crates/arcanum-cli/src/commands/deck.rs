use comfy_table::{ContentArrangement, Table};

use arcanum_core::{Suit, deck};

pub fn run(suit: Option<&str>) -> Result<(), String> {
    let suit: Option<Suit> = suit
        .map(str::parse::<Suit>)
        .transpose()
        .map_err(|e| format!("{e} (expected wands, cups, swords, pentacles or major)"))?;

    let cards: Vec<_> = match suit {
        Some(suit) => deck().by_suit(suit).collect(),
        None => deck().cards().iter().collect(),
    };

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Name", "Suit", "Keywords"]);
    for card in &cards {
        table.add_row(vec![
            card.id.as_str(),
            card.name.as_str(),
            card.suit.name(),
            card.keywords.as_str(),
        ]);
    }

    println!("{table}");
    println!();
    println!("  {} cards", cards.len());
    Ok(())
}
