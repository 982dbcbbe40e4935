use comfy_table::{ContentArrangement, Table};

use arcanum_core::SpreadKind;

pub fn run() -> Result<(), String> {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Name", "Cards", "Positions"]);

    for kind in SpreadKind::ALL {
        let spread = kind.definition();
        let positions = spread
            .positions
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{}. {}", i + 1, p.name))
            .collect::<Vec<_>>()
            .join("\n");
        table.add_row(vec![
            kind.id().to_string(),
            spread.name.to_string(),
            spread.card_count().to_string(),
            positions,
        ]);
    }

    println!("{table}");
    Ok(())
}
