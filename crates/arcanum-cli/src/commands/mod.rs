pub mod deck;
pub mod history;
pub mod profile;
pub mod read;
pub mod spreads;

use std::future::Future;

use arcanum_session::JsonFileStore;

use crate::StoreArgs;

/// Run one async store or session call on a throwaway runtime.
fn block_on<F: Future>(future: F) -> Result<F::Output, String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to start async runtime: {e}"))?;
    Ok(runtime.block_on(future))
}

fn open_store(args: &StoreArgs) -> JsonFileStore {
    JsonFileStore::new(&args.data_dir)
}

/// Shorten `text` to `max` characters, marking the cut.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}
