//! Result presentation, interactive selection, and the ssh launch

use dialoguer::{Input, Select};

use crate::search::ScoredHost;

const ADDRESS_WIDTH: usize = 15;
const NAME_WIDTH: usize = 40;

/// Render a search hit as a fixed-width selection line.
///
/// The address is always the first whitespace-delimited token, which
/// [`chosen_address`] relies on.
#[must_use]
pub fn display_line(host: &ScoredHost) -> String {
    format!(
        "{:<aw$} | {:<nw$} | {}",
        host.address,
        host.name,
        host.indexed_at.format("%H:%M:%S"),
        aw = ADDRESS_WIDTH,
        nw = NAME_WIDTH,
    )
    .trim()
    .to_string()
}

/// First whitespace-delimited token of a selection line.
#[must_use]
pub fn chosen_address(line: &str) -> Option<&str> {
    line.split_whitespace().next()
}

/// Prompt for a search term interactively. Aborting counts as an empty term.
pub fn prompt_for_term() -> String {
    Input::<String>::new()
        .with_prompt("Search")
        .allow_empty(true)
        .interact_text()
        .unwrap_or_default()
}

/// Present the selection list; `None` when the user aborts.
pub fn pick(lines: &[String]) -> Result<Option<usize>, dialoguer::Error> {
    Select::new()
        .with_prompt("Selection")
        .items(lines)
        .default(0)
        .interact_opt()
}

/// Run `ssh <address>` with an inherited terminal.
pub async fn connect(address: &str) -> std::io::Result<std::process::ExitStatus> {
    tracing::info!(%address, "launching ssh");
    tokio::process::Command::new("ssh")
        .arg(address)
        .status()
        .await
}
