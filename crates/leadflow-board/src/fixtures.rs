#![forbid(unsafe_code)]

//! Default pipeline and sample leads for a fresh board.

use crate::clock::Clock;
use crate::config::BoardConfig;
use crate::model::LeadDraft;
use crate::store::BoardStore;

/// Pipeline stages of a fresh board.
pub const DEFAULT_COLUMNS: [&str; 4] = ["Novo", "Contato", "Proposta", "Fechado"];

/// Sample leads as `(column index, draft)`.
#[must_use]
pub fn seed_leads() -> Vec<(usize, LeadDraft)> {
    vec![
        (
            0,
            LeadDraft::new("Padaria Pão Quente", "(11) 98765-4321")
                .with_email("contato@paoquente.com.br"),
        ),
        (0, LeadDraft::new("Oficina do Zé", "(21) 99876-5432")),
        (
            1,
            LeadDraft::new("Clínica Sorriso", "(31) 97654-3210")
                .with_email("adm@clinicasorriso.com.br"),
        ),
        (2, LeadDraft::new("Mercado Bom Preço", "(41) 96543-2109")),
        (
            3,
            LeadDraft::new("Studio Fit", "(51) 95432-1098").with_email("ola@studiofit.com.br"),
        ),
    ]
}

/// Build the board a first run starts with.
///
/// Leads whose column index is past the configured columns are skipped.
#[must_use]
pub fn seed_board(config: &BoardConfig, clock: Box<dyn Clock>) -> BoardStore {
    let mut board = BoardStore::new(clock);
    let columns: Vec<_> = config
        .default_columns
        .iter()
        .filter_map(|name| board.add_column(name.clone()))
        .collect();
    if config.seed_leads {
        for (index, draft) in seed_leads() {
            if let Some(&column) = columns.get(index) {
                board.add_card(column, draft);
            }
        }
    }
    board
}
