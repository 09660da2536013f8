//! Ledger service configuration.

/// Configuration for the ledger service.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Whether a sale may drive on-hand quantity below zero (default: false).
    /// When false, an oversized sale is rejected and the available amount
    /// is reported back. When true the sale commits and the negative
    /// quantity stands for back-ordered stock.
    pub allow_backorder: bool,
    /// Maximum length of a transaction note in characters (default: 500).
    pub max_note_length: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            allow_backorder: false,
            max_note_length: 500,
        }
    }
}
