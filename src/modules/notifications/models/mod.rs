pub mod ledger_event;

pub use ledger_event::LedgerEvent;
