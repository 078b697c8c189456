pub mod file_dedup_ledger;
pub mod in_memory_dedup_ledger;
