pub mod dedup_ledger;
