pub mod pipeline_logger;
pub mod pipeline_state;
pub mod process_snapshot_use_case;
