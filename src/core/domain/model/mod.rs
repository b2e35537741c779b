pub mod maintenance_window;
pub mod node_pool;
pub mod operation;
pub(crate) mod payload;
pub mod resize_state;
pub mod schedule_tag;
pub mod vm_operation;
