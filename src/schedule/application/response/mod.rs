pub mod maintenance_response;
pub mod node_pool_response;
pub mod tag_response;
pub mod vm_operation_response;
