mod cluster_tests;
mod node_pool_tests;
