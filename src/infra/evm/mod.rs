pub mod bindings;
pub mod client;
pub mod registry;

pub use client::EvmRpcClient;
pub use registry::EvmDocumentRegistry;
