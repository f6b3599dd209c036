pub mod errors;
pub mod memory;
pub mod models;
pub mod ports;
pub mod resolver;

pub use errors::PrincipalStoreError;
pub use errors::ResolveError;
pub use memory::InMemoryPrincipalStore;
pub use models::Principal;
pub use ports::PrincipalStore;
pub use resolver::PrincipalResolver;
pub use resolver::ResolverSettings;
