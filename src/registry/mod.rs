/// Module identities, payloads and the registry
pub mod modules;
