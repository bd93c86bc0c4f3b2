pub mod credentials;

pub use credentials::{ApiCredentials, CredentialStore, StorageError};
