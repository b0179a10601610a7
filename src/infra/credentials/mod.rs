// Concrete credential sources, tried in the order main.rs lists them.

mod key_file;
mod secret_store;

pub use key_file::KeyFileProvider;
pub use secret_store::SecretStoreProvider;
