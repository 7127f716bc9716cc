mod assembly;
#[cfg(feature = "http")]
mod http;
mod sessions;
mod tools;
