pub mod protocol;

pub use protocol::*;

/// Path of the answer endpoint, relative to the server root
pub const ASK_PATH: &str = "/api/ask";

/// Message returned when the fixtures directory holds no `response*.json` file
pub const NO_FIXTURES_MESSAGE: &str = "No response files found";
