//! Helper functions shared by the generator, server, and templates

mod url;

pub use url::*;
