pub mod clock;
pub mod extractor;
pub mod gateway;
pub mod jwt;
pub mod locks;
pub mod state;
pub mod test_utils;
pub mod validation;
