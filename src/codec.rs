//! Bidirectional mapping between host attributes ([`crate::schema`]) and wire resources
//! ([`crate::model`]).
//!
//! Decoding validates first and never touches the network, so malformed input fails before any
//! remote call. Encoding is total apart from re-serialising nested metadata.

pub mod jwks;
pub mod lifespan;
pub mod oauth2_client;
