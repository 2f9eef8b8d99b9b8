//! Core types, traits, and services for the RideRelay gateway.

pub mod error;
pub mod gateway;
pub mod models;
pub mod token;
pub mod traits;


pub use error::AppError;
pub use gateway::ResourceGateway;
pub use models::{
    Collection, DeleteAck, Document, Filter, InsertAck, PriceSort, SortOrder, UpdateAck,
};
pub use token::{Claims, Identity, TokenSigner};
pub use traits::DocumentStore;
