//! Application layer: the marketplace service composing the aggregates.

mod services;

pub use services::{
    CatalogEntry, MarketplaceService, NewCollaboration, NewEvent, ServiceError,
};
