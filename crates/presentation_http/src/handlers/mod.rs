//! HTTP request handlers

pub mod featured_trips;
pub mod geocode;
pub mod health;
pub mod quote;
pub mod tariff;
