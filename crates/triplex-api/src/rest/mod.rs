// Generic JSON REST backend: any endpoint that answers with JSON.

mod client;

pub use client::{RestClient, RestRequest};
