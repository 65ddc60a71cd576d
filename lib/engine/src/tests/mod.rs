mod fetcher;
mod schema_store;
mod synthesizer;
