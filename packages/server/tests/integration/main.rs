mod harness;
mod record_store;
