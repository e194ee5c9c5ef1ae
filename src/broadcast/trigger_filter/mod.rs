mod filter;
mod filterable_message;

#[cfg(test)]
mod tests;

// Re-export public API
pub use filter::TriggerFilter;
pub use filterable_message::FilterableMessage;
