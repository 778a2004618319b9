/// Integration test entry point
mod workflow;
mod concurrency;
