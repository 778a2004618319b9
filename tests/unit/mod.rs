/// Unit test entry point
mod engine_rules;
