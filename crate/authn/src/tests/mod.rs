mod chain_tests;
mod concurrency_tests;
