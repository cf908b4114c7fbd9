//! Shared fixtures for the passvote integration tests live in each test file.
