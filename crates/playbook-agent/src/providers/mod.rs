// ABOUTME: Provider module aggregating model endpoint adapters.
// ABOUTME: Each sub-module implements ModelClient for a specific hosted API.

pub mod bedrock;
