//! fastlane-mcp: MCP server exposing fastlane project operations as tools.

pub mod server;
