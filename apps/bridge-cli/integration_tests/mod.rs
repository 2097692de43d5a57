// Integration tests for the editor-bridge commands
// Channel-backed tests run on paused time; the serve tests use a real socket.

mod commands;
