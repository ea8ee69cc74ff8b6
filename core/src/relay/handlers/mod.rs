// Route handlers
pub mod fallback;
pub mod heartbeat;
