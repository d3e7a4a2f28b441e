// ABOUTME: Core types for switchboard: conversation messages, sessions, agents, and swarm definitions.
// ABOUTME: Pure data and validation, no I/O beyond loading swarm definition files.

pub mod agent;
pub mod message;
pub mod session;
pub mod swarm;

pub use agent::{AgentSpec, HandoffSpec, ModelId, ToolKind};
pub use message::{Message, ToolCall};
pub use session::{Session, SessionStore};
pub use swarm::{SwarmDefinition, SwarmError, SwarmVariant};
