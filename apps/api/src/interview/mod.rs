// Interview engine: lifecycle state machine, chat-turn orchestration,
// integrity tracking and report assembly.
// All LLM calls go through the chains layer — handlers and the engine
// never talk to the completion client directly.

pub mod engine;
pub mod handlers;
pub mod integrity;
pub mod introduction;
pub mod locks;
pub mod orchestrator;
pub mod report_assembly;
pub mod state_machine;
